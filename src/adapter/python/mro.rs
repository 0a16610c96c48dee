//! C3 linearization, the method resolution order Python uses.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MroError<T> {
    /// `T` is its own ancestor.
    Cycle(T),
    /// No order of `T`'s ancestors respects every local precedence order.
    Inconsistent(T),
}

/// Linearize `class` given a function returning each class's direct bases
/// in declaration order.
pub fn linearize<T, F>(class: T, bases: F) -> Result<Vec<T>, MroError<T>>
where
    T: Copy + Eq + Hash,
    F: Fn(T) -> Vec<T>,
{
    let mut memo = HashMap::new();
    linearize_with(class, &bases, &mut Vec::new(), &mut memo)
}

fn linearize_with<T, F>(
    class: T,
    bases: &F,
    stack: &mut Vec<T>,
    memo: &mut HashMap<T, Vec<T>>,
) -> Result<Vec<T>, MroError<T>>
where
    T: Copy + Eq + Hash,
    F: Fn(T) -> Vec<T>,
{
    if let Some(done) = memo.get(&class) {
        return Ok(done.clone());
    }
    if stack.contains(&class) {
        return Err(MroError::Cycle(class));
    }

    stack.push(class);
    let direct = bases(class);
    let mut sequences = Vec::with_capacity(direct.len() + 1);
    for &base in &direct {
        sequences.push(linearize_with(base, bases, stack, memo)?);
    }
    sequences.push(direct);
    stack.pop();

    let mut order = vec![class];
    order.extend(merge(sequences).ok_or(MroError::Inconsistent(class))?);
    memo.insert(class, order.clone());
    Ok(order)
}

// Repeatedly take the first head that appears in no other sequence's tail.
fn merge<T: Copy + Eq>(mut sequences: Vec<Vec<T>>) -> Option<Vec<T>> {
    let mut merged = Vec::new();
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(merged);
        }

        let candidate = sequences
            .iter()
            .map(|s| s[0])
            .find(|head| !sequences.iter().any(|s| s[1..].contains(head)))?;

        merged.push(candidate);
        for sequence in &mut sequences {
            if sequence[0] == candidate {
                sequence.remove(0);
            }
        }
    }
}
