use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::adapter::Adapter;
use crate::error::Result;
use crate::models::{MethodHandle, Visibility};

/// The method lookup path of an object, as a list of entries, closest
/// ancestor first.
pub struct LookupPath<A: Adapter> {
    object: A::Object,
    entries: Vec<Entry<A::Module>>,
}

impl<A: Adapter> std::fmt::Debug for LookupPath<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupPath")
            .field("object", &self.object)
            .field("entries", &self.entries)
            .finish()
    }
}

/// One module's contribution to a lookup path.
#[derive(Debug, Clone)]
pub struct Entry<M> {
    module: M,
    methods: BTreeMap<String, Visibility>,
    position: usize,
    // Name -> position of the first entry declaring it. Shared by every
    // entry of the same path.
    first_seen: Arc<HashMap<String, usize>>,
}

impl<A: Adapter> LookupPath<A> {
    /// Walk the ancestor chain of `object` and record each module's methods.
    ///
    /// All visibilities are gathered regardless of what will eventually be
    /// displayed, so shadowing is computed against the complete method
    /// tables.
    pub fn build(adapter: &A, object: &A::Object) -> Result<Self> {
        let modules = adapter.lookup_modules(object)?;

        let mut tables = Vec::with_capacity(modules.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (position, module) in modules.into_iter().enumerate() {
            let methods = find_methods(adapter, &module)?;
            tables.push((module, methods));
            // Only after the entry is complete, so it never shadows itself.
            let (_, methods) = &tables[position];
            for name in methods.keys() {
                seen.entry(name.clone()).or_insert(position);
            }
        }

        let first_seen = Arc::new(seen);
        let entries: Vec<_> = tables
            .into_iter()
            .enumerate()
            .map(|(position, (module, methods))| Entry {
                module,
                methods,
                position,
                first_seen: Arc::clone(&first_seen),
            })
            .collect();

        debug!(
            object = ?object,
            entries = entries.len(),
            names = first_seen.len(),
            "built lookup path"
        );

        Ok(Self {
            object: object.clone(),
            entries,
        })
    }

    pub fn object(&self) -> &A::Object {
        &self.object
    }

    pub fn entries(&self) -> &[Entry<A::Module>] {
        &self.entries
    }

    /// Resolve `name` the way a method call would.
    ///
    /// The first entry declaring the name wins. If that declaration is an
    /// undefinition, the name does not resolve at all.
    pub fn find(&self, name: &str) -> Option<MethodHandle<A::Module>> {
        for entry in &self.entries {
            let Some(&visibility) = entry.methods.get(name) else {
                continue;
            };
            if visibility == Visibility::Undefined {
                return None;
            }
            return Some(MethodHandle {
                module: entry.module.clone(),
                name: name.to_string(),
                visibility,
            });
        }
        None
    }
}

impl<M> Entry<M> {
    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn methods(&self) -> &BTreeMap<String, Visibility> {
        &self.methods
    }

    /// True if an entry earlier in the path also declares `name`.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.first_seen
            .get(name)
            .is_some_and(|&first| first < self.position)
    }

    /// Methods in name order, with their declared visibility.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Visibility)> {
        self.methods.iter().map(|(name, v)| (name.as_str(), *v))
    }
}

fn find_methods<A: Adapter>(adapter: &A, module: &A::Module) -> Result<BTreeMap<String, Visibility>> {
    let mut methods = BTreeMap::new();
    for &visibility in Visibility::all() {
        for name in adapter.methods(module, visibility)? {
            methods.insert(name, visibility);
        }
    }
    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookseeError;
    use crate::testing::StubAdapter;

    fn adapter_with(chain: &[&str]) -> StubAdapter {
        let mut adapter = StubAdapter::new();
        adapter.set_ancestors("object", chain);
        adapter
    }

    fn object() -> String {
        "object".to_string()
    }

    #[test]
    fn entries_follow_lookup_modules_order() {
        let mut adapter = adapter_with(&["C", "M", "Object"]);
        adapter.set_methods("C", &[], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        let modules: Vec<&str> = path.entries().iter().map(|e| e.module().as_str()).collect();
        assert_eq!(modules, vec!["C", "M", "Object"]);
        assert_eq!(path.object(), "object");
    }

    #[test]
    fn entry_contains_methods_of_every_visibility() {
        let mut adapter = adapter_with(&["C"]);
        adapter.set_methods("C", &["pub"], &["prot"], &["priv"], &["undef"]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        let methods: Vec<(&str, Visibility)> = path.entries()[0].iter().collect();
        assert_eq!(
            methods,
            vec![
                ("priv", Visibility::Private),
                ("prot", Visibility::Protected),
                ("pub", Visibility::Public),
                ("undef", Visibility::Undefined),
            ]
        );
    }

    #[test]
    fn entry_iterates_in_name_order() {
        let mut adapter = adapter_with(&["C"]);
        adapter.set_methods("C", &["zeta", "alpha", "mu"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        let names: Vec<&str> = path.entries()[0].iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn overridden_only_reflects_earlier_entries() {
        let mut adapter = adapter_with(&["C", "M", "N"]);
        adapter.set_methods("C", &["a"], &[], &[], &[]);
        adapter.set_methods("M", &["a", "b"], &[], &[], &[]);
        adapter.set_methods("N", &["b", "c"], &[], &["a"], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        let [c, m, n] = path.entries() else {
            panic!("expected three entries");
        };

        assert!(!c.is_overridden("a"));
        assert!(!c.is_overridden("b"));

        assert!(m.is_overridden("a"));
        assert!(!m.is_overridden("b"));

        assert!(n.is_overridden("a"));
        assert!(n.is_overridden("b"));
        assert!(!n.is_overridden("c"));
    }

    #[test]
    fn first_entry_is_never_overridden() {
        let mut adapter = adapter_with(&["C", "C"]);
        adapter.set_methods("C", &["dup"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        assert!(!path.entries()[0].is_overridden("dup"));
        assert!(path.entries()[1].is_overridden("dup"));
    }

    #[test]
    fn overridden_applies_to_names_absent_from_the_entry() {
        let mut adapter = adapter_with(&["C", "M"]);
        adapter.set_methods("C", &["only_on_c"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        assert!(path.entries()[1].is_overridden("only_on_c"));
        assert!(!path.entries()[1].is_overridden("nowhere"));
    }

    #[test]
    fn undefined_methods_shadow_later_definitions() {
        let mut adapter = adapter_with(&["C", "M"]);
        adapter.set_methods("C", &[], &[], &[], &["f"]);
        adapter.set_methods("M", &["f"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        assert!(path.entries()[1].is_overridden("f"));
    }

    #[test]
    fn find_returns_first_definition() {
        let mut adapter = adapter_with(&["C", "M"]);
        adapter.set_methods("C", &[], &["f"], &[], &[]);
        adapter.set_methods("M", &["f", "g"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();

        let f = path.find("f").expect("f resolves");
        assert_eq!(f.module, "C");
        assert_eq!(f.visibility, Visibility::Protected);

        let g = path.find("g").expect("g resolves");
        assert_eq!(g.module, "M");
        assert_eq!(g.name, "g");
    }

    #[test]
    fn find_stops_at_undefined_method() {
        let mut adapter = adapter_with(&["C", "M"]);
        adapter.set_methods("C", &[], &[], &[], &["f"]);
        adapter.set_methods("M", &["f"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        assert!(path.find("f").is_none());
    }

    #[test]
    fn find_missing_method() {
        let mut adapter = adapter_with(&["C"]);
        adapter.set_methods("C", &["f"], &[], &[], &[]);
        let path = LookupPath::build(&adapter, &object()).unwrap();
        assert!(path.find("nope").is_none());
    }

    #[test]
    fn build_fails_when_chain_cannot_be_resolved() {
        let adapter = StubAdapter::new();
        let err = LookupPath::build(&adapter, &"ghost".to_string()).unwrap_err();
        assert!(matches!(err, LookseeError::Resolution(_)));
    }
}
