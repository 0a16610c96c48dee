use crate::adapter::Adapter;
use crate::columnizer::columnize;
use crate::lookup_path::{Entry, LookupPath};
use crate::models::Category;
use crate::selection::Selection;
use crate::styles::Styles;

/// Fallback width when neither the caller nor the terminal provides one.
pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub selection: Selection,
    pub width: usize,
}

impl InspectOptions {
    pub fn new(selection: Selection, width: usize) -> Self {
        Self { selection, width }
    }
}

/// Renders a lookup path as text: one block per entry, closest ancestor
/// first, each a styled module label followed by its visible methods in
/// columns.
pub struct Inspector<'a, A: Adapter> {
    adapter: &'a A,
    lookup_path: &'a LookupPath<A>,
    options: &'a InspectOptions,
    styles: &'a Styles,
}

impl<'a, A: Adapter> Inspector<'a, A> {
    pub fn new(
        adapter: &'a A,
        lookup_path: &'a LookupPath<A>,
        options: &'a InspectOptions,
        styles: &'a Styles,
    ) -> Self {
        Self {
            adapter,
            lookup_path,
            options,
            styles,
        }
    }

    pub fn lookup_path(&self) -> &LookupPath<A> {
        self.lookup_path
    }

    pub fn render(&self) -> String {
        self.lookup_path
            .entries()
            .iter()
            .map(|entry| self.render_entry(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_entry(&self, entry: &Entry<A::Module>) -> String {
        let label = self.adapter.describe_module(entry.module()).to_string();
        let mut out = self.styles.module.apply(&label);
        out.push('\n');

        let styled: Vec<String> = visible_methods(entry, &self.options.selection)
            .into_iter()
            .map(|(name, category)| self.styles.category(category).apply(name))
            .collect();
        out.push_str(&columnize(&styled, self.options.width));

        if out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

/// The methods of `entry` that `selection` lets through, in name order, with
/// the category each should be shown as.
///
/// A name shadowed by an earlier entry is shown as overridden if that
/// category is wanted and hidden otherwise. Its declared visibility must be
/// wanted either way.
pub fn visible_methods<'e, M>(entry: &'e Entry<M>, selection: &Selection) -> Vec<(&'e str, Category)> {
    let show_overridden = selection.wants(Category::Overridden);
    entry
        .iter()
        .filter_map(|(name, visibility)| {
            if !selection.wants(visibility.into()) || !selection.matches_name(name) {
                return None;
            }
            if entry.is_overridden(name) {
                return show_overridden.then_some((name, Category::Overridden));
            }
            Some((name, visibility.into()))
        })
        .collect()
}
