use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::error::{LookseeError, Result};
use crate::models::Category;

/// A name filter. Substrings match anywhere in the name; patterns are
/// searched, not anchored.
#[derive(Debug, Clone)]
pub enum Filter {
    Substring(String),
    Pattern(Regex),
}

impl Filter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Filter::Substring(s) => name.contains(s.as_str()),
            Filter::Pattern(re) => re.is_match(name),
        }
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::Substring(a), Filter::Substring(b)) => a == b,
            (Filter::Pattern(a), Filter::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Which methods to show: wanted categories plus name filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    categories: BTreeSet<Category>,
    filters: Vec<Filter>,
}

impl Selection {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.add_filter(filter);
        self
    }

    /// Parse `ls`-style specifiers on top of `defaults`.
    ///
    /// * `:public`, `:protected`, `:private`, `:undefined`, `:overridden`
    ///   select a category; `:nopublic` etc. deselect it.
    /// * `/regexp/` (or `/regexp/i`) filters names by pattern.
    /// * anything else filters names by substring.
    pub fn parse<S: AsRef<str>>(defaults: &[S], specifiers: &[S]) -> Result<Self> {
        let mut selection = Selection::default();
        for specifier in defaults.iter().chain(specifiers) {
            selection.apply(specifier.as_ref())?;
        }
        Ok(selection)
    }

    fn apply(&mut self, specifier: &str) -> Result<()> {
        if let Some(token) = specifier.strip_prefix(':') {
            let (negated, name) = match token.strip_prefix("no") {
                Some(rest) if Category::from_name(rest).is_some() => (true, rest),
                _ => (false, token),
            };
            let category = Category::from_name(name).ok_or_else(|| {
                LookseeError::invalid_filter(specifier, "unknown visibility")
            })?;
            if negated {
                self.categories.remove(&category);
            } else {
                self.categories.insert(category);
            }
            return Ok(());
        }

        if let Some(filter) = parse_pattern(specifier)? {
            self.add_filter(filter);
        } else {
            self.add_filter(Filter::Substring(specifier.to_string()));
        }
        Ok(())
    }

    fn add_filter(&mut self, filter: Filter) {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
    }

    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn wants(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Filters are OR'd together. No filters lets every name through.
    pub fn matches_name(&self, name: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.matches(name))
    }
}

fn parse_pattern(specifier: &str) -> Result<Option<Filter>> {
    let Some(body) = specifier.strip_prefix('/') else {
        return Ok(None);
    };
    let (source, case_insensitive) = if let Some(source) = body.strip_suffix("/i") {
        (source, true)
    } else if let Some(source) = body.strip_suffix('/') {
        (source, false)
    } else {
        return Err(LookseeError::invalid_filter(specifier, "unterminated pattern"));
    };

    let regex = RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| LookseeError::invalid_filter(specifier, e.to_string()))?;
    Ok(Some(Filter::Pattern(regex)))
}
