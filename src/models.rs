use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Visibility of a method as declared directly on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    /// The name was explicitly undefined here. It blocks lookup of the same
    /// name further down the chain.
    Undefined,
}

impl Visibility {
    pub fn all() -> &'static [Visibility] {
        &[
            Visibility::Public,
            Visibility::Protected,
            Visibility::Private,
            Visibility::Undefined,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a method is shown in inspector output: its visibility, or
/// `Overridden` when a closer ancestor shadows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Public,
    Protected,
    Private,
    Undefined,
    Overridden,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Public,
            Category::Protected,
            Category::Private,
            Category::Undefined,
            Category::Overridden,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "public" => Some(Category::Public),
            "protected" => Some(Category::Protected),
            "private" => Some(Category::Private),
            "undefined" => Some(Category::Undefined),
            "overridden" => Some(Category::Overridden),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Public => "public",
            Category::Protected => "protected",
            Category::Private => "private",
            Category::Undefined => "undefined",
            Category::Overridden => "overridden",
        }
    }
}

impl From<Visibility> for Category {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => Category::Public,
            Visibility::Protected => Category::Protected,
            Visibility::Private => Category::Private,
            Visibility::Undefined => Category::Undefined,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method resolved on a lookup path: the module that defines it, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHandle<M> {
    pub module: M,
    pub name: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Human-readable description of a module, as used for entry labels.
///
/// Adapters build the structure; rendering is shared so every adapter labels
/// anonymous and singleton modules the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleLabel {
    Named(String),
    Unnamed { class: bool },
    /// An ordinary object, described through its class.
    Instance(Box<ModuleLabel>),
    /// The singleton class attached to the described thing.
    Singleton(Box<ModuleLabel>),
}

impl ModuleLabel {
    pub fn named(name: impl Into<String>) -> Self {
        ModuleLabel::Named(name.into())
    }

    pub fn singleton(inner: ModuleLabel) -> Self {
        ModuleLabel::Singleton(Box::new(inner))
    }

    pub fn instance(class: ModuleLabel) -> Self {
        ModuleLabel::Instance(Box::new(class))
    }
}

impl fmt::Display for ModuleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleLabel::Named(name) => f.write_str(name),
            ModuleLabel::Unnamed { class: true } => f.write_str("unnamed Class"),
            ModuleLabel::Unnamed { class: false } => f.write_str("unnamed Module"),
            ModuleLabel::Instance(class) => write!(f, "{class} instance"),
            ModuleLabel::Singleton(inner) => write!(f, "[{inner}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_visibility() {
        for visibility in Visibility::all() {
            assert_eq!(Category::from(*visibility).as_str(), visibility.as_str());
        }
    }

    #[test]
    fn category_from_name() {
        assert_eq!(Category::from_name("overridden"), Some(Category::Overridden));
        assert_eq!(Category::from_name("protected"), Some(Category::Protected));
        assert_eq!(Category::from_name("Public"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn category_display() {
        for category in Category::all() {
            assert_eq!(category.to_string(), category.as_str());
        }
    }

    #[test]
    fn module_label_display() {
        assert_eq!(ModuleLabel::named("Comparable").to_string(), "Comparable");
        assert_eq!(ModuleLabel::Unnamed { class: true }.to_string(), "unnamed Class");
        assert_eq!(ModuleLabel::Unnamed { class: false }.to_string(), "unnamed Module");
        assert_eq!(
            ModuleLabel::singleton(ModuleLabel::named("C")).to_string(),
            "[C]"
        );
        assert_eq!(
            ModuleLabel::singleton(ModuleLabel::singleton(ModuleLabel::named("C"))).to_string(),
            "[[C]]"
        );
        assert_eq!(
            ModuleLabel::singleton(ModuleLabel::instance(ModuleLabel::named("Object"))).to_string(),
            "[Object instance]"
        );
        assert_eq!(
            ModuleLabel::instance(ModuleLabel::Unnamed { class: true }).to_string(),
            "unnamed Class instance"
        );
    }

    #[test]
    fn source_location_display() {
        let location = SourceLocation::new("lib/widget.rb", 12);
        assert_eq!(location.to_string(), "lib/widget.rb:12");
    }
}
