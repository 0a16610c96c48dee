use crate::error::{LookseeError, Result};
use crate::models::Category;

/// A format template with a single `%s` where the name goes. `%%` stands for
/// a literal `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTemplate {
    prefix: String,
    suffix: String,
}

impl StyleTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholders = 0;

        let mut chars = template.chars();
        while let Some(c) = chars.next() {
            let target = if placeholders == 0 { &mut prefix } else { &mut suffix };
            if c != '%' {
                target.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => target.push('%'),
                Some('s') => placeholders += 1,
                Some(other) => {
                    return Err(LookseeError::invalid_style(
                        template,
                        format!("unsupported directive `%{other}`"),
                    ));
                }
                None => return Err(LookseeError::invalid_style(template, "trailing `%`")),
            }
        }

        if placeholders != 1 {
            return Err(LookseeError::invalid_style(
                template,
                "expected exactly one `%s`",
            ));
        }
        Ok(Self { prefix, suffix })
    }

    pub fn plain() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn apply(&self, name: &str) -> String {
        format!("{}{name}{}", self.prefix, self.suffix)
    }
}

/// Templates for module labels and for each method category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styles {
    pub module: StyleTemplate,
    pub public: StyleTemplate,
    pub protected: StyleTemplate,
    pub private: StyleTemplate,
    pub undefined: StyleTemplate,
    pub overridden: StyleTemplate,
}

impl Default for Styles {
    fn default() -> Self {
        let ansi = |code: &str| StyleTemplate {
            prefix: format!("\x1b[{code}m"),
            suffix: "\x1b[0m".to_string(),
        };
        Self {
            module: ansi("1;37"),     // white
            public: ansi("1;32"),     // green
            protected: ansi("1;33"),  // yellow
            private: ansi("1;31"),    // red
            undefined: ansi("1;34"),  // blue
            overridden: ansi("1;30"), // black
        }
    }
}

impl Styles {
    pub fn plain() -> Self {
        Self {
            module: StyleTemplate::plain(),
            public: StyleTemplate::plain(),
            protected: StyleTemplate::plain(),
            private: StyleTemplate::plain(),
            undefined: StyleTemplate::plain(),
            overridden: StyleTemplate::plain(),
        }
    }

    pub fn category(&self, category: Category) -> &StyleTemplate {
        match category {
            Category::Public => &self.public,
            Category::Protected => &self.protected,
            Category::Private => &self.private,
            Category::Undefined => &self.undefined,
            Category::Overridden => &self.overridden,
        }
    }

    pub fn set_category(&mut self, category: Category, template: StyleTemplate) {
        match category {
            Category::Public => self.public = template,
            Category::Protected => self.protected = template,
            Category::Private => self.private = template,
            Category::Undefined => self.undefined = template,
            Category::Overridden => self.overridden = template,
        }
    }
}
