use anyhow::{Context, Result};
use terminal_size::{Width, terminal_size};

use crate::inspector::DEFAULT_WIDTH;
use crate::models::Category;
use crate::selection::Selection;
use crate::styles::{StyleTemplate, Styles};

pub const DEFAULT_SPECIFIERS: &[&str] = &[
    ":public",
    ":protected",
    ":private",
    ":undefined",
    ":overridden",
];

pub const DEFAULT_EDITOR: &str = "vi";

/// Settings taken from the environment.
///
/// | variable | meaning |
/// |---|---|
/// | `COLUMNS` | terminal width |
/// | `LOOKSEE_WIDTH` | width when neither `COLUMNS` nor the terminal gives one |
/// | `LOOKSEE_SPECIFIERS` | default specifiers, whitespace separated |
/// | `LOOKSEE_EDITOR`, `EDITOR` | editor command |
/// | `NO_COLOR` | disable styling |
/// | `LOOKSEE_STYLE_MODULE`, `LOOKSEE_STYLE_<CATEGORY>` | style templates |
#[derive(Debug, Clone)]
pub struct Config {
    pub columns: Option<usize>,
    pub terminal_width: Option<usize>,
    pub default_width: usize,
    pub default_specifiers: Vec<String>,
    pub editor: String,
    pub color: bool,
    pub styles: Styles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: None,
            terminal_width: None,
            default_width: DEFAULT_WIDTH,
            default_specifiers: DEFAULT_SPECIFIERS.iter().map(|s| s.to_string()).collect(),
            editor: DEFAULT_EDITOR.to_string(),
            color: true,
            styles: Styles::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Invalid widths, specifiers,
    /// or style templates are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // A zero or garbled COLUMNS is common enough to be ignored.
        config.columns = get("COLUMNS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);

        if let Some(value) = get("LOOKSEE_WIDTH") {
            config.default_width = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .with_context(|| format!("LOOKSEE_WIDTH must be a positive integer, got `{value}`"))?;
        }

        if let Some(value) = get("LOOKSEE_SPECIFIERS") {
            let specifiers: Vec<String> = value.split_whitespace().map(str::to_string).collect();
            Selection::parse(&specifiers, &[]).context("invalid LOOKSEE_SPECIFIERS")?;
            config.default_specifiers = specifiers;
        }

        if let Some(editor) = get("LOOKSEE_EDITOR").or_else(|| get("EDITOR")) {
            config.editor = editor;
        }

        config.color = get("NO_COLOR").is_none();

        if let Some(template) = get("LOOKSEE_STYLE_MODULE") {
            config.styles.module =
                StyleTemplate::parse(&template).context("invalid LOOKSEE_STYLE_MODULE")?;
        }
        for &category in Category::all() {
            let key = format!("LOOKSEE_STYLE_{}", category.as_str().to_uppercase());
            if let Some(template) = get(&key) {
                let template =
                    StyleTemplate::parse(&template).with_context(|| format!("invalid {key}"))?;
                config.styles.set_category(category, template);
            }
        }

        Ok(config)
    }

    /// Record the width reported by `detect`, typically [`terminal_width`].
    pub fn detect_width<F>(&mut self, detect: F)
    where
        F: FnOnce() -> Option<usize>,
    {
        self.terminal_width = detect().filter(|&n| n > 0);
    }

    /// An explicit width wins, then `COLUMNS`, then the detected terminal
    /// width, then the configured default.
    pub fn width(&self, explicit: Option<usize>) -> usize {
        explicit
            .filter(|&n| n > 0)
            .or(self.columns)
            .or(self.terminal_width)
            .unwrap_or(self.default_width)
    }

    /// The styles to render with: the configured ones, or plain templates
    /// when color is off.
    pub fn effective_styles(&self) -> Styles {
        if self.color {
            self.styles.clone()
        } else {
            Styles::plain()
        }
    }
}

/// Width of the terminal attached to stdout, if any.
pub fn terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| usize::from(w))
}
