use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookseeError {
    /// The adapter could not produce an ancestor chain or a method table.
    #[error("could not resolve lookup path: {0}")]
    Resolution(String),

    #[error("invalid specifier `{specifier}`: {reason}")]
    InvalidFilter { specifier: String, reason: String },

    #[error("invalid style template `{template}`: {reason}")]
    InvalidStyle { template: String, reason: String },

    #[error("no such method `{0}`")]
    NameNotFound(String),

    #[error("no source location for `{0}`")]
    NoSourceLocation(String),
}

impl LookseeError {
    pub fn resolution(message: impl Into<String>) -> Self {
        LookseeError::Resolution(message.into())
    }

    pub fn invalid_filter(specifier: &str, reason: impl Into<String>) -> Self {
        LookseeError::InvalidFilter {
            specifier: specifier.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_style(template: &str, reason: impl Into<String>) -> Self {
        LookseeError::InvalidStyle {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = LookseeError> = std::result::Result<T, E>;
