//! Error types for rendering.
//!
//! [`Error`] covers every failure a render call can surface. Parsing errors
//! from [`stache_parser`] are wrapped unchanged so callers can still inspect
//! the line and column.

use stache_parser::{InvalidDelimiters, ParseError};
use thiserror::Error;

/// Error type for all rendering operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed template: bad tag, unbalanced section, bad delimiter change.
    #[error("parsing error: {0}")]
    Parsing(#[from] ParseError),

    /// A partial could not be loaded.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Strict mode only: a name resolved nowhere on the context stack.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A value could not be turned into output text.
    #[error("render error: {0}")]
    Render(String),

    /// Host data could not be converted into a [`Value`](crate::Value).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid renderer configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Template bytes were not valid in the configured encoding.
    #[error("decode error: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

impl Error {
    pub(crate) fn render(message: impl Into<String>) -> Self {
        Error::Render(message.into())
    }
}

impl From<InvalidDelimiters> for Error {
    fn from(err: InvalidDelimiters) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TemplateNotFound("header".to_string());
        assert_eq!(err.to_string(), "template not found: header");

        let err = Error::KeyNotFound("user.name".to_string());
        assert!(err.to_string().contains("user.name"));
    }

    #[test]
    fn test_from_parse_error() {
        let parse_err = stache_parser::parse("{{#a}}").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Parsing(ParseError::UnclosedSection { .. })));
        assert!(err.to_string().starts_with("parsing error:"));
    }

    #[test]
    fn test_from_invalid_delimiters() {
        let err: Error = stache_parser::Delimiters::new("", "}}").unwrap_err().into();
        assert!(matches!(err, Error::Config(_)));
    }

    trait AssertSendSync: Send + Sync + 'static {}
    impl AssertSendSync for Error {}
}
