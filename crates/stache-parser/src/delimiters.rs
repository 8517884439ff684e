//! Tag delimiter pairs.
//!
//! Templates start with `{{` / `}}`. A set-delimiter tag (`{{=<% %>=}}`)
//! swaps the pair for the remainder of the region being parsed.

use std::fmt;

use thiserror::Error;

/// Default opening delimiter.
pub const DEFAULT_OPEN: &str = "{{";

/// Default closing delimiter.
pub const DEFAULT_CLOSE: &str = "}}";

/// Rejected delimiter pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid delimiters {open:?} {close:?}: {reason}")]
pub struct InvalidDelimiters {
    pub open: String,
    pub close: String,
    pub reason: &'static str,
}

/// An opening and closing tag marker.
///
/// Both markers are non-empty and contain neither whitespace nor `=`.
///
/// ```rust
/// use stache_parser::Delimiters;
///
/// let erb = Delimiters::new("<%", "%>").unwrap();
/// assert_eq!(erb.open(), "<%");
/// assert!(Delimiters::new("<% ", "%>").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Delimiters {
    /// Creates a validated delimiter pair.
    pub fn new(
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Result<Self, InvalidDelimiters> {
        let open = open.into();
        let close = close.into();

        let reason = if open.is_empty() || close.is_empty() {
            Some("delimiters must not be empty")
        } else if open.chars().chain(close.chars()).any(char::is_whitespace) {
            Some("delimiters must not contain whitespace")
        } else if open.contains('=') || close.contains('=') {
            Some("delimiters must not contain '='")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidDelimiters {
                open,
                close,
                reason,
            }),
            None => Ok(Self { open, close }),
        }
    }

    /// The opening marker.
    pub fn open(&self) -> &str {
        &self.open
    }

    /// The closing marker.
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Returns `true` for the `{{` / `}}` pair.
    pub fn is_default(&self) -> bool {
        self.open == DEFAULT_OPEN && self.close == DEFAULT_CLOSE
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
        }
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.open, self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_double_mustache() {
        let d = Delimiters::default();
        assert_eq!(d.open(), "{{");
        assert_eq!(d.close(), "}}");
        assert!(d.is_default());
    }

    #[test]
    fn custom_pair_accepted() {
        let d = Delimiters::new("[", "]").unwrap();
        assert_eq!(d.to_string(), "[ ]");
        assert!(!d.is_default());
    }

    #[test]
    fn rejects_empty() {
        let err = Delimiters::new("", "}}").unwrap_err();
        assert_eq!(err.reason, "delimiters must not be empty");
    }

    #[test]
    fn rejects_whitespace() {
        assert!(Delimiters::new("<\t", ">").is_err());
        assert!(Delimiters::new("<", "> ").is_err());
    }

    #[test]
    fn rejects_equals() {
        let err = Delimiters::new("<=", ">").unwrap_err();
        assert!(err.to_string().contains("'='"));
    }
}
