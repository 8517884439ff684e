//! Error types for template parsing.

use std::fmt;

use thiserror::Error;

/// A 1-based line and column in template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Computes the position of a byte offset within `source`.
    ///
    /// Columns count characters, not bytes.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors produced while turning template text into a parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An opening delimiter without its closing counterpart.
    #[error("unclosed tag at {position}")]
    UnclosedTag { position: Position },

    /// End of input reached while a section was still open.
    #[error("unclosed section '{name}' opened at {position}")]
    UnclosedSection { name: String, position: Position },

    /// A `/` tag whose name differs from the innermost open section.
    #[error("section '{expected}' closed by '{found}' at {position}")]
    MismatchedClose {
        expected: String,
        found: String,
        position: Position,
    },

    /// A `/` tag with no open section.
    #[error("closing tag '{name}' has no open section at {position}")]
    UnopenedClose { name: String, position: Position },

    /// A tag type this engine does not understand.
    #[error("unrecognized tag type '{sigil}' at {position}")]
    UnknownSigil { sigil: char, position: Position },

    /// A malformed set-delimiter tag.
    #[error("invalid delimiter change '{tag}' at {position}: {reason}")]
    InvalidDelimiters {
        tag: String,
        reason: String,
        position: Position,
    },

    /// A tag name that is not `.` or a dotted path of non-empty segments.
    #[error("invalid tag name '{name}' at {position}")]
    InvalidName { name: String, position: Position },

    /// A tag with nothing between its delimiters.
    #[error("empty tag at {position}")]
    EmptyTag { position: Position },

    /// More sections open at once than the parser allows.
    #[error("section '{name}' at {position} nested deeper than {limit} levels")]
    TooDeeplyNested {
        name: String,
        limit: usize,
        position: Position,
    },
}

impl ParseError {
    /// Where in the source the error was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnclosedTag { position }
            | ParseError::UnclosedSection { position, .. }
            | ParseError::MismatchedClose { position, .. }
            | ParseError::UnopenedClose { position, .. }
            | ParseError::UnknownSigil { position, .. }
            | ParseError::InvalidDelimiters { position, .. }
            | ParseError::InvalidName { position, .. }
            | ParseError::TooDeeplyNested { position, .. }
            | ParseError::EmptyTag { position } => *position,
        }
    }
}
