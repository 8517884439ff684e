//! Mustache template parser.
//!
//! This crate turns Mustache template text into an immutable [`ParseTree`].
//! It knows nothing about data or rendering; the `stache` crate walks the
//! tree against a context stack.
//!
//! # Example
//!
//! ```rust
//! use stache_parser::{parse, Node};
//!
//! let tree = parse("{{#items}}- {{name}}\n{{/items}}").unwrap();
//! match &tree.nodes()[0] {
//!     Node::Section { name, raw, .. } => {
//!         assert_eq!(name, "items");
//!         assert_eq!(raw, "- {{name}}\n");
//!     }
//!     other => panic!("unexpected node {other:?}"),
//! }
//! ```
//!
//! # Tag Syntax
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | Escaped variable |
//! | `{{{name}}}`, `{{&name}}` | Unescaped variable |
//! | `{{#name}}` ... `{{/name}}` | Section |
//! | `{{^name}}` ... `{{/name}}` | Inverted section |
//! | `{{>name}}` | Partial |
//! | `{{! text }}` | Comment |
//! | `{{=<% %>=}}` | Change delimiters |
//!
//! Names are `.` (the implicit iterator) or dot-separated paths such as
//! `person.address.city`.

mod delimiters;
mod error;
mod node;
mod parser;

pub use delimiters::{Delimiters, InvalidDelimiters, DEFAULT_CLOSE, DEFAULT_OPEN};
pub use error::{ParseError, Position};
pub use node::{Node, ParseTree};
pub use parser::{parse, parse_with, Parser, MAX_SECTION_DEPTH};
