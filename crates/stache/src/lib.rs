//! # Stache - Mustache Templates for Rust
//!
//! `stache` renders [Mustache](https://mustache.github.io/) templates: logic-less
//! templates made of variables, sections, inverted sections, partials, comments
//! and delimiter changes, with support for lambdas.
//!
//! ## Core Concepts
//!
//! - [`Renderer`]: Holds escaping, partials and delimiter settings; renders templates
//! - [`Value`]: Template data, built from any `serde::Serialize` type or by hand
//! - [`Object`]: Accessor trait for exposing host objects without serialization
//! - [`Lambda`]: Callable data for variable and section tags
//! - [`ContextStack`]: The stack of frames names are resolved against
//! - [`PartialLoader`]: Where `{{>name}}` tags get their templates
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Inbox {
//!     name: String,
//!     messages: Vec<String>,
//! }
//!
//! let template = "\
//! Hello {{name}}!
//! {{#messages}}
//! - {{.}}
//! {{/messages}}
//! {{^messages}}
//! No messages.
//! {{/messages}}
//! ";
//!
//! let output = stache::render(template, &Inbox {
//!     name: "Mom".into(),
//!     messages: vec!["Call me".into(), "<3".into()],
//! }).unwrap();
//!
//! assert_eq!(output, "Hello Mom!\n- Call me\n- &lt;3\n");
//! ```
//!
//! ## Lambdas
//!
//! Data that holds closures is built as a [`Value`] directly:
//!
//! ```rust
//! use stache::{Renderer, Value};
//!
//! let data: Value = [
//!     ("name", Value::from("Willy")),
//!     ("wrapped", Value::section_lambda(|text: &str| format!("<b>{text}</b>"))),
//! ]
//! .into_iter()
//! .collect();
//!
//! let output = Renderer::new()
//!     .render_value("{{#wrapped}}{{name}} is awesome.{{/wrapped}}", data)
//!     .unwrap();
//! assert_eq!(output, "<b>Willy is awesome.</b>");
//! ```
//!
//! ## Missing Names
//!
//! By default a name that resolves nowhere renders as the empty string. With
//! [`MissingTags::Strict`] it fails with [`Error::KeyNotFound`] instead.
//!
//! ```rust
//! use stache::{Error, MissingTags, Renderer};
//! use serde_json::json;
//!
//! assert_eq!(stache::render("[{{nope}}]", &json!({})).unwrap(), "[]");
//!
//! let strict = Renderer::builder().missing_tags(MissingTags::Strict).build().unwrap();
//! assert!(matches!(strict.render("{{nope}}", &json!({})), Err(Error::KeyNotFound(_))));
//! ```

mod context;
mod engine;
mod error;
mod escape;
mod loader;
mod options;
mod renderer;
mod template;
mod value;

pub use context::ContextStack;
pub use error::{Error, Result};
pub use escape::{html_escape, literal, EscapeFn};
pub use loader::{FnLoader, PartialLoader, PartialRegistry};
pub use options::{
    EscapeMode, MissingTags, RenderOptions, StringEncoding, DEFAULT_MAX_DEPTH,
};
pub use renderer::{Renderer, RendererBuilder};
pub use template::Template;
pub use value::{Lambda, Object, Value};

// Parser types, so hosts only depend on this crate
pub use stache_parser::{
    parse, parse_with, Delimiters, InvalidDelimiters, Node, ParseError, ParseTree, Parser,
    Position, DEFAULT_CLOSE, DEFAULT_OPEN, MAX_SECTION_DEPTH,
};

use serde::Serialize;

/// Renders `template` against `data` with a default [`Renderer`].
///
/// # Errors
///
/// Fails if the template does not parse, if `data` cannot be serialized, or
/// if the template references a partial (the default renderer has none).
pub fn render<T: Serialize + ?Sized>(template: &str, data: &T) -> Result<String> {
    Renderer::new().render(template, data)
}
