//! Renderer configuration.
//!
//! [`RenderOptions`] is the serializable form of a renderer's settings. It
//! can be built in code, or loaded from YAML or JSON configuration text and
//! turned into a renderer with
//! [`Renderer::from_options`](crate::Renderer::from_options).
//!
//! ```rust
//! use stache::{MissingTags, RenderOptions};
//!
//! let options = RenderOptions::from_yaml(r#"
//! missing_tags: strict
//! delimiters: ["<%", "%>"]
//! partials:
//!   header: "<h1><%title%></h1>"
//! "#).unwrap();
//!
//! assert_eq!(options.missing_tags, MissingTags::Strict);
//! assert_eq!(options.delimiters, ("<%".to_string(), "%>".to_string()));
//! assert_eq!(options.max_depth, 128);
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stache_parser::{Delimiters, DEFAULT_CLOSE, DEFAULT_OPEN};

use crate::error::{Error, Result};
use crate::escape::{self, EscapeFn};

/// Render nesting limit used unless configured otherwise.
///
/// Sections, partials and lambda output each take one level. At 128 levels a
/// render fits comfortably in a 2 MiB thread stack, the default for spawned
/// threads.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Built-in escape behaviors for `{{name}}` tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// HTML-escape `& < > " '`.
    #[default]
    Html,
    /// Emit text unchanged.
    None,
}

impl EscapeMode {
    pub fn escape_fn(self) -> EscapeFn {
        match self {
            EscapeMode::Html => Arc::new(escape::html_escape),
            EscapeMode::None => Arc::new(escape::literal),
        }
    }
}

/// What happens when a name resolves nowhere on the context stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTags {
    /// Render the empty string.
    #[default]
    Ignore,
    /// Fail with [`Error::KeyNotFound`], or [`Error::TemplateNotFound`] for
    /// partials.
    Strict,
}

/// How template bytes are decoded into text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringEncoding {
    /// Reject invalid UTF-8.
    #[default]
    Utf8,
    /// Replace invalid sequences with U+FFFD.
    Utf8Lossy,
}

impl StringEncoding {
    /// Decodes `bytes`, borrowing them when they are already valid.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>> {
        match self {
            StringEncoding::Utf8 => Ok(Cow::Borrowed(std::str::from_utf8(bytes)?)),
            StringEncoding::Utf8Lossy => Ok(String::from_utf8_lossy(bytes)),
        }
    }
}

/// Serializable renderer settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    pub escape: EscapeMode,
    pub missing_tags: MissingTags,
    /// Initial `[open, close]` delimiter pair.
    pub delimiters: (String, String),
    pub string_encoding: StringEncoding,
    /// Partials by name. Empty means no loader is configured.
    pub partials: BTreeMap<String, String>,
    /// Combined nesting limit for sections, partials and lambda output.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape: EscapeMode::default(),
            missing_tags: MissingTags::default(),
            delimiters: (DEFAULT_OPEN.to_string(), DEFAULT_CLOSE.to_string()),
            string_encoding: StringEncoding::default(),
            partials: BTreeMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    /// Parses options from YAML. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for malformed YAML or unknown fields.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses options from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// The validated initial delimiter pair.
    pub fn delimiters(&self) -> Result<Delimiters> {
        let (open, close) = &self.delimiters;
        Ok(Delimiters::new(open.as_str(), close.as_str())?)
    }
}
