//! Pre-parsed templates.

use stache_parser::{parse_with, Delimiters, ParseTree};

use crate::error::Result;
use crate::options::StringEncoding;

/// A template parsed once and rendered any number of times.
///
/// Build one with [`Renderer::compile`](crate::Renderer::compile) so it
/// starts from the renderer's delimiters, then render it with
/// [`Renderer::render_template`](crate::Renderer::render_template).
/// Templates are immutable and `Send + Sync`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    tree: ParseTree,
}

impl Template {
    /// Parses `source` with the default delimiters.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        Self::parse_with(source, &Delimiters::default())
    }

    /// Parses `source` starting from `delimiters`.
    pub fn parse_with(source: impl Into<String>, delimiters: &Delimiters) -> Result<Self> {
        let source = source.into();
        let tree = parse_with(&source, delimiters)?;
        Ok(Self { source, tree })
    }

    /// Decodes and parses template bytes with the default delimiters.
    pub fn from_bytes(bytes: &[u8], encoding: StringEncoding) -> Result<Self> {
        Self::parse(encoding.decode(bytes)?)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }
}
