//! Parse tree representation.
//!
//! A [`ParseTree`] is an ordered list of [`Node`]s. Section and inverted
//! section nodes own their bodies as nested trees. Trees are immutable once
//! built and are `Send + Sync`, so a parsed template can be shared between
//! threads and rendered concurrently.

use std::slice;

use crate::delimiters::Delimiters;

/// One element of a parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw text emitted verbatim.
    Literal(String),

    /// `{{name}}` (escaped) or `{{{name}}}` / `{{&name}}` (unescaped).
    Variable { name: String, escaped: bool },

    /// `{{#name}}...{{/name}}`.
    Section {
        name: String,
        body: ParseTree,
        /// Unparsed source between the opening and closing tags, handed to
        /// section lambdas.
        raw: String,
        /// Delimiters in force at the opening tag, used to parse lambda output.
        delimiters: Delimiters,
    },

    /// `{{^name}}...{{/name}}`.
    Inverted { name: String, body: ParseTree },

    /// `{{>name}}`. `indent` is the leading whitespace of a standalone
    /// partial tag, empty otherwise.
    Partial { name: String, indent: String },

    /// `{{! ... }}`. Never emits output.
    Comment,
}

impl Node {
    /// The tag name this node refers to, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Variable { name, .. }
            | Node::Section { name, .. }
            | Node::Inverted { name, .. }
            | Node::Partial { name, .. } => Some(name),
            Node::Literal(_) | Node::Comment => None,
        }
    }
}

/// An ordered sequence of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Node> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a ParseTree {
    type Item = &'a Node;
    type IntoIter = slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl IntoIterator for ParseTree {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
