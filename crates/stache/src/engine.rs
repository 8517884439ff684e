//! Parse tree evaluation.
//!
//! [`RenderEngine`] walks a [`ParseTree`] against a [`ContextStack`] and
//! appends output to a buffer. One engine lives for one top-level render
//! call: it owns the parsed-partial cache and the nesting counter, and
//! borrows everything else from the renderer's [`Settings`].
//!
//! The walk is recursive. Every section body, inverted section body, partial
//! and rendered lambda result takes one nesting level, and all of them share
//! the `max_depth` budget, so a runaway template fails with
//! [`Error::Render`] instead of exhausting the thread's stack.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use stache_parser::{parse_with, Delimiters, Node, ParseTree};
use tracing::{debug, trace};

use crate::context::ContextStack;
use crate::error::{Error, Result};
use crate::escape::EscapeFn;
use crate::loader::PartialLoader;
use crate::options::MissingTags;
use crate::value::{Lambda, Value};

/// Renderer state shared by every render call.
#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) escape: EscapeFn,
    pub(crate) literal: EscapeFn,
    pub(crate) loader: Option<Arc<dyn PartialLoader>>,
    pub(crate) missing_tags: MissingTags,
    pub(crate) delimiters: Delimiters,
    pub(crate) max_depth: usize,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("loader", &self.loader.is_some())
            .field("missing_tags", &self.missing_tags)
            .field("delimiters", &self.delimiters)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

pub(crate) struct RenderEngine<'s> {
    settings: &'s Settings,
    /// Parsed partials keyed by name and indentation.
    partials: HashMap<(String, String), Arc<ParseTree>>,
    /// Open sections, partials and lambda renders.
    depth: usize,
}

impl<'s> RenderEngine<'s> {
    pub(crate) fn new(settings: &'s Settings) -> Self {
        Self {
            settings,
            partials: HashMap::new(),
            depth: 0,
        }
    }

    /// Parses `template` with the configured delimiters and renders it.
    pub(crate) fn render(&mut self, template: &str, stack: &mut ContextStack) -> Result<String> {
        let tree = parse_with(template, &self.settings.delimiters)?;
        self.render_tree(&tree, stack)
    }

    /// Renders a parsed tree into a fresh string.
    ///
    /// The stack is back at its starting depth when this returns, whether
    /// rendering succeeded or not.
    pub(crate) fn render_tree(&mut self, tree: &ParseTree, stack: &mut ContextStack) -> Result<String> {
        let depth = stack.len();
        let mut out = String::new();
        let result = self.write_tree(tree, stack, &mut out);
        while stack.len() > depth {
            stack.pop();
        }
        result.map(|()| out)
    }

    fn write_tree(&mut self, tree: &ParseTree, stack: &mut ContextStack, out: &mut String) -> Result<()> {
        for node in tree {
            self.write_node(node, stack, out)?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: &Node, stack: &mut ContextStack, out: &mut String) -> Result<()> {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Comment => {}
            Node::Variable { name, escaped } => {
                let text = self.variable_text(name, stack)?;
                let filter = if *escaped {
                    &self.settings.escape
                } else {
                    &self.settings.literal
                };
                out.push_str(&filter(&text));
            }
            Node::Section {
                name,
                body,
                raw,
                delimiters,
            } => {
                let value = self.resolve(name, stack)?;
                self.write_section(name, value, body, raw, delimiters, stack, out)?;
            }
            Node::Inverted { name, body } => {
                if !self.resolve(name, stack)?.is_truthy() {
                    self.nest("section", name)?;
                    let result = self.write_tree(body, stack, out);
                    self.leave();
                    result?;
                }
            }
            Node::Partial { name, indent } => self.write_partial(name, indent, stack, out)?,
        }
        Ok(())
    }

    /// Looks a name up, applying the missing-tag policy.
    fn resolve(&self, name: &str, stack: &ContextStack) -> Result<Value> {
        match stack.get(name) {
            Some(value) => Ok(value),
            None if self.settings.missing_tags == MissingTags::Strict => {
                Err(Error::KeyNotFound(name.to_string()))
            }
            None => {
                debug!(name, "name not found on context stack");
                Ok(Value::Null)
            }
        }
    }

    /// Unfiltered text for a variable tag.
    fn variable_text(&mut self, name: &str, stack: &mut ContextStack) -> Result<String> {
        match self.resolve(name, stack)? {
            Value::Lambda(lambda) => {
                trace!(name, "invoking variable lambda");
                let result = lambda.call().ok_or_else(|| {
                    Error::render(format!("section lambda '{name}' used in a variable tag"))
                })?;
                let source = lambda_source(name, result)?;
                let tree = parse_with(&source, &self.settings.delimiters)?;
                self.nest("lambda", name)?;
                let result = self.render_tree(&tree, stack);
                self.leave();
                result
            }
            value => value.to_text(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_section(
        &mut self,
        name: &str,
        value: Value,
        body: &ParseTree,
        raw: &str,
        delimiters: &Delimiters,
        stack: &mut ContextStack,
        out: &mut String,
    ) -> Result<()> {
        let value = match value {
            Value::Lambda(lambda) => match self.section_lambda(name, &lambda, raw)? {
                LambdaOutput::Template(source) => {
                    let tree = parse_with(&source, delimiters)?;
                    self.nest("lambda", name)?;
                    let result = self.write_tree(&tree, stack, out);
                    self.leave();
                    return result;
                }
                LambdaOutput::Value(value) => value,
            },
            value => value,
        };

        if !value.is_truthy() {
            return Ok(());
        }

        trace!(name, kind = value.kind(), "rendering section");
        self.nest("section", name)?;
        let result = match &value {
            Value::List(items) => items.iter().try_for_each(|item| {
                stack.with_frame(item.clone(), |stack| self.write_tree(body, stack, out))
            }),
            Value::Object(object) if object.is_list() => {
                object.iter().into_iter().try_for_each(|item| {
                    stack.with_frame(item, |stack| self.write_tree(body, stack, out))
                })
            }
            _ => stack.with_frame(value.clone(), |stack| self.write_tree(body, stack, out)),
        };
        self.leave();
        result
    }

    fn section_lambda(&self, name: &str, lambda: &Lambda, raw: &str) -> Result<LambdaOutput> {
        trace!(name, arity = lambda.arity(), "invoking section lambda");
        if let Some(result) = lambda.call_with(raw) {
            return Ok(LambdaOutput::Template(lambda_source(name, result)?));
        }
        match lambda.call() {
            Some(result) if result.is_scalar() => Ok(LambdaOutput::Value(result)),
            Some(result) => Err(lambda_result_error(name, &result)),
            None => Err(Error::render(format!("lambda '{name}' could not be invoked"))),
        }
    }

    fn write_partial(
        &mut self,
        name: &str,
        indent: &str,
        stack: &mut ContextStack,
        out: &mut String,
    ) -> Result<()> {
        let Some(tree) = self.partial_tree(name, indent)? else {
            return Ok(());
        };

        self.nest("partial", name)?;
        let result = self.write_tree(&tree, stack, out);
        self.leave();
        result
    }

    /// Enters one nesting level, failing once `max_depth` levels are open.
    fn nest(&mut self, kind: &str, name: &str) -> Result<()> {
        if self.depth >= self.settings.max_depth {
            return Err(Error::render(format!(
                "{kind} '{name}' nested deeper than {} levels",
                self.settings.max_depth
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Loads, indents, parses and caches a partial. `None` when the loader
    /// does not know the name and missing tags are ignored.
    fn partial_tree(&mut self, name: &str, indent: &str) -> Result<Option<Arc<ParseTree>>> {
        let key = (name.to_string(), indent.to_string());
        if let Some(tree) = self.partials.get(&key) {
            return Ok(Some(Arc::clone(tree)));
        }

        let loader = self
            .settings
            .loader
            .as_ref()
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
        let source = match loader.load_partial(name) {
            Ok(source) => source,
            Err(Error::TemplateNotFound(_)) if self.settings.missing_tags == MissingTags::Ignore => {
                debug!(name, "partial not found, rendering nothing");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        debug!(name, indent = indent.len(), bytes = source.len(), "loaded partial");

        let source = indent_lines(&source, indent);
        let tree = Arc::new(parse_with(&source, &self.settings.delimiters)?);
        self.partials.insert(key, Arc::clone(&tree));
        Ok(Some(tree))
    }
}

enum LambdaOutput {
    /// Text to parse and render in place of the section.
    Template(String),
    /// A value to use as the section's value.
    Value(Value),
}

fn lambda_result_error(name: &str, result: &Value) -> Error {
    Error::render(format!(
        "lambda '{name}' returned a {}, expected a scalar",
        result.kind()
    ))
}

/// Template text produced by a lambda.
fn lambda_source(name: &str, result: Value) -> Result<String> {
    if !result.is_scalar() {
        return Err(lambda_result_error(name, &result));
    }
    result.to_text()
}

/// Prefixes every line holding at least one character other than its line
/// terminator (`\r\n`, `\n` or `\r`) with `indent`.
fn indent_lines(source: &str, indent: &str) -> String {
    if indent.is_empty() {
        return source.to_string();
    }
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while !rest.is_empty() {
        let end = match rest.find(['\r', '\n']) {
            Some(i) if rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => rest.len(),
        };
        let (line, tail) = rest.split_at(end);
        if !line.trim_end_matches(['\r', '\n']).is_empty() {
            out.push_str(indent);
        }
        out.push_str(line);
        rest = tail;
    }
    out
}
