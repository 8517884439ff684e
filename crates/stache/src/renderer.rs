//! The renderer facade.
//!
//! A [`Renderer`] holds everything that stays fixed between renders: the
//! escape and literal functions, the partial loader, the missing-tag policy
//! and the initial delimiters. Each render call builds a fresh context stack
//! from the caller's data and runs a new engine over it, so one renderer can
//! be shared between threads.
//!
//! # Example
//!
//! ```rust
//! use stache::{MissingTags, Renderer};
//! use serde_json::json;
//!
//! let renderer = Renderer::builder()
//!     .partials([("item", "<li>{{.}}</li>")])
//!     .missing_tags(MissingTags::Strict)
//!     .build()
//!     .unwrap();
//!
//! let out = renderer
//!     .render("<ul>{{#items}}{{>item}}{{/items}}</ul>", &json!({"items": ["a", "b"]}))
//!     .unwrap();
//! assert_eq!(out, "<ul><li>a</li><li>b</li></ul>");
//! ```

use std::sync::Arc;

use serde::Serialize;
use stache_parser::Delimiters;
use tracing::trace;

use crate::context::ContextStack;
use crate::engine::{RenderEngine, Settings};
use crate::error::{Error, Result};
use crate::escape::{self, EscapeFn};
use crate::loader::{PartialLoader, PartialRegistry};
use crate::options::{
    EscapeMode, MissingTags, RenderOptions, StringEncoding, DEFAULT_MAX_DEPTH,
};
use crate::template::Template;
use crate::value::Value;

/// Parses and renders Mustache templates.
#[derive(Debug, Clone)]
pub struct Renderer {
    settings: Settings,
    string_encoding: StringEncoding,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// A renderer with HTML escaping, `{{ }}` delimiters and no partials.
    pub fn new() -> Self {
        Self {
            settings: Settings {
                escape: EscapeMode::Html.escape_fn(),
                literal: Arc::new(escape::literal),
                loader: None,
                missing_tags: MissingTags::Ignore,
                delimiters: Delimiters::default(),
                max_depth: DEFAULT_MAX_DEPTH,
            },
            string_encoding: StringEncoding::Utf8,
        }
    }

    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    /// Builds a renderer from serializable options.
    ///
    /// A non-empty `partials` map becomes the partial loader.
    pub fn from_options(options: RenderOptions) -> Result<Self> {
        let (open, close) = options.delimiters;
        let mut builder = Self::builder()
            .escape_mode(options.escape)
            .missing_tags(options.missing_tags)
            .delimiters(open, close)
            .string_encoding(options.string_encoding)
            .max_depth(options.max_depth);
        if !options.partials.is_empty() {
            builder = builder.partials(options.partials);
        }
        builder.build()
    }

    /// The delimiters templates and partials start with.
    pub fn delimiters(&self) -> &Delimiters {
        &self.settings.delimiters
    }

    pub fn missing_tags(&self) -> MissingTags {
        self.settings.missing_tags
    }

    pub fn string_encoding(&self) -> StringEncoding {
        self.string_encoding
    }

    /// Renders `template` against serializable data.
    ///
    /// Data holding lambdas or host objects cannot go through serde; pass a
    /// [`Value`] to [`render_value`](Self::render_value) instead.
    pub fn render<T: Serialize + ?Sized>(&self, template: &str, data: &T) -> Result<String> {
        self.render_value(template, Value::from_serialize(data)?)
    }

    /// Renders `template` with `data` as the only context frame.
    pub fn render_value(&self, template: &str, data: impl Into<Value>) -> Result<String> {
        let mut stack = ContextStack::from(data.into());
        self.render_in(template, &mut stack)
    }

    /// Renders against a copy of an existing context stack.
    pub fn render_stack(&self, template: &str, stack: &ContextStack) -> Result<String> {
        let mut stack = stack.clone();
        self.render_in(template, &mut stack)
    }

    /// Renders with `overrides` pushed above `data`, so its names win.
    ///
    /// ```rust
    /// use stache::{Renderer, Value};
    /// use serde_json::json;
    ///
    /// let renderer = Renderer::new();
    /// let out = renderer
    ///     .render_with_overrides(
    ///         "{{greeting}}, {{name}}",
    ///         json!({"greeting": "Hi", "name": "Al"}),
    ///         json!({"name": "Mom"}),
    ///     )
    ///     .unwrap();
    /// assert_eq!(out, "Hi, Mom");
    /// ```
    pub fn render_with_overrides(
        &self,
        template: &str,
        data: impl Into<Value>,
        overrides: impl Into<Value>,
    ) -> Result<String> {
        let mut stack = ContextStack::from(data.into());
        stack.push(overrides);
        self.render_in(template, &mut stack)
    }

    /// Decodes template bytes with the configured string encoding, then
    /// renders them like [`render`](Self::render).
    pub fn render_bytes<T: Serialize + ?Sized>(&self, template: &[u8], data: &T) -> Result<String> {
        let template = self.string_encoding.decode(template)?;
        self.render(&template, data)
    }

    /// Parses `source` once, starting from this renderer's delimiters.
    pub fn compile(&self, source: impl Into<String>) -> Result<Template> {
        Template::parse_with(source, &self.settings.delimiters)
    }

    /// Renders a compiled template against serializable data.
    pub fn render_template<T: Serialize + ?Sized>(
        &self,
        template: &Template,
        data: &T,
    ) -> Result<String> {
        self.render_template_value(template, Value::from_serialize(data)?)
    }

    /// Renders a compiled template with `data` as the only context frame.
    pub fn render_template_value(
        &self,
        template: &Template,
        data: impl Into<Value>,
    ) -> Result<String> {
        let mut stack = ContextStack::from(data.into());
        RenderEngine::new(&self.settings).render_tree(template.tree(), &mut stack)
    }

    fn render_in(&self, template: &str, stack: &mut ContextStack) -> Result<String> {
        trace!(bytes = template.len(), frames = stack.len(), "rendering template");
        RenderEngine::new(&self.settings).render(template, stack)
    }
}

/// Fluent configuration for a [`Renderer`].
///
/// ```rust
/// use stache::Renderer;
///
/// let renderer = Renderer::builder()
///     .delimiters("<%", "%>")
///     .escape(|s: &str| s.replace('<', "[lt]"))
///     .build()
///     .unwrap();
/// assert_eq!(renderer.render_value("<%x%>", [("x", "<")].into_iter().collect::<stache::Value>()).unwrap(), "[lt]");
///
/// assert!(Renderer::builder().delimiters("", "}}").build().is_err());
/// ```
pub struct RendererBuilder {
    escape: EscapeFn,
    literal: EscapeFn,
    loader: Option<Arc<dyn PartialLoader>>,
    missing_tags: MissingTags,
    delimiters: (String, String),
    string_encoding: StringEncoding,
    max_depth: usize,
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererBuilder {
    pub fn new() -> Self {
        let defaults = RenderOptions::default();
        Self {
            escape: defaults.escape.escape_fn(),
            literal: Arc::new(escape::literal),
            loader: None,
            missing_tags: defaults.missing_tags,
            delimiters: defaults.delimiters,
            string_encoding: defaults.string_encoding,
            max_depth: defaults.max_depth,
        }
    }

    /// Replaces the function applied to `{{name}}` output.
    pub fn escape<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.escape = Arc::new(f);
        self
    }

    /// Selects one of the built-in escape functions.
    pub fn escape_mode(mut self, mode: EscapeMode) -> Self {
        self.escape = mode.escape_fn();
        self
    }

    /// Replaces the function applied to `{{{name}}}` and `{{&name}}` output.
    pub fn literal<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.literal = Arc::new(f);
        self
    }

    /// Uses a fixed name to template mapping as the partial loader.
    pub fn partials<I, K, V>(self, partials: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.loader(partials.into_iter().collect::<PartialRegistry>())
    }

    pub fn loader(mut self, loader: impl PartialLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn missing_tags(mut self, missing_tags: MissingTags) -> Self {
        self.missing_tags = missing_tags;
        self
    }

    /// Initial delimiters for templates. Checked by [`build`](Self::build).
    ///
    /// Partials and the output of variable lambdas are parsed starting from
    /// this pair too, not from `{{ }}`. A section lambda's output is parsed
    /// with the delimiters in force at its section.
    pub fn delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delimiters = (open.into(), close.into());
        self
    }

    pub fn string_encoding(mut self, encoding: StringEncoding) -> Self {
        self.string_encoding = encoding;
        self
    }

    /// How deeply sections, partials and lambda output may nest before a
    /// render fails with [`Error::Render`]. Each open section, partial and
    /// rendered lambda result counts one level.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// # Errors
    ///
    /// [`Error::Config`] for invalid delimiters or a zero depth.
    pub fn build(self) -> Result<Renderer> {
        let (open, close) = self.delimiters;
        let delimiters = Delimiters::new(open, close)?;
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        Ok(Renderer {
            settings: Settings {
                escape: self.escape,
                literal: self.literal,
                loader: self.loader,
                missing_tags: self.missing_tags,
                delimiters,
                max_depth: self.max_depth,
            },
            string_encoding: self.string_encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_serializable_structs() {
        #[derive(Serialize)]
        struct Page {
            title: String,
            items: Vec<u32>,
        }
        let page = Page {
            title: "Nums".into(),
            items: vec![1, 2],
        };
        let out = Renderer::new()
            .render("{{title}}:{{#items}} {{.}}{{/items}}", &page)
            .unwrap();
        assert_eq!(out, "Nums: 1 2");
    }

    #[test]
    fn render_stack_leaves_the_original_alone() {
        let mut stack = ContextStack::from(Value::from(json!({"a": "root"})));
        stack.push(Value::from(json!({"a": "top"})));
        let out = Renderer::new().render_stack("{{a}}", &stack).unwrap();
        assert_eq!(out, "top");
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn custom_literal_wraps_unescaped_output() {
        let renderer = Renderer::builder()
            .literal(|s: &str| format!("[{s}]"))
            .build()
            .unwrap();
        assert_eq!(
            renderer.render("{{{a}}}{{a}}", &json!({"a": "x"})).unwrap(),
            "[x]x"
        );
    }

    #[test]
    fn from_options_wires_everything() {
        let options = RenderOptions::from_yaml(
            r#"
escape: none
missing_tags: strict
delimiters: ["[[", "]]"]
partials:
  p: "<[[v]]>"
"#,
        )
        .unwrap();
        let renderer = Renderer::from_options(options).unwrap();
        assert_eq!(renderer.missing_tags(), MissingTags::Strict);
        assert_eq!(
            renderer.render("[[>p]]", &json!({"v": "&"})).unwrap(),
            "<&>"
        );
        assert!(matches!(
            renderer.render("[[nope]]", &json!({})),
            Err(Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn build_rejects_bad_settings() {
        assert!(matches!(
            Renderer::builder().delimiters("{{", "} }").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Renderer::builder().max_depth(0).build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn render_bytes_uses_configured_encoding() {
        let strict = Renderer::new();
        assert!(matches!(
            strict.render_bytes(b"\xfe{{x}}", &json!({"x": 1})),
            Err(Error::Decode(_))
        ));

        let lossy = Renderer::builder()
            .string_encoding(StringEncoding::Utf8Lossy)
            .build()
            .unwrap();
        assert_eq!(
            lossy.render_bytes(b"\xfe{{x}}", &json!({"x": 1})).unwrap(),
            "\u{FFFD}1"
        );
    }

    #[test]
    fn compiled_templates_render_repeatedly() {
        let renderer = Renderer::builder().delimiters("<%", "%>").build().unwrap();
        let template = renderer.compile("<%#xs%><%.%><%/xs%>").unwrap();
        for _ in 0..2 {
            assert_eq!(
                renderer
                    .render_template(&template, &json!({"xs": [1, 2]}))
                    .unwrap(),
                "12"
            );
        }
    }

    #[test]
    fn renderer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Renderer>();
    }
}
