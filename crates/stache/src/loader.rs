//! Partial template loading.
//!
//! The engine resolves `{{>name}}` tags through a [`PartialLoader`]. The name
//! is opaque to the engine; a loader decides what it means. This crate ships
//! in-memory loaders only:
//!
//! - `HashMap<String, String>` and `BTreeMap<String, String>`
//! - [`PartialRegistry`], a named template store
//! - [`FnLoader`], which adapts a closure
//!
//! Loaders report an unknown name as [`Error::TemplateNotFound`]. The
//! renderer treats that error specially: in the default `ignore` mode the
//! partial renders as the empty string, in `strict` mode the error surfaces.
//! Any other error a loader returns always surfaces.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Error, Result};

/// Source of partial templates.
///
/// Implementations must be re-entrant: a partial may include other partials,
/// so `load_partial` can be called while an earlier call's template is
/// still rendering.
pub trait PartialLoader: Send + Sync {
    /// Returns the raw template text for `name`.
    ///
    /// # Errors
    ///
    /// [`Error::TemplateNotFound`] when no template has this name.
    fn load_partial(&self, name: &str) -> Result<String>;
}

impl PartialLoader for HashMap<String, String> {
    fn load_partial(&self, name: &str) -> Result<String> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }
}

impl PartialLoader for BTreeMap<String, String> {
    fn load_partial(&self, name: &str) -> Result<String> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }
}

/// An in-memory store of named templates.
///
/// # Example
///
/// ```rust
/// use stache::{PartialLoader, PartialRegistry};
///
/// let mut registry = PartialRegistry::new();
/// registry.add("header", "<h1>{{title}}</h1>");
/// registry.add("footer", "<hr>");
///
/// assert_eq!(registry.load_partial("header").unwrap(), "<h1>{{title}}</h1>");
/// assert!(registry.load_partial("sidebar").is_err());
/// assert_eq!(registry.names().collect::<Vec<_>>(), ["footer", "header"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PartialRegistry {
    templates: BTreeMap<String, String>,
}

impl PartialRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any previous one with the same name.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.insert(name.into(), content.into());
    }

    /// Removes a template, returning its content if it was registered.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.templates.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

impl PartialLoader for PartialRegistry {
    fn load_partial(&self, name: &str) -> Result<String> {
        self.templates.load_partial(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PartialRegistry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PartialRegistry {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, content) in iter {
            self.add(name, content);
        }
    }
}

/// Adapts a closure into a [`PartialLoader`]. `None` means "not found".
///
/// ```rust
/// use stache::{FnLoader, PartialLoader};
///
/// let loader = FnLoader::new(|name: &str| {
///     name.strip_prefix("greet-").map(|who| format!("Hello, {who}!"))
/// });
/// assert_eq!(loader.load_partial("greet-world").unwrap(), "Hello, world!");
/// assert!(loader.load_partial("other").is_err());
/// ```
pub struct FnLoader<F> {
    f: F,
}

impl<F> FnLoader<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> PartialLoader for FnLoader<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn load_partial(&self, name: &str) -> Result<String> {
        (self.f)(name).ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }
}

impl<F> fmt::Debug for FnLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLoader").finish_non_exhaustive()
    }
}
