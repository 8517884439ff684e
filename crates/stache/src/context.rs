//! The context stack used for name resolution.
//!
//! A [`ContextStack`] is a LIFO list of [`Value`] frames. Rendering starts
//! with the caller's data as the only frame; every section iteration pushes
//! the current element and pops it again once the body is rendered.
//!
//! # Name Resolution
//!
//! - `.` is the top frame.
//! - The first segment of a dotted name is looked up in each frame from the
//!   top down. The first frame that has it wins, even when the value found
//!   there is null.
//! - Remaining segments are looked up on that single value only.
//!
//! ```rust
//! use stache::{ContextStack, Value};
//! use serde_json::json;
//!
//! let mut stack = ContextStack::from(Value::from(json!({"a": {"b": {}}, "b": {"c": "outer"}})));
//! assert_eq!(stack.get("b.c"), Some(Value::from("outer")));
//!
//! // Once `b` resolves on the top frame, `b.c` does not fall back to the root.
//! let a = stack.get("a").unwrap();
//! stack.push(a);
//! assert_eq!(stack.get("b.c"), None);
//! ```

use crate::value::Value;

/// LIFO stack of data frames.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<Value>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a frame on top of the stack.
    pub fn push(&mut self, frame: impl Into<Value>) {
        self.frames.push(frame.into());
    }

    /// Removes and returns the top frame, `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<Value> {
        self.frames.pop()
    }

    /// The top frame, `None` when the stack is empty.
    pub fn top(&self) -> Option<&Value> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from bottom to top.
    pub fn frames(&self) -> &[Value] {
        &self.frames
    }

    /// Resolves a possibly dotted name, returning `None` on a miss at any
    /// step. Values are returned as found; lambdas are not invoked.
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == "." {
            return self.top().cloned();
        }

        let mut parts = name.split('.');
        let first = parts.next()?;
        let mut value = self.frames.iter().rev().find_map(|frame| frame.lookup(first))?;
        for part in parts {
            value = value.lookup(part)?;
        }
        Some(value)
    }

    /// Like [`get`](Self::get) with a fallback for misses.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.get(name).unwrap_or(default)
    }

    /// Runs `f` with `frame` pushed, restoring the previous depth afterwards
    /// whatever `f` returns.
    pub fn with_frame<R>(&mut self, frame: Value, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.frames.len();
        self.frames.push(frame);
        let result = f(self);
        self.frames.truncate(depth);
        result
    }
}

impl From<Value> for ContextStack {
    fn from(root: Value) -> Self {
        Self { frames: vec![root] }
    }
}

impl From<Vec<Value>> for ContextStack {
    /// Builds a stack from frames listed bottom first.
    fn from(frames: Vec<Value>) -> Self {
        Self { frames }
    }
}
