//! Runtime values for template data.
//!
//! [`Value`] is the tagged representation of everything a template can look
//! at: scalars, lists, maps, host objects behind the [`Object`] accessor
//! trait, and [`Lambda`]s. Compound variants are reference counted, so
//! pushing a value as a context frame or resolving a name never copies the
//! underlying data.
//!
//! # Building Values
//!
//! ```rust
//! use stache::Value;
//! use serde::Serialize;
//!
//! // From JSON
//! let data = Value::from(serde_json::json!({"name": "Mom", "tags": ["a", "b"]}));
//! assert_eq!(data.lookup("name"), Some(Value::from("Mom")));
//!
//! // From any serde type
//! #[derive(Serialize)]
//! struct User { name: String }
//! let user = Value::from_serialize(&User { name: "Al".into() }).unwrap();
//! assert_eq!(user.lookup("name"), Some(Value::from("Al")));
//!
//! // From key/value pairs, which is how lambdas get into a context
//! let data: Value = [
//!     ("planet", Value::from("world")),
//!     ("shout", Value::section_lambda(|text: &str| text.to_uppercase())),
//! ]
//! .into_iter()
//! .collect();
//! assert!(data.lookup("shout").unwrap().is_lambda());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Number;

use crate::error::{Error, Result};

/// Accessor interface for host objects used as template data.
///
/// Implement this for types that should expose named attributes to templates
/// without being serialized first. Any computation behind an attribute (what
/// a method call would be elsewhere) happens inside [`get`](Self::get).
///
/// ```rust
/// use stache::{Object, Value};
///
/// #[derive(Debug)]
/// struct Temperature { celsius: f64 }
///
/// impl Object for Temperature {
///     fn get(&self, key: &str) -> Option<Value> {
///         match key {
///             "celsius" => Some(self.celsius.into()),
///             "fahrenheit" => Some((self.celsius * 9.0 / 5.0 + 32.0).into()),
///             _ => None,
///         }
///     }
/// }
///
/// let value = Value::object(Temperature { celsius: 100.0 });
/// assert_eq!(value.lookup("fahrenheit"), Some(Value::from(212.0)));
/// assert_eq!(value.lookup("kelvin"), None);
/// ```
pub trait Object: fmt::Debug + Send + Sync {
    /// Returns the attribute named `key`, or `None` when it does not exist.
    ///
    /// An attribute that exists but holds nothing should return
    /// `Some(Value::Null)` so that name resolution stops at this object.
    fn get(&self, key: &str) -> Option<Value>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether sections iterate over [`iter`](Self::iter) instead of pushing
    /// the object itself.
    fn is_list(&self) -> bool {
        false
    }

    fn iter(&self) -> Vec<Value> {
        Vec::new()
    }

    fn is_truthy(&self) -> bool {
        !self.is_list() || !self.iter().is_empty()
    }

    /// Text used when the object itself is interpolated.
    fn to_text(&self) -> Option<String> {
        None
    }
}

type VariableFn = dyn Fn() -> Value + Send + Sync;
type SectionFn = dyn Fn(&str) -> Value + Send + Sync;

#[derive(Clone)]
enum LambdaKind {
    Variable(Arc<VariableFn>),
    Section(Arc<SectionFn>),
}

/// A callable data value.
///
/// Variable lambdas take no arguments and are used by `{{name}}` tags; their
/// result is rendered as a template with the default delimiters. Section
/// lambdas receive the unparsed section body and their result is rendered
/// with the delimiters active at the section.
#[derive(Clone)]
pub struct Lambda {
    kind: LambdaKind,
}

impl Lambda {
    /// A zero-argument lambda for variable tags.
    pub fn variable<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self {
            kind: LambdaKind::Variable(Arc::new(move || f().into())),
        }
    }

    /// A one-argument lambda for section tags.
    pub fn section<F, R>(f: F) -> Self
    where
        F: Fn(&str) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self {
            kind: LambdaKind::Section(Arc::new(move |text: &str| f(text).into())),
        }
    }

    /// Number of arguments the lambda takes: 0 or 1.
    pub fn arity(&self) -> usize {
        match self.kind {
            LambdaKind::Variable(_) => 0,
            LambdaKind::Section(_) => 1,
        }
    }

    /// Invokes a zero-argument lambda. `None` for section lambdas.
    pub fn call(&self) -> Option<Value> {
        match &self.kind {
            LambdaKind::Variable(f) => Some(f()),
            LambdaKind::Section(_) => None,
        }
    }

    /// Invokes a section lambda with the raw section text. `None` for
    /// variable lambdas.
    pub fn call_with(&self, text: &str) -> Option<Value> {
        match &self.kind {
            LambdaKind::Variable(_) => None,
            LambdaKind::Section(f) => Some(f(text)),
        }
    }

    fn ptr_eq(&self, other: &Lambda) -> bool {
        match (&self.kind, &other.kind) {
            (LambdaKind::Variable(a), LambdaKind::Variable(b)) => Arc::ptr_eq(a, b),
            (LambdaKind::Section(a), LambdaKind::Section(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda(arity = {})", self.arity())
    }
}

/// A template data value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
    Object(Arc<dyn Object>),
    Lambda(Lambda),
}

impl Value {
    /// Converts any serializable host value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Wraps a host object.
    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    /// A zero-argument lambda, see [`Lambda::variable`].
    pub fn lambda<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Value::Lambda(Lambda::variable(f))
    }

    /// A section lambda, see [`Lambda::section`].
    pub fn section_lambda<F, R>(f: F) -> Self
    where
        F: Fn(&str) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Value::Lambda(Lambda::section(f))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Lambda(_) => "lambda",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Value::Lambda(_))
    }

    /// Whether the value is a scalar: null, bool, number or string.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Mustache truthiness.
    ///
    /// Null, `false`, the empty string, empty lists and empty maps are
    /// falsey. Numbers, zero included, and lambdas are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Object(object) => object.is_truthy(),
            Value::Lambda(_) => true,
        }
    }

    /// Looks up `key` on this value used as a context frame.
    ///
    /// Only maps and objects expose names. Scalars and lists never do: the
    /// string `"abc"` has no `len` attribute here.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(key).cloned(),
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }

    /// Converts the value to output text.
    ///
    /// Lists and maps render as compact JSON. Objects use
    /// [`Object::to_text`]. Lambdas must be invoked first.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Value::Null => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) => Ok(s.clone()),
            Value::List(_) | Value::Map(_) => Ok(serde_json::to_string(self)?),
            Value::Object(object) => object
                .to_text()
                .ok_or_else(|| Error::render(format!("object {object:?} has no text form"))),
            Value::Lambda(_) => Err(Error::render("a lambda cannot be converted to text")),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Object(object) if object.is_list() => {
                let items = object.iter();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(object) => match object.to_text() {
                Some(text) => serializer.serialize_str(&text),
                None => Err(S::Error::custom(format!(
                    "object {object:?} cannot be serialized"
                ))),
            },
            Value::Lambda(_) => Err(S::Error::custom("lambdas cannot be serialized")),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(Arc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => Value::Map(Arc::new(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats become [`Value::Null`].
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::from(f64::from(n))
    }
}

impl From<Lambda> for Value {
    fn from(lambda: Lambda) -> Self {
        Value::Lambda(lambda)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(map: HashMap<String, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(Arc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}
