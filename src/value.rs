//! Dynamic values passed to and returned from woven operations.
//!
//! Target operations are dynamically typed: an operation receives an ordered
//! sequence of [`Value`]s and produces a single [`Value`]. The enum covers the
//! small set of shapes the framework needs to describe arguments, return
//! values and cached results without being generic over every host type.
//!
//! # Examples
//!
//! ```rust
//! use callweave::value::Value;
//!
//! let args = vec![Value::from(2), Value::from("tag")];
//! assert_eq!(args[0], Value::Int(2));
//! assert_eq!(args[1].to_string(), "tag");
//! ```

use std::fmt;

/// A dynamically typed value flowing through woven operations.
///
/// `Value` is cheap to clone for the sizes instrumentation deals with and
/// compares structurally, which the test suites and the memoization cache
/// rely on. The `Debug` representation distinguishes variants (`Int(1)` vs
/// `Str("1")`) and is therefore used wherever values are folded into cache
/// keys; `Display` is the human-readable form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value. Degraded operations and advice-only replacements
    /// produce `Null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// An owned string.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this value is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer payload, if this value is an [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string payload, if this value is a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this value is a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
