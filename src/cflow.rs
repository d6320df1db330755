//! Control-flow queries over the active call chain.
//!
//! `cflow` answers "is there an active invocation matching instance X and/or
//! operation-name pattern P somewhere below us?" by scanning a context stack
//! from the most recent frame backward. It is read-only, short-circuits on
//! the first match, and is callable from inside any advice hook or from
//! ordinary code.
//!
//! # Examples
//!
//! ```rust
//! use callweave::prelude::*;
//!
//! let logger = Target::new("logger");
//! logger.define("write", |_t, _a| {
//!     // Suppress re-entrant logging triggered from inside a flush.
//!     if cflow(None, &[NamePattern::exact("flush")]) {
//!         return Ok(Value::Null);
//!     }
//!     Ok(Value::Bool(true))
//! });
//! ```

use crate::{context::ContextStack, target::TargetRef};
use std::rc::Rc;

/// A pattern matched against the operation name of an active join point.
///
/// Multiple patterns given to [`cflow`] are OR'd: a frame matches when any
/// pattern accepts its name. An empty pattern slice matches any name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    /// Matches the operation name exactly.
    Exact(String),
    /// Matches any operation name starting with the given prefix.
    Prefix(String),
    /// Matches any operation name containing the given substring.
    Contains(String),
}

impl NamePattern {
    /// An exact-match pattern.
    pub fn exact(name: impl Into<String>) -> Self {
        NamePattern::Exact(name.into())
    }

    /// A prefix pattern.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        NamePattern::Prefix(prefix.into())
    }

    /// A substring pattern.
    pub fn contains(fragment: impl Into<String>) -> Self {
        NamePattern::Contains(fragment.into())
    }

    /// Returns `true` if this pattern accepts `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(expected) => name == expected,
            NamePattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
            NamePattern::Contains(fragment) => name.contains(fragment.as_str()),
        }
    }
}

impl From<&str> for NamePattern {
    fn from(name: &str) -> Self {
        NamePattern::Exact(name.to_string())
    }
}

impl From<String> for NamePattern {
    fn from(name: String) -> Self {
        NamePattern::Exact(name)
    }
}

impl ContextStack {
    /// Returns `true` if this stack holds an active frame matching the
    /// given criteria.
    ///
    /// The scan runs from the innermost frame outward and stops at the first
    /// match, so the cost is `O(depth)` worst case and `O(1)` best case.
    /// `instance` filters by reference identity (`None` matches any
    /// instance); an empty `patterns` slice matches any operation name,
    /// otherwise a frame matches when *any* pattern accepts its name. The
    /// query never mutates the stack.
    #[must_use]
    pub fn cflow(&self, instance: Option<&TargetRef>, patterns: &[NamePattern]) -> bool {
        self.scan(|context| {
            let join_point = context.join_point();
            if let Some(instance) = instance {
                if !Rc::ptr_eq(join_point.instance(), instance) {
                    return false;
                }
            }
            patterns.is_empty() || patterns.iter().any(|p| p.matches(join_point.operation()))
        })
    }
}

/// Queries the calling thread's default context stack.
///
/// Equivalent to `ContextStack::current().cflow(instance, patterns)`; see
/// [`ContextStack::cflow`] for the matching rules.
#[must_use]
pub fn cflow(instance: Option<&TargetRef>, patterns: &[NamePattern]) -> bool {
    ContextStack::current().cflow(instance, patterns)
}
