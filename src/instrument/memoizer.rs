//! Result memoization and cache invalidation.
//!
//! [`Memoizer`] is an `around` advice: it consults the invoking instance's
//! cache before delegating and stores successful results, keyed by operation
//! name and argument list. [`MemoizerGuard`] is the matching invalidation
//! advice for mutating operations: woven onto a setter, it drops the cached
//! results that the mutation may have staled, on every exit path, because a
//! failed setter may still have mutated state.

use std::rc::Rc;

use crate::{
    advice::{Advice, HookSet, Proceed},
    context::JoinPoint,
    value::Value,
    Result,
};

/// Builds the cache key for one argument list.
///
/// The `Debug` form distinguishes value variants, so `Int(1)` and `Str("1")`
/// key separately.
fn args_key(args: &[Value]) -> String {
    format!("{args:?}")
}

/// Caches successful results of the operations it is woven onto.
///
/// Delegation is skipped entirely on a cache hit. Errors are never cached:
/// a failed invocation leaves the cache untouched and the error propagates
/// as usual. The cache lives on the instance (see
/// [`crate::target::Target::cache_store`]), so one memoizer may serve many
/// targets without mixing their results.
///
/// # Examples
///
/// ```rust
/// use callweave::prelude::*;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let runs = Rc::new(Cell::new(0u32));
/// let probe = Rc::clone(&runs);
///
/// let calc = Target::new("calc");
/// calc.define("square", move |_t, args| {
///     probe.set(probe.get() + 1);
///     let n = args[0].as_int().unwrap_or(0);
///     Ok(Value::Int(n * n))
/// });
///
/// Weaver::new().weave(&calc, "square", Memoizer::new())?;
///
/// assert_eq!(calc.call("square", &[Value::Int(3)])?, Value::Int(9));
/// assert_eq!(calc.call("square", &[Value::Int(3)])?, Value::Int(9));
/// assert_eq!(runs.get(), 1); // second call was a cache hit
/// # Ok::<(), callweave::Error>(())
/// ```
#[derive(Debug)]
pub struct Memoizer;

impl Memoizer {
    /// Creates a memoizer.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Memoizer)
    }
}

impl Advice for Memoizer {
    fn hooks(&self) -> HookSet {
        HookSet::AROUND
    }

    fn around(&self, join_point: &JoinPoint, proceed: Proceed<'_>, args: &[Value]) -> Result<Value> {
        let instance = join_point.instance();
        let operation = join_point.operation();
        let key = args_key(args);

        if let Some(hit) = instance.cache_lookup(operation, &key) {
            log::trace!(
                target: "callweave::memoizer",
                "cache hit for `{operation}` on `{}`",
                instance.label()
            );
            return Ok(hit);
        }

        let value = proceed.call(args)?;
        instance.cache_store(operation, key, value.clone());
        Ok(value)
    }
}

/// Invalidation scope of a [`MemoizerGuard`], fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GuardScope {
    /// Clear the whole instance cache.
    All,
    /// Evict only the named operations.
    Operations(Vec<String>),
}

/// Drops memoized results after the guarded operation completes.
///
/// Implements only the `after` hook, so invalidation runs on success *and*
/// failure. The scope is fixed at weave time: [`MemoizerGuard::new`] clears
/// the invoking instance's entire cache, [`MemoizerGuard::operations`]
/// evicts only the named entries and leaves the rest untouched.
///
/// # Examples
///
/// ```rust
/// use callweave::prelude::*;
///
/// let store = Target::new("store");
/// store.define("compute", |_t, _a| Ok(Value::Int(1)));
/// store.define("set", |_t, _a| Ok(Value::Null));
///
/// let weaver = Weaver::new();
/// weaver.weave(&store, "compute", Memoizer::new())?;
/// weaver.weave(&store, "set", MemoizerGuard::operations(["compute"]))?;
///
/// store.call("compute", &[])?;
/// assert_eq!(store.cached_operations(), vec!["compute".to_string()]);
///
/// store.call("set", &[Value::Int(7)])?;
/// assert!(store.cached_operations().is_empty());
/// # Ok::<(), callweave::Error>(())
/// ```
#[derive(Debug)]
pub struct MemoizerGuard {
    scope: GuardScope,
}

impl MemoizerGuard {
    /// Creates a guard that clears the whole instance cache.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(MemoizerGuard {
            scope: GuardScope::All,
        })
    }

    /// Creates a guard that evicts only the given operation names.
    #[must_use]
    pub fn operations<I, S>(operations: I) -> Rc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rc::new(MemoizerGuard {
            scope: GuardScope::Operations(operations.into_iter().map(Into::into).collect()),
        })
    }
}

impl Advice for MemoizerGuard {
    fn hooks(&self) -> HookSet {
        HookSet::AFTER
    }

    fn after(&self, join_point: &JoinPoint) {
        let instance = join_point.instance();
        match &self.scope {
            GuardScope::All => {
                log::trace!(
                    target: "callweave::memoizer",
                    "clearing cache on `{}` after `{}`",
                    instance.label(),
                    join_point.operation()
                );
                instance.cache_clear();
            }
            GuardScope::Operations(operations) => {
                for operation in operations {
                    instance.cache_evict(operation);
                }
            }
        }
    }
}
