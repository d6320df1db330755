//! Call and error counting.

use std::cell::Cell;
use std::rc::Rc;

use crate::{
    advice::{Advice, HookSet},
    context::JoinPoint,
    value::Value,
    Error,
};

/// Counts invocations and failures of the operations it is woven onto.
///
/// `before` increments `calls` (so failed invocations are counted too);
/// `afterThrowing` increments `errors`, and per its contract success paths
/// never touch the error count. One counter may be woven onto several
/// operations to aggregate across them.
///
/// # Examples
///
/// ```rust
/// use callweave::prelude::*;
///
/// let svc = Target::new("svc");
/// svc.define("work", |_t, args| {
///     if args.is_empty() {
///         return Err(callweave::Error::raised("no input"));
///     }
///     Ok(Value::Bool(true))
/// });
///
/// let counter = Counter::new();
/// Weaver::new().weave(&svc, "work", counter.clone())?;
///
/// svc.call("work", &[Value::Int(1)])?;
/// let _ = svc.call("work", &[]);
///
/// assert_eq!(counter.calls(), 2);
/// assert_eq!(counter.errors(), 1);
/// # Ok::<(), callweave::Error>(())
/// ```
#[derive(Debug)]
pub struct Counter {
    calls: Cell<u64>,
    errors: Cell<u64>,
}

impl Counter {
    /// Creates a counter with both tallies at zero.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Counter {
            calls: Cell::new(0),
            errors: Cell::new(0),
        })
    }

    /// Total invocations observed, successful or not.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.get()
    }

    /// Invocations that ended in an error.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.get()
    }

    /// Zeroes both tallies.
    pub fn reset(&self) {
        self.calls.set(0);
        self.errors.set(0);
    }
}

impl Advice for Counter {
    fn hooks(&self) -> HookSet {
        HookSet::BEFORE | HookSet::AFTER_THROWING
    }

    fn before(&self, _join_point: &JoinPoint, _args: &[Value]) {
        self.calls.set(self.calls.get() + 1);
    }

    fn after_throwing(&self, _join_point: &JoinPoint, _error: &Error) {
        self.errors.set(self.errors.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;

    fn join_point() -> JoinPoint {
        JoinPoint::new(Target::new("t"), "op", Vec::new())
    }

    #[test]
    fn test_counts_through_hooks() {
        let counter = Counter::new();
        let jp = join_point();

        counter.before(&jp, &[]);
        counter.before(&jp, &[]);
        counter.after_throwing(&jp, &Error::raised("x"));

        assert_eq!(counter.calls(), 2);
        assert_eq!(counter.errors(), 1);
    }

    #[test]
    fn test_reset_zeroes_both() {
        let counter = Counter::new();
        let jp = join_point();
        counter.before(&jp, &[]);
        counter.after_throwing(&jp, &Error::raised("x"));

        counter.reset();
        assert_eq!(counter.calls(), 0);
        assert_eq!(counter.errors(), 0);
    }
}
