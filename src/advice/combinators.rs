//! The five advice combinators.
//!
//! Each combinator takes `(operation_name, new_behavior, old_behavior)` and
//! returns a replacement operation with the [`MethodFn`] shape, so combinator
//! output can itself be combined again or installed into a target registry.
//! The old behavior is optional: on the first weave of a name that is being
//! created rather than intercepted there is nothing to delegate to, and each
//! combinator degrades to invoking just the new behavior (with no prior
//! result or error to hand it).
//!
//! These are the building blocks the [`crate::Weaver`] composes; they are
//! public because replacement operations are also useful on their own, e.g.
//! to build a one-off wrapper without defining an [`crate::advice::Advice`]
//! type.
//!
//! # Examples
//!
//! ```rust
//! use callweave::{advice::combinators, target::Target, value::Value};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let target = Target::new("svc");
//! target.define("ping", |_t, _a| Ok(Value::Str("pong".into())));
//!
//! let seen = Rc::new(Cell::new(0u32));
//! let probe = Rc::clone(&seen);
//! let wrapped = combinators::before(
//!     "ping",
//!     move |_t, _args| probe.set(probe.get() + 1),
//!     target.method("ping"),
//! );
//! target.install("ping", wrapped);
//!
//! target.call("ping", &[])?;
//! assert_eq!(seen.get(), 1);
//! # Ok::<(), callweave::Error>(())
//! ```

use std::rc::Rc;

use crate::{
    target::{MethodFn, TargetRef},
    value::Value,
    Error, Result,
};

/// Handle to the next behavior in an `around` chain.
///
/// An `around` behavior decides whether and when to delegate by calling
/// [`Proceed::call`], zero or more times, with arguments of its choosing.
/// When the chain has no underlying behavior (first weave on a created
/// name), delegation yields [`Value::Null`].
pub struct Proceed<'a> {
    target: &'a TargetRef,
    inner: Option<&'a MethodFn>,
}

impl<'a> Proceed<'a> {
    pub(crate) fn new(target: &'a TargetRef, inner: Option<&'a MethodFn>) -> Self {
        Proceed { target, inner }
    }

    /// Returns `true` if there is an underlying behavior to delegate to.
    #[must_use]
    pub fn delegates(&self) -> bool {
        self.inner.is_some()
    }

    /// Invokes the underlying behavior with `args`.
    ///
    /// # Errors
    ///
    /// Propagates whatever error the underlying behavior raises.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match self.inner {
            Some(method) => method(self.target, args),
            None => Ok(Value::Null),
        }
    }
}

/// Builds a replacement that invokes `advice` with the call's arguments and
/// then delegates to `original`.
///
/// An error from `original` propagates unmodified; `advice` has already run
/// by then. With no `original`, the replacement just invokes `advice` and
/// returns [`Value::Null`].
pub fn before<F>(operation: &str, advice: F, original: Option<MethodFn>) -> MethodFn
where
    F: Fn(&TargetRef, &[Value]) + 'static,
{
    log::trace!("composing `before` advice on `{operation}`");
    match original {
        Some(original) => Rc::new(move |target, args| {
            advice(target, args);
            original(target, args)
        }),
        None => Rc::new(move |target, args| {
            advice(target, args);
            Ok(Value::Null)
        }),
    }
}

/// Builds a replacement that hands control to `advice`, which delegates to
/// `original` through the supplied [`Proceed`] as it sees fit.
///
/// The replacement's result is whatever `advice` returns; errors propagate
/// from whichever behavior raised them.
pub fn around<F>(operation: &str, advice: F, original: Option<MethodFn>) -> MethodFn
where
    F: Fn(&TargetRef, Proceed<'_>, &[Value]) -> Result<Value> + 'static,
{
    log::trace!("composing `around` advice on `{operation}`");
    Rc::new(move |target, args| advice(target, Proceed::new(target, original.as_ref()), args))
}

/// Builds a replacement that delegates to `original` and invokes `advice`
/// with the result only on success.
///
/// The caller receives `original`'s result unmodified. On error the advice
/// is **not** invoked and the error propagates. With no `original`, the
/// advice is invoked with `None` (there is no prior value) and the
/// replacement returns [`Value::Null`].
pub fn after_returning<F>(operation: &str, advice: F, original: Option<MethodFn>) -> MethodFn
where
    F: Fn(&TargetRef, Option<&Value>) + 'static,
{
    log::trace!("composing `afterReturning` advice on `{operation}`");
    match original {
        Some(original) => Rc::new(move |target, args| {
            let result = original(target, args)?;
            advice(target, Some(&result));
            Ok(result)
        }),
        None => Rc::new(move |target, _args| {
            advice(target, None);
            Ok(Value::Null)
        }),
    }
}

/// Builds a replacement that delegates to `original` and invokes `advice`
/// with the error only on failure, then rethrows the same error.
///
/// Success passes through untouched. With no `original`, nothing can fail
/// and the advice is invoked with `None`.
pub fn after_throwing<F>(operation: &str, advice: F, original: Option<MethodFn>) -> MethodFn
where
    F: Fn(&TargetRef, Option<&Error>) + 'static,
{
    log::trace!("composing `afterThrowing` advice on `{operation}`");
    match original {
        Some(original) => Rc::new(move |target, args| match original(target, args) {
            Ok(value) => Ok(value),
            Err(error) => {
                advice(target, Some(&error));
                Err(error)
            }
        }),
        None => Rc::new(move |target, _args| {
            advice(target, None);
            Ok(Value::Null)
        }),
    }
}

/// Builds a replacement that delegates to `original` and invokes `advice`
/// on **every** exit path before returning or rethrowing.
///
/// This is the guaranteed-execution combinator (finally semantics): the
/// advice observes neither result nor error, it merely always runs. With no
/// `original`, the replacement just invokes `advice`.
pub fn after<F>(operation: &str, advice: F, original: Option<MethodFn>) -> MethodFn
where
    F: Fn(&TargetRef) + 'static,
{
    log::trace!("composing `after` advice on `{operation}`");
    match original {
        Some(original) => Rc::new(move |target, args| {
            let outcome = original(target, args);
            advice(target);
            outcome
        }),
        None => Rc::new(move |target, _args| {
            advice(target);
            Ok(Value::Null)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;
    use std::cell::{Cell, RefCell};

    fn ok_method(value: Value) -> MethodFn {
        Rc::new(move |_t, _a| Ok(value.clone()))
    }

    fn failing_method(message: &'static str) -> MethodFn {
        Rc::new(move |_t, _a| Err(Error::raised(message)))
    }

    #[test]
    fn test_before_runs_ahead_of_original() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let target = Target::new("t");

        let trace = Rc::clone(&order);
        let original: MethodFn = Rc::new(move |_t, _a| {
            trace.borrow_mut().push("original");
            Ok(Value::Int(1))
        });

        let trace = Rc::clone(&order);
        let wrapped = before(
            "op",
            move |_t, _args| trace.borrow_mut().push("advice"),
            Some(original),
        );

        assert_eq!(wrapped(&target, &[]).unwrap(), Value::Int(1));
        assert_eq!(*order.borrow(), vec!["advice", "original"]);
    }

    #[test]
    fn test_before_error_propagates_after_advice_ran() {
        let ran = Rc::new(Cell::new(false));
        let target = Target::new("t");

        let probe = Rc::clone(&ran);
        let wrapped = before(
            "op",
            move |_t, _args| probe.set(true),
            Some(failing_method("boom")),
        );

        let err = wrapped(&target, &[]).unwrap_err();
        assert!(matches!(err, Error::Raised(ref m) if m == "boom"));
        assert!(ran.get());
    }

    #[test]
    fn test_before_degrades_without_original() {
        let ran = Rc::new(Cell::new(false));
        let target = Target::new("t");

        let probe = Rc::clone(&ran);
        let wrapped = before("op", move |_t, _args| probe.set(true), None);

        assert_eq!(wrapped(&target, &[]).unwrap(), Value::Null);
        assert!(ran.get());
    }

    #[test]
    fn test_around_controls_delegation() {
        let target = Target::new("t");

        // Delegates with altered arguments and doubles the result.
        let wrapped = around(
            "op",
            |_t, proceed: Proceed<'_>, _args| {
                let inner = proceed.call(&[Value::Int(10)])?;
                Ok(Value::Int(inner.as_int().unwrap_or(0) * 2))
            },
            Some(Rc::new(|_t, args: &[Value]| Ok(args[0].clone()))),
        );
        assert_eq!(wrapped(&target, &[Value::Int(1)]).unwrap(), Value::Int(20));
    }

    #[test]
    fn test_around_may_skip_original() {
        let called = Rc::new(Cell::new(false));
        let target = Target::new("t");

        let probe = Rc::clone(&called);
        let original: MethodFn = Rc::new(move |_t, _a| {
            probe.set(true);
            Ok(Value::Int(1))
        });

        let wrapped = around(
            "op",
            |_t, _proceed, _args| Ok(Value::Str("short-circuit".into())),
            Some(original),
        );

        assert_eq!(
            wrapped(&target, &[]).unwrap(),
            Value::Str("short-circuit".into())
        );
        assert!(!called.get());
    }

    #[test]
    fn test_around_without_original_proceeds_to_null() {
        let target = Target::new("t");
        let wrapped = around("op", |_t, proceed: Proceed<'_>, args| {
            assert!(!proceed.delegates());
            proceed.call(args)
        }, None);
        assert_eq!(wrapped(&target, &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_after_returning_sees_result_and_preserves_it() {
        let seen = Rc::new(RefCell::new(None));
        let target = Target::new("t");

        let probe = Rc::clone(&seen);
        let wrapped = after_returning(
            "op",
            move |_t, result: Option<&Value>| *probe.borrow_mut() = result.cloned(),
            Some(ok_method(Value::Int(42))),
        );

        assert_eq!(wrapped(&target, &[]).unwrap(), Value::Int(42));
        assert_eq!(*seen.borrow(), Some(Value::Int(42)));
    }

    #[test]
    fn test_after_returning_never_fires_on_error() {
        let fired = Rc::new(Cell::new(false));
        let target = Target::new("t");

        let probe = Rc::clone(&fired);
        let wrapped = after_returning(
            "op",
            move |_t, _result| probe.set(true),
            Some(failing_method("nope")),
        );

        assert!(wrapped(&target, &[]).is_err());
        assert!(!fired.get());
    }

    #[test]
    fn test_after_throwing_fires_once_and_rethrows_same_error() {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let target = Target::new("t");

        let probe = Rc::clone(&observed);
        let wrapped = after_throwing(
            "op",
            move |_t, error: Option<&Error>| {
                probe.borrow_mut().push(error.map(ToString::to_string));
            },
            Some(failing_method("kaput")),
        );

        let err = wrapped(&target, &[]).unwrap_err();
        assert!(matches!(err, Error::Raised(ref m) if m == "kaput"));
        assert_eq!(*observed.borrow(), vec![Some("kaput".to_string())]);
    }

    #[test]
    fn test_after_throwing_silent_on_success() {
        let fired = Rc::new(Cell::new(false));
        let target = Target::new("t");

        let probe = Rc::clone(&fired);
        let wrapped = after_throwing(
            "op",
            move |_t, _error| probe.set(true),
            Some(ok_method(Value::Int(5))),
        );

        assert_eq!(wrapped(&target, &[]).unwrap(), Value::Int(5));
        assert!(!fired.get());
    }

    #[test]
    fn test_after_fires_on_both_exit_paths() {
        let count = Rc::new(Cell::new(0u32));
        let target = Target::new("t");

        let probe = Rc::clone(&count);
        let wrapped = after(
            "op",
            move |_t| probe.set(probe.get() + 1),
            Some(ok_method(Value::Null)),
        );
        wrapped(&target, &[]).unwrap();
        assert_eq!(count.get(), 1);

        let probe = Rc::clone(&count);
        let wrapped = after(
            "op",
            move |_t| probe.set(probe.get() + 1),
            Some(failing_method("down")),
        );
        assert!(wrapped(&target, &[]).is_err());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_combinators_compose() {
        // after(afterThrowing(before(original))) keeps each layer's contract.
        let order = Rc::new(RefCell::new(Vec::new()));
        let target = Target::new("t");

        let trace = Rc::clone(&order);
        let chain = before(
            "op",
            move |_t, _a| trace.borrow_mut().push("before"),
            Some(failing_method("err")),
        );
        let trace = Rc::clone(&order);
        let chain = after_throwing(
            "op",
            move |_t, _e| trace.borrow_mut().push("afterThrowing"),
            Some(chain),
        );
        let trace = Rc::clone(&order);
        let chain = after("op", move |_t| trace.borrow_mut().push("after"), Some(chain));

        assert!(chain(&target, &[]).is_err());
        assert_eq!(*order.borrow(), vec!["before", "afterThrowing", "after"]);
    }
}
