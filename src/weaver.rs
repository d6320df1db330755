//! Weave application: binding advice to named operations.
//!
//! A weave selects a target operation and an advice object and produces a
//! replacement operation that is installed in the original's place in the
//! target's registry. At call time the replacement pushes a join point onto
//! the weaver's context stack, runs the advice hooks around the original
//! behavior and pops the join point on every exit path.
//!
//! Weaving the same name twice compounds the hook layers (the second weave's
//! hooks intercept the first weave's chain), but the frame layer is installed
//! exactly once per operation: re-weaves splice their hook layers into the
//! existing frame, so a single invocation pushes a single join point no
//! matter how many advices are attached. Callers that need idempotent hooks
//! must track which names they have already woven.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    advice::{combinators, Advice, HookKind, HookSet},
    context::{ContextStack, JoinPoint},
    target::{MethodFn, TargetRef},
    value::Value,
    Error, Result,
};
use strum::IntoEnumIterator;

/// Policy for weaving a name with no registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingOperation {
    /// Fail the weave with [`Error::NoSuchOperation`].
    Reject,
    /// Create the operation: the advice chain runs with nothing to delegate
    /// to, per the combinators' degradation rules.
    Create,
}

/// Binds advice to named operations against one context stack.
///
/// [`Weaver::new`] binds the calling thread's default stack, which is what
/// library users normally want; [`Weaver::with_stack`] binds an explicit
/// stack so embedders and tests can keep instrumented call chains isolated.
///
/// # Examples
///
/// ```rust
/// use callweave::prelude::*;
///
/// let service = Target::new("service");
/// service.define("handle", |_t, _a| Ok(Value::Bool(true)));
///
/// let counter = Counter::new();
/// let weaver = Weaver::new();
/// weaver.weave(&service, "handle", counter.clone())?;
///
/// service.call("handle", &[])?;
/// assert_eq!(counter.calls(), 1);
/// # Ok::<(), callweave::Error>(())
/// ```
#[derive(Debug)]
pub struct Weaver {
    stack: ContextStack,
}

impl Default for Weaver {
    fn default() -> Self {
        Weaver {
            stack: ContextStack::current(),
        }
    }
}

impl Weaver {
    /// Creates a weaver bound to the calling thread's default context stack.
    #[must_use]
    pub fn new() -> Self {
        Weaver::default()
    }

    /// Creates a weaver bound to an explicit context stack.
    #[must_use]
    pub fn with_stack(stack: ContextStack) -> Self {
        Weaver { stack }
    }

    /// The context stack this weaver's woven operations report to.
    #[must_use]
    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Weaves `advice` onto `operation`, which must already exist on `target`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchOperation`] if `operation` is not registered on
    /// `target`; [`Error::MalformedAdvice`] if the advice declares no hooks.
    pub fn weave(
        &self,
        target: &TargetRef,
        operation: &str,
        advice: Rc<dyn Advice>,
    ) -> Result<()> {
        self.weave_with(target, operation, advice, MissingOperation::Reject)
    }

    /// Weaves `advice` onto `operation` with an explicit policy for names
    /// that have no registered operation.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedAdvice`] if the advice declares no hooks;
    /// [`Error::NoSuchOperation`] if the operation is missing and `missing`
    /// is [`MissingOperation::Reject`].
    pub fn weave_with(
        &self,
        target: &TargetRef,
        operation: &str,
        advice: Rc<dyn Advice>,
        missing: MissingOperation,
    ) -> Result<()> {
        let hooks = advice.hooks();
        if hooks.is_empty() {
            let recognized = HookKind::iter()
                .map(|kind| kind.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::MalformedAdvice {
                reason: format!(
                    "advice on `{operation}` declares no hooks (recognized: {recognized})"
                ),
            });
        }

        // An already-woven name keeps its frame layer; the new hook layers
        // wrap the current hook chain inside it.
        let slot = target.hook_slot(operation);
        let original = match &slot {
            Some(slot) => Some(Rc::clone(&*slot.borrow())),
            None => target.method(operation),
        };
        if original.is_none() && missing == MissingOperation::Reject {
            return Err(Error::NoSuchOperation {
                target: target.label().to_string(),
                operation: operation.to_string(),
            });
        }

        log::trace!(
            "weaving {hooks:?} onto `{}`.`{operation}` (original present: {})",
            target.label(),
            original.is_some()
        );

        // Hook layers, innermost to outermost. `around` sits closest to the
        // original so `before` observes the call ahead of any delegation
        // decision and the outcome hooks observe the around's result.
        let mut chain = original;
        if hooks.contains(HookSet::AROUND) {
            let advice = Rc::clone(&advice);
            let jp = self.join_point_resolver(operation);
            chain = Some(combinators::around(
                operation,
                move |target, proceed, args| advice.around(&jp(target, args), proceed, args),
                chain,
            ));
        }
        if hooks.contains(HookSet::BEFORE) {
            let advice = Rc::clone(&advice);
            let jp = self.join_point_resolver(operation);
            chain = Some(combinators::before(
                operation,
                move |target, args| advice.before(&jp(target, args), args),
                chain,
            ));
        }
        if hooks.contains(HookSet::AFTER_RETURNING) {
            let advice = Rc::clone(&advice);
            let jp = self.join_point_resolver(operation);
            chain = Some(combinators::after_returning(
                operation,
                move |target, result| {
                    let join_point = jp(target, &[]);
                    advice.after_returning(&join_point, result.unwrap_or(&Value::Null));
                },
                chain,
            ));
        }
        if hooks.contains(HookSet::AFTER_THROWING) {
            let advice = Rc::clone(&advice);
            let jp = self.join_point_resolver(operation);
            chain = Some(combinators::after_throwing(
                operation,
                move |target, error| {
                    // A degraded chain has nothing that can fail; the hook
                    // only ever observes real errors.
                    if let Some(error) = error {
                        advice.after_throwing(&jp(target, &[]), error);
                    }
                },
                chain,
            ));
        }
        if hooks.contains(HookSet::AFTER) {
            let advice = Rc::clone(&advice);
            let jp = self.join_point_resolver(operation);
            chain = Some(combinators::after(
                operation,
                move |target| advice.after(&jp(target, &[])),
                chain,
            ));
        }

        // Non-empty hooks composed at least one layer; the fallback is
        // unreachable.
        let chain: MethodFn =
            chain.unwrap_or_else(|| Rc::new(|_target: &TargetRef, _args: &[Value]| Ok(Value::Null)));

        match slot {
            Some(slot) => {
                *slot.borrow_mut() = chain;
            }
            None => {
                // First weave of this name: install the frame layer around a
                // dispatch slot that later weaves splice into. The frame
                // pushes the join point ahead of every hook and pops it with
                // the `after` combinator's guaranteed-execution semantics, so
                // stack balance holds on both exit paths.
                let slot = Rc::new(RefCell::new(chain));
                let hook_chain = Rc::clone(&slot);
                let dispatch: MethodFn = Rc::new(move |target, args| {
                    let method = Rc::clone(&*hook_chain.borrow());
                    method(target, args)
                });

                let stack = self.stack.clone();
                let framed =
                    combinators::after(operation, move |_target| stack.pop(), Some(dispatch));

                let stack = self.stack.clone();
                let name = operation.to_string();
                let woven = combinators::before(
                    operation,
                    move |target, args| {
                        stack.push(Rc::new(JoinPoint::new(
                            Rc::clone(target),
                            name.clone(),
                            args.to_vec(),
                        )));
                    },
                    Some(framed),
                );

                target.install(operation, woven);
                target.set_hook_slot(operation, slot);
            }
        }
        Ok(())
    }

    /// Returns a closure resolving the join point of the frame currently
    /// executing `operation`.
    ///
    /// Inside a woven call the innermost frame is always this operation's
    /// own (the frame layer is the outermost wrapper), so the stack top is
    /// authoritative; the fallback only covers hook layers invoked outside
    /// any woven frame, e.g. through a hand-assembled combinator chain.
    fn join_point_resolver(
        &self,
        operation: &str,
    ) -> impl Fn(&TargetRef, &[Value]) -> Rc<JoinPoint> + 'static {
        let stack = self.stack.clone();
        let operation = operation.to_string();
        move |target, args| {
            stack.top().unwrap_or_else(|| {
                Rc::new(JoinPoint::new(
                    Rc::clone(target),
                    operation.clone(),
                    args.to_vec(),
                ))
            })
        }
    }
}
