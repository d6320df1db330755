//! The advice protocol: hooks, capability sets and combinators.
//!
//! An advice is a behavior attached to a join point. A concrete advice object
//! implements any subset of the five recognized hooks and declares that
//! subset through [`Advice::hooks`]; undeclared hooks stay no-ops and cost
//! nothing, because the weaver only composes wrapper layers for declared
//! hooks.
//!
//! The hooks and their failure-path semantics (normative, see
//! [`combinators`] for the low-level contract):
//!
//! | Hook | Fires on success | Fires on error |
//! |---|---|---|
//! | `before` | yes, ahead of the call | yes, ahead of the call |
//! | `around` | decides delegation itself | decides delegation itself |
//! | `afterReturning` | yes, with the result | **no** |
//! | `afterThrowing` | **no** | yes, with the error, then the error rethrows |
//! | `after` | yes | yes (guaranteed execution, finally semantics) |
//!
//! Hooks may freely mutate their own consumer state, but never remove join
//! points from the context stack; frame push/pop belongs exclusively to the
//! woven wrapper.
//!
//! # Examples
//!
//! ```rust
//! use callweave::prelude::*;
//!
//! struct Audit;
//!
//! impl Advice for Audit {
//!     fn hooks(&self) -> HookSet {
//!         HookSet::BEFORE | HookSet::AFTER_THROWING
//!     }
//!
//!     fn before(&self, join_point: &JoinPoint, args: &[Value]) {
//!         log::debug!("entering {} with {} args", join_point.operation(), args.len());
//!     }
//!
//!     fn after_throwing(&self, join_point: &JoinPoint, error: &callweave::Error) {
//!         log::warn!("{} failed: {error}", join_point.operation());
//!     }
//! }
//! ```

pub mod combinators;

pub use combinators::Proceed;

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::{context::JoinPoint, value::Value, Error, Result};

/// One of the five recognized hook kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum HookKind {
    /// Runs ahead of the wrapped operation.
    Before,
    /// Wraps the operation and decides whether/when to delegate.
    Around,
    /// Runs only after a successful return.
    AfterReturning,
    /// Runs only after an error, which then rethrows unchanged.
    AfterThrowing,
    /// Runs on every exit path (finally semantics).
    After,
}

impl HookKind {
    /// The [`HookSet`] bit corresponding to this kind.
    #[must_use]
    pub const fn as_set(self) -> HookSet {
        match self {
            HookKind::Before => HookSet::BEFORE,
            HookKind::Around => HookSet::AROUND,
            HookKind::AfterReturning => HookSet::AFTER_RETURNING,
            HookKind::AfterThrowing => HookSet::AFTER_THROWING,
            HookKind::After => HookSet::AFTER,
        }
    }
}

bitflags! {
    /// The capability subset a concrete advice implements.
    ///
    /// Returned by [`Advice::hooks`]; the weaver rejects an empty set with
    /// [`Error::MalformedAdvice`] and composes one wrapper layer per set bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HookSet: u8 {
        /// The advice implements [`Advice::before`].
        const BEFORE = 1;
        /// The advice implements [`Advice::around`].
        const AROUND = 1 << 1;
        /// The advice implements [`Advice::after_returning`].
        const AFTER_RETURNING = 1 << 2;
        /// The advice implements [`Advice::after_throwing`].
        const AFTER_THROWING = 1 << 3;
        /// The advice implements [`Advice::after`].
        const AFTER = 1 << 4;
    }
}

impl From<HookKind> for HookSet {
    fn from(kind: HookKind) -> Self {
        kind.as_set()
    }
}

/// A behavior attached to join points of a woven operation.
///
/// Implementors override the hooks they declare in [`Advice::hooks`]; the
/// remaining methods default to no-ops (and a pass-through for
/// [`Advice::around`]). Every hook receives the [`JoinPoint`] of the
/// invocation it fires for, so advice can reach the invoking instance,
/// operation name and original arguments without touching the context stack.
pub trait Advice {
    /// Declares which hooks this advice implements.
    ///
    /// The weaver composes wrapper layers only for the declared hooks and
    /// rejects an empty set at weave time.
    fn hooks(&self) -> HookSet;

    /// Called ahead of the wrapped operation with the call's arguments.
    fn before(&self, _join_point: &JoinPoint, _args: &[Value]) {}

    /// Wraps the operation; delegate through `proceed` zero or more times.
    ///
    /// The return value of this hook is the return value of the woven call.
    ///
    /// # Errors
    ///
    /// Any error returned here (its own, or one propagated from `proceed`)
    /// travels to the caller through the remaining layers.
    fn around(&self, _join_point: &JoinPoint, proceed: Proceed<'_>, args: &[Value]) -> Result<Value> {
        proceed.call(args)
    }

    /// Called after a successful return with the operation's result.
    ///
    /// Never called when the operation fails; the result value itself is
    /// what the caller receives, unmodified.
    fn after_returning(&self, _join_point: &JoinPoint, _result: &Value) {}

    /// Called after a failure with the raised error, which then propagates
    /// to the caller unchanged. Never called on success.
    fn after_throwing(&self, _join_point: &JoinPoint, _error: &Error) {}

    /// Called on every exit path, success or failure, before the outcome
    /// reaches the caller.
    fn after(&self, _join_point: &JoinPoint) {}
}
