use thiserror::Error;

/// Raises an ordinary operation error from inside a target operation body.
///
/// Expands to an early `return Err(Error::Raised(..))` with a formatted
/// message. Errors raised this way are *data* to the framework: combinators
/// route them to `afterThrowing`/`after` hooks and propagate them to the
/// caller unchanged.
///
/// ```rust
/// use callweave::{raise, target::Target, value::Value, Result};
///
/// let account = Target::new("account");
/// account.define("withdraw", |_target, args| -> Result<Value> {
///     if args.is_empty() {
///         raise!("withdraw requires an amount");
///     }
///     Ok(args[0].clone())
/// });
/// ```
#[macro_export]
macro_rules! raise {
    ($($arg:tt)*) => {
        return Err($crate::Error::raised(format!($($arg)*)))
    };
}

/// The generic Error type, which provides coverage for all errors this library can
/// potentially return.
///
/// The taxonomy separates *framework failures* from *operation errors*:
///
/// ## Framework failures (weave time)
/// - [`Error::NoSuchOperation`] - weave target lookup failed
/// - [`Error::MalformedAdvice`] - advice declares none of the recognized hooks
///
/// ## Operation errors (call time)
/// - [`Error::Raised`] - an ordinary error raised by a wrapped operation.
///   These are data, not framework failures: the framework's job is to route
///   them to `afterThrowing`/`after` hooks and then always propagate them
///   unchanged to the original caller. The framework never swallows one.
///
/// # Examples
///
/// ```rust
/// use callweave::{prelude::*, Error};
///
/// let target = Target::new("svc");
/// let weaver = Weaver::new();
/// match weaver.weave(&target, "missing", Counter::new()) {
///     Err(Error::NoSuchOperation { operation, .. }) => {
///         assert_eq!(operation, "missing");
///     }
///     other => panic!("expected NoSuchOperation, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The named operation does not exist on the weave target.
    ///
    /// Returned by [`crate::Weaver::weave`] when the target's method registry
    /// has no entry for the requested name and no creation policy was
    /// specified, and by [`crate::target::Target::call`] for plain calls on
    /// undefined names.
    #[error("no operation named `{operation}` on target `{target}`")]
    NoSuchOperation {
        /// Label of the target that was inspected.
        target: String,
        /// The operation name that failed to resolve.
        operation: String,
    },

    /// The advice object declares none of the five recognized hooks.
    ///
    /// Detected at weave time from the advice's declared
    /// [`crate::advice::HookSet`]; an advice that would contribute nothing is
    /// rejected rather than silently installed as a no-op wrapper.
    #[error("malformed advice: {reason}")]
    MalformedAdvice {
        /// Description of what made the advice unusable.
        reason: String,
    },

    /// An ordinary error raised by a wrapped operation.
    ///
    /// Carries the message supplied by the operation body (usually via the
    /// [`raise!`] macro). `afterThrowing` and `after` hooks observe the error
    /// before it reaches the caller; the value itself travels unchanged.
    #[error("{0}")]
    Raised(String),
}

impl Error {
    /// Creates an operation error with the given message.
    ///
    /// Shorthand used by operation bodies; see also the [`raise!`] macro.
    pub fn raised(message: impl Into<String>) -> Self {
        Error::Raised(message.into())
    }
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
