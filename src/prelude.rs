//! # callweave Prelude
//!
//! Convenient re-exports of the most commonly used types and functions.
//! Import this module to get quick access to the essentials for weaving and
//! instrumenting operations.
//!
//! ```rust
//! use callweave::prelude::*;
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all callweave operations
pub use crate::Error;

/// The result type used throughout callweave
pub use crate::Result;

// ================================================================================================
// Weaving
// ================================================================================================

/// Binds advice to named operations
pub use crate::Weaver;

/// Policy for weaving names with no registered operation
pub use crate::MissingOperation;

/// The advice protocol: trait, hook kinds and capability sets
pub use crate::advice::{Advice, HookKind, HookSet, Proceed};

// ================================================================================================
// Host Object Model
// ================================================================================================

/// Host objects, their method registries and result caches
pub use crate::target::{MethodFn, Target, TargetRef};

/// Dynamic values flowing through woven operations
pub use crate::value::Value;

// ================================================================================================
// Call Context
// ================================================================================================

/// Join points and the call-context stack
pub use crate::context::{ContextStack, JoinPoint};

/// Control-flow queries over active join points
pub use crate::cflow::{cflow, NamePattern};

// ================================================================================================
// Instrumentation Consumers
// ================================================================================================

/// Call and error counting
pub use crate::instrument::Counter;

/// Wall-clock timing with reentrancy collapse
pub use crate::instrument::Timer;

/// Per-span profiling
pub use crate::instrument::{ProfileSection, Profiler};

/// Result memoization and cache invalidation
pub use crate::instrument::{Memoizer, MemoizerGuard};
