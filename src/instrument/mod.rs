//! Instrumentation consumers built on the advice protocol.
//!
//! Everything in this module is expressed purely as [`crate::advice::Advice`]
//! implementations: none of the consumers touch the context stack beyond
//! what their join points hand them, and none alter what the caller of the
//! instrumented operation observes (results and errors pass through
//! unchanged).
//!
//! - [`Counter`] - counts calls and errors
//! - [`Timer`] - accumulates wall-clock time per outermost span
//! - [`Profiler`] - records one timed section per outermost span
//! - [`Memoizer`] / [`MemoizerGuard`] - result caching and cache invalidation

pub mod counter;
pub mod memoizer;
pub mod profiler;
pub mod timer;

pub use counter::Counter;
pub use memoizer::{Memoizer, MemoizerGuard};
pub use profiler::{ProfileSection, Profiler};
pub use timer::Timer;
