//! Wall-clock timing of woven operations.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::{
    advice::{Advice, HookSet},
    context::JoinPoint,
    value::Value,
};

/// Source of the `timer #N` fallback names; process-wide so two unnamed
/// timers never collide.
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(0);

/// Accumulates wall-clock time spent in the operations it is woven onto.
///
/// The timer keeps a reentrancy depth: `before` increments it and only the
/// 0→1 transition starts a span; `after` decrements it and only the 1→0
/// transition ends the span. Recursive and mutually nested invocations of
/// timed operations therefore fold into a single span covering the
/// outermost call. `after`'s guaranteed-execution semantics keep the depth
/// balanced when operations fail.
///
/// Completed spans add to [`Timer::elapsed`] and bump [`Timer::spans`]; each
/// completion also emits a `debug!` log line under the `callweave::timer`
/// target.
///
/// # Examples
///
/// ```rust
/// use callweave::prelude::*;
///
/// let svc = Target::new("svc");
/// svc.define("step", |_t, _a| Ok(Value::Null));
///
/// let timer = Timer::named("step-time");
/// Weaver::new().weave(&svc, "step", timer.clone())?;
///
/// svc.call("step", &[])?;
/// assert_eq!(timer.spans(), 1);
/// # Ok::<(), callweave::Error>(())
/// ```
#[derive(Debug)]
pub struct Timer {
    name: String,
    in_call: Cell<u32>,
    started: Cell<Option<Instant>>,
    elapsed: Cell<Duration>,
    spans: Cell<u64>,
}

impl Timer {
    /// Creates a timer with an auto-generated unique name (`timer #N`).
    #[must_use]
    pub fn new() -> Rc<Self> {
        let id = NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed) + 1;
        Timer::named(format!("timer #{id}"))
    }

    /// Creates a timer with an explicit name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Timer {
            name: name.into(),
            in_call: Cell::new(0),
            started: Cell::new(None),
            elapsed: Cell::new(Duration::ZERO),
            spans: Cell::new(0),
        })
    }

    /// The timer's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total wall-clock time across all completed spans.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    /// Number of completed (outermost) spans.
    #[must_use]
    pub fn spans(&self) -> u64 {
        self.spans.get()
    }

    /// Current reentrancy depth; non-zero while a span is open.
    #[must_use]
    pub fn in_call(&self) -> u32 {
        self.in_call.get()
    }
}

impl Advice for Timer {
    fn hooks(&self) -> HookSet {
        HookSet::BEFORE | HookSet::AFTER
    }

    fn before(&self, _join_point: &JoinPoint, _args: &[Value]) {
        let depth = self.in_call.get();
        if depth == 0 {
            self.started.set(Some(Instant::now()));
        }
        self.in_call.set(depth + 1);
    }

    fn after(&self, _join_point: &JoinPoint) {
        let depth = self.in_call.get().saturating_sub(1);
        self.in_call.set(depth);
        if depth == 0 {
            if let Some(started) = self.started.take() {
                let span = started.elapsed();
                self.elapsed.set(self.elapsed.get() + span);
                self.spans.set(self.spans.get() + 1);
                log::debug!(
                    target: "callweave::timer",
                    "`{}`: span took {span:?} (total {:?} over {} spans)",
                    self.name,
                    self.elapsed.get(),
                    self.spans.get()
                );
            }
        }
    }
}
