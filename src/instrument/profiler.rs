//! Per-span profiling of woven operations.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::{
    advice::{Advice, HookSet},
    context::JoinPoint,
    value::Value,
};

/// One completed profiling span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSection {
    /// Operation name of the outermost call the span covered.
    pub operation: String,
    /// Wall-clock duration of the span.
    pub duration: Duration,
}

/// Records a timed section per outermost invocation of the operations it is
/// woven onto.
///
/// Uses the same reentrancy discipline as [`crate::instrument::Timer`]: a
/// span opens on the 0→1 `before` transition and closes on the 1→0 `after`
/// transition, so a recursive tree of calls produces exactly one section.
/// Sections are kept in invocation order and readable through
/// [`Profiler::sections`]; each completion also emits a `debug!` line under
/// the `callweave::profiler` target, tagged with the optional title.
#[derive(Debug)]
pub struct Profiler {
    title: Option<String>,
    in_call: Cell<u32>,
    started: Cell<Option<Instant>>,
    sections: RefCell<Vec<ProfileSection>>,
}

impl Profiler {
    /// Creates an untitled profiler.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Profiler::build(None)
    }

    /// Creates a profiler whose log output is tagged with `title`.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Rc<Self> {
        Profiler::build(Some(title.into()))
    }

    fn build(title: Option<String>) -> Rc<Self> {
        Rc::new(Profiler {
            title,
            in_call: Cell::new(0),
            started: Cell::new(None),
            sections: RefCell::new(Vec::new()),
        })
    }

    /// The optional profile title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The completed sections, in invocation order.
    #[must_use]
    pub fn sections(&self) -> Vec<ProfileSection> {
        self.sections.borrow().clone()
    }
}

impl Advice for Profiler {
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

    fn after(&self, join_point: &JoinPoint) {
        let depth = self.in_call.get().saturating_sub(1);
        self.in_call.set(depth);
        if depth == 0 {
            if let Some(started) = self.started.take() {
                let section = ProfileSection {
                    operation: join_point.operation().to_string(),
                    duration: started.elapsed(),
                };
                log::debug!(
                    target: "callweave::profiler",
                    "{}`{}` took {:?}",
                    self.title
                        .as_deref()
                        .map(|t| format!("[{t}] "))
                        .unwrap_or_default(),
                    section.operation,
                    section.duration
                );
                self.sections.borrow_mut().push(section);
            }
        }
    }
}
