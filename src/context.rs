//! Join points and the call-context stack.
//!
//! Every woven operation, when invoked, builds a [`JoinPoint`] describing the
//! invocation (instance, operation name, arguments), pushes a [`Context`]
//! onto a [`ContextStack`], executes the wrapped chain and pops exactly one
//! context on every exit path. The pop is installed with the `after`
//! combinator's guaranteed-execution semantics, so the stack stays balanced
//! under errors and under nested reentrant calls alike.
//!
//! # Ownership
//!
//! The stack is an explicitly-owned, cloneable handle rather than an implicit
//! global: [`ContextStack::current`] resolves the calling thread's default
//! stack, and [`ContextStack::new`] creates an isolated one (used by tests
//! and by embedders that want scoped instrumentation). One stack belongs to
//! one thread of control; all pushes and pops happen in strict LIFO order
//! tied to call entry and exit, so no locking is involved. Cross-thread
//! context propagation is explicitly out of scope.
//!
//! # Invariants
//!
//! At any point observable through `cflow`, `stack[i].position() == i` for
//! every frame, and the stack depth equals the current reentrant-call depth
//! of instrumented operations.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{target::TargetRef, value::Value};

/// An immutable descriptor of one invocation of a woven operation.
///
/// Created fresh per invocation and shared (via `Rc`) between the context
/// stack and the advice hooks running inside the call; it is released when
/// the call's frame is popped.
#[derive(Debug)]
pub struct JoinPoint {
    instance: TargetRef,
    operation: String,
    args: Vec<Value>,
}

impl JoinPoint {
    /// Creates a join point for an invocation of `operation` on `instance`.
    #[must_use]
    pub fn new(instance: TargetRef, operation: impl Into<String>, args: Vec<Value>) -> Self {
        JoinPoint {
            instance,
            operation: operation.into(),
            args,
        }
    }

    /// The instance the operation was invoked on.
    #[must_use]
    pub fn instance(&self) -> &TargetRef {
        &self.instance
    }

    /// The operation name as registered on the target.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The arguments of this invocation.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// One active frame on a [`ContextStack`].
#[derive(Debug)]
pub struct Context {
    join_point: Rc<JoinPoint>,
    position: usize,
}

impl Context {
    /// The join point this frame describes.
    #[must_use]
    pub fn join_point(&self) -> &Rc<JoinPoint> {
        &self.join_point
    }

    /// The frame's index within the stack at push time.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

thread_local! {
    static CURRENT: ContextStack = ContextStack::new();
}

/// The ordered stack of active join points for one thread of control.
///
/// Cloning the handle shares the underlying stack; [`ContextStack::new`]
/// creates an independent one. Only the weaver pushes and pops frames;
/// consumers observe the stack through [`ContextStack::cflow`] and
/// [`ContextStack::top`].
///
/// # Examples
///
/// ```rust
/// use callweave::context::ContextStack;
///
/// let stack = ContextStack::new();
/// assert!(stack.is_empty());
///
/// // Woven calls grow and shrink the thread's current stack:
/// let current = ContextStack::current();
/// assert_eq!(current.depth(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Rc<RefCell<Vec<Context>>>,
}

impl ContextStack {
    /// Creates an empty, independent context stack.
    #[must_use]
    pub fn new() -> Self {
        ContextStack::default()
    }

    /// Returns a handle to the calling thread's default stack.
    ///
    /// Every thread owns exactly one default stack for its whole lifetime;
    /// repeated calls on the same thread return handles to the same stack.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    /// The number of active frames (the reentrant-call depth).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Returns `true` if no woven call is currently active on this stack.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// The join point of the innermost active frame, if any.
    #[must_use]
    pub fn top(&self) -> Option<Rc<JoinPoint>> {
        self.frames.borrow().last().map(|c| Rc::clone(&c.join_point))
    }

    /// Pushes a frame for `join_point`, returning its position.
    pub(crate) fn push(&self, join_point: Rc<JoinPoint>) -> usize {
        let mut frames = self.frames.borrow_mut();
        let position = frames.len();
        frames.push(Context {
            join_point,
            position,
        });
        position
    }

    /// Pops the innermost frame.
    pub(crate) fn pop(&self) {
        let mut frames = self.frames.borrow_mut();
        let popped = frames.pop();
        debug_assert!(
            popped.map_or(true, |c| c.position == frames.len()),
            "context stack position out of step with depth"
        );
    }

    /// Runs `probe` over the frames from the innermost outward, stopping at
    /// the first frame for which it returns `true`.
    pub(crate) fn scan(&self, mut probe: impl FnMut(&Context) -> bool) -> bool {
        self.frames.borrow().iter().rev().any(|c| probe(c))
    }
}
