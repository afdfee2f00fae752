//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a container field is
//! read, the current computation is subscribed to it.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing computation.
//! When a computation runs, it is pushed onto the stack; when its body
//! returns or unwinds, the guard pops it.
//!
//! This design supports nested reactive contexts (e.g., an effect created
//! inside another effect, or a computed value recomputing while an effect
//! writes to its upstream).
//!
//! [`untracked`] swaps the stack for an empty one for the duration of a
//! closure, so reads inside it are not attributed to anyone.

use std::cell::RefCell;
use std::sync::Arc;

use super::computation::{Computation, ComputationId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Arc<Computation>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the context when dropped.
///
/// This ensures the context stack is properly maintained even if
/// the computation panics.
pub(crate) struct ReactiveContext {
    computation_id: ComputationId,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given computation.
    ///
    /// The context is automatically exited when the returned guard is dropped.
    pub(crate) fn enter(computation: Arc<Computation>) -> Self {
        let computation_id = computation.id();
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(computation));
        Self { computation_id }
    }

    /// Check if there is an active reactive context.
    pub(crate) fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The computation on top of the stack, if any.
    pub(crate) fn current() -> Option<Arc<Computation>> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    pub(crate) fn current_id() -> Option<ComputationId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|entry| entry.id()))
    }

    pub(crate) fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.id(),
                    self.computation_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.computation_id,
                    entry.id()
                );
            }
        });
    }
}

/// Restores the stack saved by [`untracked`], also while unwinding.
struct SavedStack(Option<Vec<Arc<Computation>>>);

impl Drop for SavedStack {
    fn drop(&mut self) {
        if let Some(saved) = self.0.take() {
            CONTEXT_STACK.with(|stack| *stack.borrow_mut() = saved);
        }
    }
}

/// Run `f` with dependency tracking switched off.
///
/// Reads inside `f` subscribe nothing, even when called from inside an
/// effect. Writes still notify their subscribers as usual.
pub fn untracked<T>(f: impl FnOnce() -> T) -> T {
    let saved = CONTEXT_STACK.with(|stack| std::mem::take(&mut *stack.borrow_mut()));
    let _restore = SavedStack(Some(saved));
    f()
}
