//! Computations: the live state behind an effect.
//!
//! A computation owns the effect body, the cleanup returned by its latest
//! run, and back-references to every subscription set it is a member of.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::context::ReactiveContext;
use super::runtime::Runtime;
use crate::error::ReactiveError;
use crate::graph::{unsubscribe_all, SubscriptionSet};

/// A cleanup returned by an effect run.
///
/// It is invoked exactly once: right before the next run, or when the effect
/// is disposed.
pub type Cleanup = Box<dyn FnOnce() + Send>;

type EffectFn = dyn Fn() -> Option<Cleanup> + Send + Sync;

/// Unique identifier for a computation.
///
/// Used as the membership key inside subscription sets and to verify that
/// the context stack is unwound in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputationId(u64);

impl ComputationId {
    /// Generate a new unique computation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ComputationId {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Computation {
    id: ComputationId,
    run: Box<EffectFn>,
    cleanup: Mutex<Option<Cleanup>>,
    /// Sets this computation is subscribed to. Weak so that a dropped
    /// container releases its sets.
    dependencies: Mutex<SmallVec<[Weak<SubscriptionSet>; 4]>>,
    disposed: AtomicBool,
    run_count: AtomicUsize,
    /// How many runs of this computation are currently on the stack.
    nesting: AtomicUsize,
}

/// One level of re-entry into a computation's own run.
struct Nesting<'a>(&'a AtomicUsize);

impl Drop for Nesting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Computation {
    pub(crate) fn new(run: Box<EffectFn>) -> Arc<Self> {
        Arc::new(Self {
            id: ComputationId::new(),
            run,
            cleanup: Mutex::new(None),
            dependencies: Mutex::new(SmallVec::new()),
            disposed: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
            nesting: AtomicUsize::new(0),
        })
    }

    pub(crate) fn id(&self) -> ComputationId {
        self.id
    }

    /// Run the effect body once and return the cleanup it produced.
    ///
    /// The previous cleanup is consumed first, then every old subscription
    /// is dropped, so the dependencies afterwards are exactly the fields
    /// read during this run. The context entry is popped even if the body
    /// panics.
    ///
    /// # Panics
    ///
    /// Panics with [`ReactiveError::UpdateDepthExceeded`] when the
    /// computation is already running inside itself `max_update_depth`
    /// times.
    pub(crate) fn execute(self: &Arc<Self>) -> Option<Cleanup> {
        if self.is_disposed() {
            unsubscribe_all(self);
            return None;
        }

        let _nesting = self.enter_nesting();

        let pending = self.cleanup.lock().take();
        if let Some(cleanup) = pending {
            cleanup();
        }

        unsubscribe_all(self);

        let cleanup = {
            let _ctx = ReactiveContext::enter(Arc::clone(self));
            (self.run)()
        };

        self.run_count.fetch_add(1, Ordering::SeqCst);
        cleanup
    }

    /// Count one more run of this computation on the stack. Only a write
    /// that re-triggers the computation from inside its own run nests it.
    fn enter_nesting(&self) -> Nesting<'_> {
        let limit = Runtime::config().max_update_depth;
        let depth = self.nesting.fetch_add(1, Ordering::SeqCst);
        let guard = Nesting(&self.nesting);
        if depth >= limit {
            let err = ReactiveError::UpdateDepthExceeded { limit };
            tracing::error!(computation = self.id.raw(), limit, "{err}");
            panic!("{err}");
        }
        guard
    }

    /// Execute and keep the returned cleanup for the next run.
    pub(crate) fn run(self: &Arc<Self>) {
        let Some(cleanup) = self.execute() else {
            return;
        };

        // Disposed from inside its own body: nothing will run this later.
        if self.is_disposed() {
            cleanup();
            return;
        }

        *self.cleanup.lock() = Some(cleanup);
    }

    /// Stop the computation for good: run the final cleanup and leave every
    /// subscription set.
    pub(crate) fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        unsubscribe_all(self);

        let pending = self.cleanup.lock().take();
        if let Some(cleanup) = pending {
            cleanup();
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub(crate) fn add_dependency(&self, set: &Arc<SubscriptionSet>) {
        self.dependencies.lock().push(Arc::downgrade(set));
    }

    pub(crate) fn take_dependencies(&self) -> SmallVec<[Weak<SubscriptionSet>; 4]> {
        std::mem::take(&mut *self.dependencies.lock())
    }

    pub(crate) fn dependency_count(&self) -> usize {
        self.dependencies.lock().len()
    }

    pub(crate) fn run_count(&self) -> usize {
        self.run_count.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn nesting(&self) -> usize {
        self.nesting.load(Ordering::SeqCst)
    }
}
