//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever the fields
//! it read on its latest run change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency is written, the effect re-runs synchronously,
//!    before the write returns.
//!
//! 3. Before re-running, the effect invokes the cleanup returned by its
//!    previous run, then drops all of its old subscriptions. The new
//!    dependencies are exactly the fields read during the new run.
//!
//! # Cleanup
//!
//! Effects created with [`Effect::with_cleanup`] may return a cleanup
//! function. It is called once, right before the next run or when the
//! effect is disposed.
//!
//! # Lifetime
//!
//! Dropping an `Effect` handle does not stop the effect; its subscriptions
//! keep it alive. Call [`Effect::dispose`] to stop it.
//!
//! An effect whose body captures a container it reads forms a reference
//! cycle: container, subscription set, computation, body, container. Until
//! the effect is disposed neither side is freed, even after every handle is
//! dropped. Disposing breaks the cycle by leaving every set.

use std::sync::Arc;

use super::computation::{Cleanup, Computation, ComputationId};

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let counter = Variable::new(&json!({ "count": 0 }))?;
///
/// let c = counter.clone();
/// let effect = Effect::new(move || {
///     println!("Count is: {:?}", c.get("count"));
/// });
///
/// counter.set("count", 5);  // Prints: "Count is: Some(Number(5))"
/// effect.dispose();
/// ```
#[derive(Clone)]
pub struct Effect {
    computation: Arc<Computation>,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_cleanup(move || {
            run();
            None
        })
    }

    /// Create a new effect whose runs may return a cleanup.
    ///
    /// A panic inside `run` propagates to the caller that triggered the run
    /// (this constructor, or the write that re-ran the effect).
    pub fn with_cleanup<F>(run: F) -> Self
    where
        F: Fn() -> Option<Cleanup> + Send + Sync + 'static,
    {
        let computation = Computation::new(Box::new(run));
        tracing::debug!(effect = computation.id().raw(), "creating effect");

        computation.run();

        Self { computation }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> ComputationId {
        self.computation.id()
    }

    /// Stop the effect.
    ///
    /// Runs the pending cleanup, if any, and unsubscribes from every field.
    /// After disposal, the effect will not run again.
    pub fn dispose(&self) {
        if !self.computation.is_disposed() {
            tracing::debug!(effect = self.id().raw(), "disposing effect");
        }
        self.computation.dispose();
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.computation.is_disposed()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.computation.run_count()
    }

    /// Get the number of fields the effect currently depends on.
    pub fn dependency_count(&self) -> usize {
        self.computation.dependency_count()
    }

    pub(crate) fn computation(&self) -> &Arc<Computation> {
        &self.computation
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::context::ReactiveContext;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn effect_runs_on_creation() {
        let run_count = Arc::new(AtomicI32::new(0));
        let run_count_clone = run_count.clone();

        let _effect = Effect::new(move || {
            run_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Effect should have run once on creation
        assert_eq!(run_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn effect_is_current_while_running() {
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let seen_clone = seen.clone();

        let effect = Effect::new(move || {
            *seen_clone.lock() = ReactiveContext::current_id();
        });

        assert_eq!(*seen.lock(), Some(effect.id()));
        assert!(!ReactiveContext::is_active());
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let run_count = Arc::new(AtomicI32::new(0));
        let run_count_clone = run_count.clone();

        let effect = Effect::new(move || {
            run_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Ran once on creation
        assert_eq!(run_count.load(Ordering::SeqCst), 1);

        // Dispose
        effect.dispose();
        assert!(effect.is_disposed());

        // Notification path should not run it
        effect.computation().run();
        assert_eq!(run_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispose_runs_final_cleanup_once() {
        let cleanups = Arc::new(AtomicI32::new(0));
        let cleanups_clone = cleanups.clone();

        let effect = Effect::with_cleanup(move || {
            let cleanups = cleanups_clone.clone();
            Some(Box::new(move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            }) as Cleanup)
        });

        effect.dispose();
        effect.dispose();
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panic_in_effect_propagates_and_pops_context() {
        let result = std::panic::catch_unwind(|| {
            Effect::new(|| panic!("effect failed"));
        });

        assert!(result.is_err());
        assert!(!ReactiveContext::is_active());
    }

    #[test]
    fn nested_effect_restores_outer_context() {
        let observed = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let observed_clone = observed.clone();

        let outer = Effect::new(move || {
            let before = ReactiveContext::current_id();
            let _inner = Effect::new(|| {});
            let after = ReactiveContext::current_id();
            observed_clone.lock().push(before == after);
        });

        assert_eq!(*observed.lock(), vec![true]);
        assert_eq!(outer.run_count(), 1);
    }

    #[test]
    fn effect_clone_shares_state() {
        let effect1 = Effect::new(|| {});
        let effect2 = effect1.clone();

        // Same ID
        assert_eq!(effect1.id(), effect2.id());

        // Shared run count
        assert_eq!(effect1.run_count(), 1);
        assert_eq!(effect2.run_count(), 1);

        effect1.computation().run();
        assert_eq!(effect2.run_count(), 2);

        // Shared disposal state
        effect1.dispose();
        assert!(effect2.is_disposed());
    }
}
