//! Computed Implementation
//!
//! A Computed is a derived container with a single field, `value`, holding
//! the latest result of a function.
//!
//! # How Computed Values Work
//!
//! 1. On creation, an internal effect runs the function and writes the
//!    result into the `value` field.
//!
//! 2. Every container the function read becomes a dependency of that
//!    effect, so any upstream write re-runs the function and rewrites the
//!    field, which in turn notifies readers of the computed.
//!
//! 3. Computed values can read other computed values; updates cascade
//!    depth first through the chain.
//!
//! # Write Protection
//!
//! Only the internal effect may write the field. It raises a write-permitted
//! flag around its own write; any other [`Computed::set`] is dropped.
//!
//! Unlike a cache, a computed value is eager: it recomputes on every
//! upstream write, read or not, and always notifies its readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::effect::Effect;
use crate::graph::{ContainerId, FieldKey, FieldSubscriptions};

/// The name of the single field of a computed container.
pub const VALUE_FIELD: &str = "value";

struct ComputedInner<T> {
    value: Mutex<Option<T>>,
    write_permitted: AtomicBool,
    subscriptions: FieldSubscriptions,
    effect: Mutex<Option<Effect>>,
}

impl<T> ComputedInner<T>
where
    T: Clone + Send + 'static,
{
    fn field() -> FieldKey {
        FieldKey::from(VALUE_FIELD)
    }

    /// Write the field if the flag allows it and notify readers.
    fn write(&self, value: T) -> bool {
        if !self.write_permitted.load(Ordering::SeqCst) {
            tracing::trace!(
                container = self.subscriptions.container_id().raw(),
                "ignoring external write to computed value"
            );
            return false;
        }

        *self.value.lock() = Some(value);
        true
    }

    fn commit(&self, value: T) {
        self.write_permitted.store(true, Ordering::SeqCst);
        let written = self.write(value);
        self.write_permitted.store(false, Ordering::SeqCst);

        if written {
            self.subscriptions.notify(&Self::field());
        }
    }
}

impl<T> Drop for ComputedInner<T> {
    fn drop(&mut self) {
        if let Some(effect) = self.effect.get_mut().take() {
            effect.dispose();
        }
    }
}

/// A derived value that recomputes whenever an upstream field changes.
///
/// # Type Parameters
///
/// - `T`: The type of the computed value.
///
/// # Example
///
/// ```rust,ignore
/// let price = Variable::new(&json!({ "net": 100 }))?;
///
/// let p = price.clone();
/// let gross = Computed::new(move || p.get_as::<i64>("net").unwrap().unwrap_or(0) * 2);
///
/// price.set("net", 50);
/// assert_eq!(gross.get(), 100);
/// ```
pub struct Computed<T>
where
    T: Clone + Send + 'static,
{
    inner: Arc<ComputedInner<T>>,
}

impl<T> Computed<T>
where
    T: Clone + Send + 'static,
{
    /// Create a computed value. `compute` runs immediately.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let inner = Arc::new(ComputedInner {
            value: Mutex::new(None),
            write_permitted: AtomicBool::new(false),
            subscriptions: FieldSubscriptions::new(),
            effect: Mutex::new(None),
        });

        // The effect only holds a weak reference, so dropping the last
        // handle disposes it.
        let weak = Arc::downgrade(&inner);
        let effect = Effect::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let next = compute();
            inner.commit(next);
        });

        tracing::debug!(
            container = inner.subscriptions.container_id().raw(),
            effect = effect.id().raw(),
            "created computed value"
        );
        *inner.effect.lock() = Some(effect);

        Self { inner }
    }

    /// Get the container's unique ID.
    pub fn id(&self) -> ContainerId {
        self.inner.subscriptions.container_id()
    }

    /// Get the current value.
    ///
    /// If called within an effect, this also subscribes the effect to the
    /// computed value.
    pub fn get(&self) -> T {
        self.inner.subscriptions.track(&ComputedInner::<T>::field());
        self.get_untracked()
    }

    /// Get the current value without subscribing to it.
    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .lock()
            .clone()
            .expect("computed value is written when it is created")
    }

    /// External writes are ignored; only recomputation changes the value.
    pub fn set(&self, value: T) {
        self.inner.write(value);
    }

    /// Stop recomputing. The last value stays readable.
    pub fn dispose(&self) {
        if let Some(effect) = self.inner.effect.lock().as_ref() {
            effect.dispose();
        }
    }

    /// Get the number of computations reading this value.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscriptions
            .subscriber_count(&ComputedInner::<T>::field())
    }

    /// Get the number of times the value has been computed.
    pub fn compute_count(&self) -> usize {
        self.inner
            .effect
            .lock()
            .as_ref()
            .map(Effect::run_count)
            .unwrap_or(0)
    }
}

impl<T> Clone for Computed<T>
where
    T: Clone + Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Computed<T>
where
    T: Clone + Send + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("id", &self.id())
            .field("value", &*self.inner.value.lock())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
