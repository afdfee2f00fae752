//! Variable Implementation
//!
//! A Variable is the fundamental reactive container. It wraps a plain
//! record and tracks, per field, which computations depend on it.
//!
//! # How Variables Work
//!
//! 1. When a field is read with [`Variable::get`] inside an effect, the
//!    effect is subscribed to that field.
//!
//! 2. When a field is written with [`Variable::set`], every subscriber of
//!    that field re-runs before `set` returns.
//!
//! 3. Writes always notify, even when the new value equals the old one.
//!
//! Reads and writes go through these accessors; there is no way to reach
//! the record behind a variable without them.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::computed::VALUE_FIELD;
use super::record::Record;
use crate::error::Result;
use crate::graph::{ContainerId, FieldKey, FieldSubscriptions};

struct VariableInner {
    record: Mutex<Record>,
    subscriptions: FieldSubscriptions,
}

/// A reactive record.
///
/// Clones share the same record and subscriptions.
///
/// # Example
///
/// ```rust,ignore
/// let user = Variable::new(&json!({ "name": "Ada", "age": 36 }))?;
///
/// assert_eq!(user.get("name"), Some(json!("Ada")));
/// user.set("age", 37);  // re-runs every effect that read "age"
/// ```
#[derive(Clone)]
pub struct Variable {
    inner: Arc<VariableInner>,
}

impl Variable {
    /// Create a variable from any value that serializes to an object.
    ///
    /// Fails with [`ReactiveError::InvalidArgument`] for primitives, arrays
    /// and null.
    ///
    /// [`ReactiveError::InvalidArgument`]: crate::error::ReactiveError::InvalidArgument
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::from_record(Record::from_serialize(value)?))
    }

    pub fn from_record(record: Record) -> Self {
        Self {
            inner: Arc::new(VariableInner {
                record: Mutex::new(record),
                subscriptions: FieldSubscriptions::new(),
            }),
        }
    }

    /// Get the container's unique ID.
    pub fn id(&self) -> ContainerId {
        self.inner.subscriptions.container_id()
    }

    /// Read a field.
    ///
    /// If called within an effect, this also subscribes the effect to the
    /// field, whether or not the field exists yet.
    pub fn get(&self, key: impl Into<FieldKey>) -> Option<Value> {
        let key = key.into();
        self.inner.subscriptions.track(&key);
        self.inner.record.lock().get(&key).cloned()
    }

    /// Read a field and deserialize it into `V`.
    pub fn get_as<V: DeserializeOwned>(&self, key: impl Into<FieldKey>) -> Result<Option<V>> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Read a field without subscribing to it.
    pub fn get_untracked(&self, key: impl Into<FieldKey>) -> Option<Value> {
        self.inner.record.lock().get(&key.into()).cloned()
    }

    /// Write a field and re-run its subscribers.
    pub fn set(&self, key: impl Into<FieldKey>, value: impl Into<Value>) {
        let key = key.into();
        self.store_field(&key, value.into());
        self.notify(&key);
    }

    /// Update a field using a function of its current value.
    ///
    /// The current value is read without tracking.
    pub fn update<F>(&self, key: impl Into<FieldKey>, f: F)
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let key = key.into();
        let current = self.get_untracked(&key);
        self.set(key, f(current.as_ref()));
    }

    /// A copy of the whole record, read without tracking.
    pub fn snapshot(&self) -> Record {
        self.inner.record.lock().clone()
    }

    /// Get the number of computations subscribed to a field.
    pub fn subscriber_count(&self, key: impl Into<FieldKey>) -> usize {
        self.inner.subscriptions.subscriber_count(&key.into())
    }

    /// Write a field without notifying anyone.
    pub(crate) fn store_field(&self, key: &FieldKey, value: Value) {
        self.inner.record.lock().insert(key.clone(), value);
    }

    pub(crate) fn notify(&self, key: &FieldKey) {
        self.inner.subscriptions.notify(key);
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variable")
            .field("id", &self.id())
            .field("record", &self.snapshot())
            .finish()
    }
}

/// Wrap a single value in a variable, under the field `value`.
///
/// Use this for primitives, which [`Variable::new`] rejects.
pub fn create_ref(value: impl Into<Value>) -> Variable {
    let mut record = Record::new();
    record.insert(VALUE_FIELD, value.into());
    Variable::from_record(record)
}

impl Default for Variable {
    fn default() -> Self {
        Self::from_record(Record::new())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
