//! Persisted Variable Implementation
//!
//! A PersistedVariable is a [`Variable`] whose record is mirrored into a
//! [`Store`] under one key.
//!
//! # How Persisted Variables Work
//!
//! 1. On creation, the stored value for the key is decoded and used as the
//!    initial record. If the key is absent, the default is encoded and
//!    stored instead. A stored value that cannot be decoded is an error.
//!
//! 2. Every write applies the field in memory, stores the re-encoded
//!    record, then notifies subscribers.
//!
//! 3. When another context changes the key, each top-level field of the new
//!    value is assigned onto the live record and notified like a normal
//!    write. The store already holds that value, so nothing is written back.
//!    A payload that cannot be decoded is logged and dropped.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::record::Record;
use super::variable::Variable;
use crate::error::{ReactiveError, Result};
use crate::graph::{ContainerId, FieldKey};
use crate::storage::{Codec, JsonCodec, StorageEvent, Store, WatchId};

struct PersistedInner {
    key: String,
    variable: Variable,
    store: Arc<dyn Store>,
    codec: Box<dyn Codec>,
    watch: Mutex<Option<WatchId>>,
}

impl PersistedInner {
    fn persist(&self) {
        let record = self.variable.snapshot();
        match self.codec.encode(&record) {
            Ok(raw) => self.store.set(&self.key, raw),
            Err(err) => tracing::warn!(key = %self.key, error = %err, "failed to encode persisted variable"),
        }
    }

    fn apply_external(&self, event: &StorageEvent) {
        if event.store != self.store.store_id() || event.key != self.key {
            return;
        }
        let Some(raw) = event.new_value.as_deref() else {
            return;
        };

        let record = match self.codec.decode(raw) {
            Ok(record) => record,
            Err(err) => {
                let conflict = ReactiveError::ExternalSyncConflict {
                    key: self.key.clone(),
                    reason: err.to_string(),
                };
                tracing::warn!(
                    "{conflict}; the storage was modified but the new value is not parsable, the variable was not updated"
                );
                return;
            }
        };

        tracing::debug!(key = %self.key, fields = record.len(), "applying external update");
        for (field, value) in record {
            self.variable.store_field(&field, value);
            self.variable.notify(&field);
        }
    }
}

impl Drop for PersistedInner {
    fn drop(&mut self) {
        if let Some(id) = self.watch.get_mut().take() {
            self.store.unwatch(id);
        }
    }
}

/// A reactive record stored under a key of a [`Store`].
///
/// Clones share the same record, subscriptions and store listener.
///
/// # Example
///
/// ```rust,ignore
/// let store = MemoryStore::new();
/// let prefs = PersistedVariable::new(store.clone(), "prefs", &json!({ "theme": "light" }))?;
///
/// prefs.set("theme", "dark");
/// assert_eq!(store.get("prefs").as_deref(), Some(r#"{"theme":"dark"}"#));
/// ```
#[derive(Clone)]
pub struct PersistedVariable {
    inner: Arc<PersistedInner>,
}

impl PersistedVariable {
    /// Create a persisted variable using the [`JsonCodec`].
    pub fn new<S, T>(store: S, key: impl Into<String>, default: &T) -> Result<Self>
    where
        S: Store + 'static,
        T: Serialize + ?Sized,
    {
        Self::with_codec(store, key, default, JsonCodec)
    }

    /// Create a persisted variable with a custom codec.
    ///
    /// Fails with [`ReactiveError::InvalidArgument`] if `default` is not
    /// object-like, or if the key already holds a value the codec rejects.
    pub fn with_codec<S, T, C>(store: S, key: impl Into<String>, default: &T, codec: C) -> Result<Self>
    where
        S: Store + 'static,
        T: Serialize + ?Sized,
        C: Codec,
    {
        let key = key.into();
        let default = Record::from_serialize(default)?;

        let initial = match store.get(&key) {
            Some(raw) if !raw.is_empty() => {
                let record = codec.decode(&raw).map_err(|err| {
                    ReactiveError::InvalidArgument(format!(
                        "the key `{key}` is associated with a non object-like value: {err}"
                    ))
                })?;
                tracing::debug!(key = %key, "loaded persisted variable from store");
                record
            }
            _ => {
                store.set(&key, codec.encode(&default)?);
                tracing::debug!(key = %key, "stored default for persisted variable");
                default
            }
        };

        let inner = Arc::new(PersistedInner {
            key,
            variable: Variable::from_record(initial),
            store: Arc::new(store),
            codec: Box::new(codec),
            watch: Mutex::new(None),
        });

        let weak: Weak<PersistedInner> = Arc::downgrade(&inner);
        let id = inner.store.watch(Arc::new(move |event: &StorageEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_external(event);
            }
        }));
        *inner.watch.lock() = Some(id);

        Ok(Self { inner })
    }

    /// The store key backing this variable.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Get the container's unique ID.
    pub fn id(&self) -> ContainerId {
        self.inner.variable.id()
    }

    /// Read a field, subscribing the current effect to it.
    pub fn get(&self, key: impl Into<FieldKey>) -> Option<Value> {
        self.inner.variable.get(key)
    }

    /// Read a field and deserialize it into `V`.
    pub fn get_as<V: DeserializeOwned>(&self, key: impl Into<FieldKey>) -> Result<Option<V>> {
        self.inner.variable.get_as(key)
    }

    pub fn get_untracked(&self, key: impl Into<FieldKey>) -> Option<Value> {
        self.inner.variable.get_untracked(key)
    }

    /// Write a field, store the whole record, then re-run subscribers.
    pub fn set(&self, key: impl Into<FieldKey>, value: impl Into<Value>) {
        let key = key.into();
        self.inner.variable.store_field(&key, value.into());
        self.inner.persist();
        self.inner.variable.notify(&key);
    }

    /// Update a field using a function of its current value.
    pub fn update<F>(&self, key: impl Into<FieldKey>, f: F)
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let key = key.into();
        let current = self.inner.variable.get_untracked(&key);
        self.set(key, f(current.as_ref()));
    }

    /// A copy of the whole record, read without tracking.
    pub fn snapshot(&self) -> Record {
        self.inner.variable.snapshot()
    }

    /// Deliver a change event by hand.
    ///
    /// Stores call this through their listener; hosts with their own event
    /// source can call it directly. Events for other stores or keys are
    /// ignored, and malformed payloads are logged and dropped.
    pub fn apply_external(&self, event: &StorageEvent) {
        self.inner.apply_external(event);
    }

    /// Get the number of computations subscribed to a field.
    pub fn subscriber_count(&self, key: impl Into<FieldKey>) -> usize {
        self.inner.variable.subscriber_count(key)
    }
}

impl std::fmt::Debug for PersistedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedVariable")
            .field("key", &self.inner.key)
            .field("record", &self.snapshot())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
