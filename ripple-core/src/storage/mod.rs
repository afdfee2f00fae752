//! Key/Value Storage
//!
//! Persisted variables keep their state in a [`Store`]: a string-keyed,
//! string-valued area that may be shared by several execution contexts.
//!
//! # Change Events
//!
//! When one context writes a key, the store delivers a [`StorageEvent`] to
//! the listeners registered by *other* contexts on the same area. The
//! writing context is not notified of its own writes. Events are best
//! effort: concurrent writers race, and the last write wins.
//!
//! [`MemoryStore`] is an in-process implementation where each
//! [`MemoryStore::connect`] call opens a new context on the same area.

mod codec;
mod memory;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use codec::{Codec, JsonCodec, SchemaCodec};
pub use memory::MemoryStore;

/// Identifies one storage area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

impl StoreId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for an installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for WatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// A key changed in another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The area the change happened in.
    pub store: StoreId,
    pub key: String,
    /// The new raw value, or `None` if the key was removed.
    pub new_value: Option<String>,
}

/// Callback receiving change events.
pub type StorageListener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// A string key/value store with change notification.
pub trait Store: Send + Sync {
    /// The area this handle reads and writes.
    fn store_id(&self) -> StoreId;

    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    /// Install a listener for changes made by other contexts.
    fn watch(&self, listener: StorageListener) -> WatchId;

    fn unwatch(&self, id: WatchId);
}
