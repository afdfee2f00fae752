//! In-memory store shared between contexts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::{StorageEvent, StorageListener, Store, StoreId, WatchId};

struct Watcher {
    id: WatchId,
    context: u64,
    listener: StorageListener,
}

struct StorageArea {
    id: StoreId,
    entries: DashMap<String, String>,
    watchers: Mutex<Vec<Watcher>>,
    next_context: AtomicU64,
}

/// An in-memory [`Store`].
///
/// Clones are the same context. Use [`MemoryStore::connect`] to open another
/// context on the same area; writes made through one context are delivered
/// as [`StorageEvent`]s to listeners of every other context, synchronously,
/// before `set` returns.
#[derive(Clone)]
pub struct MemoryStore {
    area: Arc<StorageArea>,
    context: u64,
}

impl MemoryStore {
    /// Create a new, empty storage area.
    pub fn new() -> Self {
        Self {
            area: Arc::new(StorageArea {
                id: StoreId::new(),
                entries: DashMap::new(),
                watchers: Mutex::new(Vec::new()),
                next_context: AtomicU64::new(1),
            }),
            context: 0,
        }
    }

    /// Open another context on the same area.
    pub fn connect(&self) -> Self {
        Self {
            area: Arc::clone(&self.area),
            context: self.area.next_context.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Remove a key. Other contexts receive an event with no new value.
    pub fn remove(&self, key: &str) {
        if self.area.entries.remove(key).is_some() {
            self.dispatch(key, None);
        }
    }

    pub fn len(&self) -> usize {
        self.area.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.area.entries.is_empty()
    }

    fn dispatch(&self, key: &str, new_value: Option<String>) {
        let listeners: Vec<StorageListener> = self
            .area
            .watchers
            .lock()
            .iter()
            .filter(|watcher| watcher.context != self.context)
            .map(|watcher| Arc::clone(&watcher.listener))
            .collect();

        if listeners.is_empty() {
            return;
        }

        let event = StorageEvent {
            store: self.area.id,
            key: key.to_owned(),
            new_value,
        };
        for listener in listeners {
            listener(&event);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn store_id(&self) -> StoreId {
        self.area.id
    }

    fn get(&self, key: &str) -> Option<String> {
        self.area.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Writing the value a key already holds is not a change and sends no
    /// event.
    fn set(&self, key: &str, value: String) {
        let previous = self.area.entries.insert(key.to_owned(), value.clone());
        if previous.as_deref() == Some(value.as_str()) {
            return;
        }
        self.dispatch(key, Some(value));
    }

    fn watch(&self, listener: StorageListener) -> WatchId {
        let id = WatchId::new();
        self.area.watchers.lock().push(Watcher {
            id,
            context: self.context,
            listener,
        });
        id
    }

    fn unwatch(&self, id: WatchId) {
        self.area.watchers.lock().retain(|watcher| watcher.id != id);
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("store", &self.area.id)
            .field("context", &self.context)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(store: &MemoryStore) -> (WatchId, Arc<Mutex<Vec<StorageEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let id = store.watch(Arc::new(move |event: &StorageEvent| {
            events_clone.lock().push(event.clone());
        }));
        (id, events)
    }

    #[test]
    fn get_and_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v".into());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn other_contexts_receive_events() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let (_, events_a) = recorder(&tab_a);
        let (_, events_b) = recorder(&tab_b);

        tab_a.set("k", "1".into());

        // The writer does not hear its own write
        assert!(events_a.lock().is_empty());
        assert_eq!(
            *events_b.lock(),
            vec![StorageEvent {
                store: tab_a.store_id(),
                key: "k".into(),
                new_value: Some("1".into()),
            }]
        );

        // Both contexts see the same data
        assert_eq!(tab_b.get("k").as_deref(), Some("1"));
    }

    #[test]
    fn unchanged_value_sends_no_event() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let (_, events_b) = recorder(&tab_b);

        tab_a.set("k", "1".into());
        tab_a.set("k", "1".into());
        assert_eq!(events_b.lock().len(), 1);
    }

    #[test]
    fn remove_sends_empty_event() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let (_, events_b) = recorder(&tab_b);

        tab_a.set("k", "1".into());
        tab_a.remove("k");
        tab_a.remove("k");

        let events = events_b.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].new_value, None);
    }

    #[test]
    fn unwatch_stops_delivery() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let (id, events_b) = recorder(&tab_b);

        tab_b.unwatch(id);
        tab_a.set("k", "1".into());
        assert!(events_b.lock().is_empty());
    }

    #[test]
    fn separate_areas_are_independent() {
        let first = MemoryStore::new();
        let second = MemoryStore::new();

        first.set("k", "1".into());
        assert_eq!(second.get("k"), None);
        assert_ne!(first.store_id(), second.store_id());
    }
}
