//! Subscription sets and the per-container field map.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::field::{ContainerId, FieldKey};
use crate::reactive::computation::{Computation, ComputationId};
use crate::reactive::context::ReactiveContext;
use crate::reactive::runtime::UpdateDepth;

type SetMap = Mutex<IndexMap<FieldKey, Arc<SubscriptionSet>>>;

/// The computations currently depending on one field.
///
/// Members are kept in subscription order. A set that loses its last member
/// is dropped from its container's map.
pub(crate) struct SubscriptionSet {
    field: FieldKey,
    owner: Weak<SetMap>,
    members: Mutex<IndexMap<ComputationId, Arc<Computation>>>,
}

impl SubscriptionSet {
    fn new(field: FieldKey, owner: Weak<SetMap>) -> Self {
        Self {
            field,
            owner,
            members: Mutex::new(IndexMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Returns `false` if the computation was already a member.
    fn insert(&self, computation: &Arc<Computation>) -> bool {
        let mut members = self.members.lock();
        if members.contains_key(&computation.id()) {
            return false;
        }
        members.insert(computation.id(), Arc::clone(computation));
        true
    }

    pub(crate) fn remove(&self, id: ComputationId) {
        let now_empty = {
            let mut members = self.members.lock();
            members.shift_remove(&id).is_some() && members.is_empty()
        };
        if now_empty {
            self.prune();
        }
    }

    /// Drop this set from the owner map if it is still the registered set
    /// for its field and nobody subscribed in the meantime.
    ///
    /// Lock order is map, then members.
    fn prune(&self) {
        let Some(owner) = self.owner.upgrade() else {
            return;
        };
        let mut sets = owner.lock();
        let registered = sets
            .get(&self.field)
            .is_some_and(|set| std::ptr::eq(Arc::as_ptr(set), self));
        if registered && self.is_empty() {
            sets.shift_remove(&self.field);
        }
    }

    /// Copy the members out so the set can change while they run.
    fn snapshot(&self) -> Vec<Arc<Computation>> {
        self.members.lock().values().cloned().collect()
    }
}

impl std::fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("field", &self.field)
            .field("len", &self.len())
            .finish()
    }
}

/// Field → subscription set map owned by a single container.
pub struct FieldSubscriptions {
    container: ContainerId,
    sets: Arc<SetMap>,
}

impl FieldSubscriptions {
    pub fn new() -> Self {
        Self {
            container: ContainerId::new(),
            sets: Arc::new(Mutex::new(IndexMap::new())),
        }
    }

    /// The container these subscriptions belong to.
    pub fn container_id(&self) -> ContainerId {
        self.container
    }

    /// Subscribe the current computation, if there is one, to `key`.
    ///
    /// Containers call this on every read.
    pub fn track(&self, key: &FieldKey) {
        if let Some(computation) = ReactiveContext::current() {
            self.subscribe(key, &computation);
        }
    }

    /// Add `computation` to the set for `key`, creating the set if absent,
    /// and record the set on the computation.
    pub(crate) fn subscribe(&self, key: &FieldKey, computation: &Arc<Computation>) {
        // Prune checks emptiness under the map lock, so insert under it too.
        let set = {
            let mut sets = self.sets.lock();
            let set = sets.entry(key.clone()).or_insert_with(|| {
                Arc::new(SubscriptionSet::new(key.clone(), Arc::downgrade(&self.sets)))
            });
            if !set.insert(computation) {
                return;
            }
            Arc::clone(set)
        };

        computation.add_dependency(&set);
    }

    /// Re-execute every computation subscribed to `key`.
    ///
    /// Runs synchronously, in subscription order, against a snapshot of the
    /// set taken before the first member runs.
    pub fn notify(&self, key: &FieldKey) {
        let Some(set) = self.sets.lock().get(key).cloned() else {
            return;
        };

        let members = set.snapshot();
        if members.is_empty() {
            return;
        }

        tracing::trace!(
            container = self.container.raw(),
            field = %key,
            subscribers = members.len(),
            "notifying subscribers"
        );

        let _depth = UpdateDepth::enter();
        for computation in members {
            computation.run();
        }
    }

    /// Number of computations currently subscribed to `key`.
    pub fn subscriber_count(&self, key: &FieldKey) -> usize {
        self.sets
            .lock()
            .get(key)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Number of fields that currently have at least one subscriber.
    pub fn field_count(&self) -> usize {
        self.sets.lock().len()
    }
}

impl Default for FieldSubscriptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove `computation` from every set it belongs to and forget them.
pub(crate) fn unsubscribe_all(computation: &Computation) {
    for set in computation.take_dependencies() {
        if let Some(set) = set.upgrade() {
            set.remove(computation.id());
        }
    }
}
