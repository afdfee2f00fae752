//! Dependency Graph
//!
//! This module implements the subscription structure that connects observable
//! fields to the computations that read them.
//!
//! # Overview
//!
//! The graph is bipartite:
//!
//! - On one side are field identities: a key inside one reactive container.
//! - On the other side are computations (effects, including the internal
//!   recompute effect of a computed value).
//!
//! Every container owns a [`FieldSubscriptions`] map from [`FieldKey`] to a
//! subscription set. A computation that reads a field is added to that
//! field's set, and the set is recorded on the computation as a
//! back-reference so the computation can leave every set it belongs to in a
//! single pass before it re-runs. A set that loses its last member is
//! removed from the map.
//!
//! # Ordering
//!
//! Subscription sets are ordered by first subscription. Notification walks a
//! snapshot of the set in that order, so re-runs are deterministic.

mod field;
mod subscription;

pub use field::{ContainerId, FieldKey, Symbol};
pub use subscription::FieldSubscriptions;

pub(crate) use subscription::{unsubscribe_all, SubscriptionSet};
