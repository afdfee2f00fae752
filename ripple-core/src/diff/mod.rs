//! Sequence Diffing and Reconciliation
//!
//! [`diff`] computes a minimal insert/delete/keep script between two
//! sequences under a caller-supplied equality. [`reconcile`] replays such a
//! script on a live [`ChildList`], reusing every node it can.
//!
//! Both are quadratic in the sequence lengths and meant for child lists, not
//! bulk data.

mod edit;
mod reconcile;

pub use edit::{diff, edit_distance, patch, Edit};
pub use reconcile::{identity_key, node_eq, reconcile, reconcile_with, ChildList, ChildNode, ReconcileStats};
