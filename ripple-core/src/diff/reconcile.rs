//! Reconciling a live child list with a desired sequence.
//!
//! The reconciler diffs the current children against the desired ones and
//! replays the script on the live list, leaving every kept node where it is.
//!
//! # Anchors
//!
//! Inserted nodes are placed before the next kept node in the script (the
//! anchor) or appended once no kept node follows. Kept nodes are never
//! touched, so they preserve identity and relative order.
//!
//! # Moves
//!
//! A node that is deleted at one position and inserted at another is moved
//! instead: the delete is skipped and the live node is inserted at its new
//! position. Inserting a node that is already attached moves it, as in
//! DOM-like trees.

use std::sync::Arc;

use super::edit::{diff, Edit};

/// A node that can live in a [`ChildList`].
pub trait ChildNode: Clone {
    /// The explicit identity token, if the node carries one.
    fn key(&self) -> Option<&str>;

    /// Whether both handles refer to the same live node.
    fn same_node(&self, other: &Self) -> bool;

    fn text_content(&self) -> Option<String> {
        None
    }
}

/// An ordered collection of live nodes.
///
/// Methods take `&self`; implementations are expected to use interior
/// mutability, like handles to a shared tree.
pub trait ChildList {
    type Node: ChildNode;

    /// Snapshot of the current children.
    fn children(&self) -> Vec<Self::Node>;

    /// Append a node, moving it if it is already attached.
    fn append(&self, node: Self::Node);

    fn remove_child(&self, node: &Self::Node);

    /// Insert `node` right before `reference`, moving it if it is already
    /// attached.
    fn insert_before(&self, node: Self::Node, reference: &Self::Node);
}

impl<L: ChildList + ?Sized> ChildList for Arc<L> {
    type Node = L::Node;

    fn children(&self) -> Vec<Self::Node> {
        (**self).children()
    }

    fn append(&self, node: Self::Node) {
        (**self).append(node)
    }

    fn remove_child(&self, node: &Self::Node) {
        (**self).remove_child(node)
    }

    fn insert_before(&self, node: Self::Node, reference: &Self::Node) {
        (**self).insert_before(node, reference)
    }
}

/// Counts of what a reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub kept: usize,
    pub inserted: usize,
    pub removed: usize,
    pub moved: usize,
}

/// Default node equality: explicit keys when both nodes have one, otherwise
/// node identity.
pub fn node_eq<N: ChildNode>(a: &N, b: &N) -> bool {
    match (a.key(), b.key()) {
        (Some(left), Some(right)) => left == right,
        _ => a.same_node(b),
    }
}

/// The explicit key of a node, falling back to its text content.
pub fn identity_key<N: ChildNode>(node: &N) -> Option<String> {
    node.key().map(str::to_owned).or_else(|| node.text_content())
}

/// Make `list` match `desired` using [`node_eq`].
pub fn reconcile<L: ChildList>(list: &L, desired: &[L::Node]) -> ReconcileStats {
    reconcile_with(list, desired, node_eq)
}

/// Make `list` match `desired`, comparing nodes with `eq`.
pub fn reconcile_with<L, F>(list: &L, desired: &[L::Node], eq: F) -> ReconcileStats
where
    L: ChildList,
    F: Fn(&L::Node, &L::Node) -> bool,
{
    let mut stats = ReconcileStats::default();
    let current = list.children();

    if current.is_empty() {
        for node in desired {
            list.append(node.clone());
        }
        stats.inserted = desired.len();
        tracing::trace!(inserted = stats.inserted, "reconciled empty child list");
        return stats;
    }

    let script = diff(&current, desired, &eq);
    let moves = pair_moves(&script, &eq);

    let next_keep = |after: usize| {
        script
            .iter()
            .enumerate()
            .skip(after + 1)
            .find(|(_, edit)| edit.is_keep())
            .map(|(_, edit)| edit.value())
    };

    let mut anchor = script.iter().find(|edit| edit.is_keep()).map(Edit::value);

    for (position, edit) in script.iter().enumerate() {
        match edit {
            Edit::Insert(node) => {
                let node = match moves[position] {
                    Some(from) => {
                        stats.moved += 1;
                        script[from].value().clone()
                    }
                    None => {
                        stats.inserted += 1;
                        node.clone()
                    }
                };
                match anchor {
                    Some(reference) => list.insert_before(node, reference),
                    None => list.append(node),
                }
            }
            Edit::Delete(node) => {
                if moves[position].is_none() {
                    list.remove_child(node);
                    stats.removed += 1;
                }
            }
            Edit::Keep(_) => {
                stats.kept += 1;
                anchor = next_keep(position);
            }
        }
    }

    tracing::trace!(
        kept = stats.kept,
        inserted = stats.inserted,
        removed = stats.removed,
        moved = stats.moved,
        "reconciled child list"
    );
    stats
}

/// Pair each insert with an unpaired delete of an equal node.
///
/// `moves[i]` holds the position of the partner of edit `i`, for both sides
/// of a pair.
fn pair_moves<N, F>(script: &[Edit<N>], eq: &F) -> Vec<Option<usize>>
where
    F: Fn(&N, &N) -> bool,
{
    let mut moves = vec![None; script.len()];

    for (insert, edit) in script.iter().enumerate() {
        let Edit::Insert(node) = edit else {
            continue;
        };
        let partner = script
            .iter()
            .enumerate()
            .position(|(delete, other)| other.is_delete() && moves[delete].is_none() && eq(other.value(), node));
        if let Some(delete) = partner {
            moves[insert] = Some(delete);
            moves[delete] = Some(insert);
        }
    }

    moves
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
