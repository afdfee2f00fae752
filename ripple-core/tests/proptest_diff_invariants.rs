//! Property-based invariant tests for the edit engine and the reconciler.
//!
//! These tests check properties that must hold for **any** pair of inputs:
//!
//! 1. Applying `diff(a, b)` to `a` yields `b`.
//! 2. The number of non-keep edits equals `edit_distance(a, b)`.
//! 3. The distance is bounded by the lengths of both sequences.
//! 4. Keyed reconciliation leaves the live keys in the desired order.
//! 5. Keyed reconciliation removes exactly the nodes whose key disappeared.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use proptest::prelude::*;

use ripple_core::diff::{diff, edit_distance, patch, reconcile, ChildList, ChildNode};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Short sequences over a small alphabet, so that most pairs share items.
fn sequence() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..5, 0..16)
}

/// Distinct keys drawn from a small pool, in random order.
fn keys() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::hash_set(0u8..12, 0..10)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

#[derive(Debug, Clone)]
struct Item {
    uid: usize,
    key: String,
}

impl Item {
    fn keyed(key: u8) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self {
            uid: COUNTER.fetch_add(1, Ordering::Relaxed),
            key: key.to_string(),
        }
    }
}

impl ChildNode for Item {
    fn key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn same_node(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

struct List {
    items: Mutex<Vec<Item>>,
}

impl List {
    fn with(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    fn keys(&self) -> Vec<String> {
        self.items.lock().iter().map(|item| item.key.clone()).collect()
    }

    fn uids(&self) -> Vec<usize> {
        self.items.lock().iter().map(|item| item.uid).collect()
    }
}

impl ChildList for List {
    type Node = Item;

    fn children(&self) -> Vec<Item> {
        self.items.lock().clone()
    }

    fn append(&self, node: Item) {
        let mut items = self.items.lock();
        items.retain(|item| item.uid != node.uid);
        items.push(node);
    }

    fn remove_child(&self, node: &Item) {
        self.items.lock().retain(|item| item.uid != node.uid);
    }

    fn insert_before(&self, node: Item, reference: &Item) {
        let mut items = self.items.lock();
        items.retain(|item| item.uid != node.uid);
        let at = items
            .iter()
            .position(|item| item.uid == reference.uid)
            .unwrap_or(items.len());
        items.insert(at, node);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Edit scripts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn patch_of_diff_rebuilds_target(a in sequence(), b in sequence()) {
        let script = diff(&a, &b, |x, y| x == y);
        let rebuilt = patch(&a, &script).unwrap();
        prop_assert_eq!(rebuilt, b);
    }

    #[test]
    fn non_keep_edits_match_distance(a in sequence(), b in sequence()) {
        let script = diff(&a, &b, |x, y| x == y);
        let changes = script.iter().filter(|edit| !edit.is_keep()).count();
        prop_assert_eq!(changes, edit_distance(&a, &b, |x, y| x == y));
    }

    #[test]
    fn distance_is_bounded(a in sequence(), b in sequence()) {
        let distance = edit_distance(&a, &b, |x, y| x == y);
        prop_assert!(distance >= a.len().abs_diff(b.len()));
        prop_assert!(distance <= a.len() + b.len());
        prop_assert_eq!(edit_distance(&a, &a, |x, y| x == y), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Keyed reconciliation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn keyed_reconcile_reaches_desired_order(current in keys(), desired in keys()) {
        let list = List::with(current.iter().copied().map(Item::keyed).collect());
        let wanted: Vec<Item> = desired.iter().copied().map(Item::keyed).collect();

        reconcile(&list, &wanted);

        let expected: Vec<String> = desired.iter().map(u8::to_string).collect();
        prop_assert_eq!(list.keys(), expected);
    }

    #[test]
    fn keyed_reconcile_removes_only_vanished_keys(current in keys(), desired in keys()) {
        let list = List::with(current.iter().copied().map(Item::keyed).collect());
        let before: HashSet<usize> = list.uids().into_iter().collect();
        let wanted: Vec<Item> = desired.iter().copied().map(Item::keyed).collect();

        let stats = reconcile(&list, &wanted);

        let kept: HashSet<u8> = desired.iter().copied().collect();
        let vanished = current.iter().filter(|key| !kept.contains(key)).count();
        prop_assert_eq!(stats.removed, vanished);

        // Surviving keys keep their live node.
        let survivors = list.uids().into_iter().filter(|uid| before.contains(uid)).count();
        prop_assert_eq!(survivors, current.len() - vanished);
    }
}
