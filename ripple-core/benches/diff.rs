//! Benchmarks for the edit-distance engine and reconciler
//!
//! Run with: cargo bench -p ripple-core

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_lot::Mutex;
use ripple_core::diff::{diff, reconcile, ChildList, ChildNode};
use std::hint::black_box;

/// `n` items with every third one replaced, so the script mixes all three
/// kinds of edit.
fn make_pair(n: usize) -> (Vec<usize>, Vec<usize>) {
    let before: Vec<usize> = (0..n).collect();
    let after: Vec<usize> = (0..n).map(|i| if i % 3 == 0 { i + n } else { i }).collect();
    (before, after)
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff/script");

    for n in [8, 32, 128, 512] {
        let (before, after) = make_pair(n);
        group.bench_with_input(BenchmarkId::new("mixed", n), &(before, after), |b, (before, after)| {
            b.iter(|| black_box(diff(before, after, |x, y| x == y)))
        });
    }

    group.finish();
}

#[derive(Clone)]
struct Row(String);

impl ChildNode for Row {
    fn key(&self) -> Option<&str> {
        Some(&self.0)
    }

    fn same_node(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

struct Rows(Mutex<Vec<Row>>);

impl ChildList for Rows {
    type Node = Row;

    fn children(&self) -> Vec<Row> {
        self.0.lock().clone()
    }

    fn append(&self, node: Row) {
        let mut rows = self.0.lock();
        rows.retain(|r| r.0 != node.0);
        rows.push(node);
    }

    fn remove_child(&self, node: &Row) {
        self.0.lock().retain(|r| r.0 != node.0);
    }

    fn insert_before(&self, node: Row, reference: &Row) {
        let mut rows = self.0.lock();
        rows.retain(|r| r.0 != node.0);
        let at = rows.iter().position(|r| r.0 == reference.0).unwrap_or(rows.len());
        rows.insert(at, node);
    }
}

fn rows(keys: impl Iterator<Item = usize>) -> Vec<Row> {
    keys.map(|k| Row(k.to_string())).collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff/reconcile");

    for n in [8, 32, 128] {
        group.bench_function(BenchmarkId::new("reverse", n), |b| {
            let reversed = rows((0..n).rev());
            b.iter(|| {
                let list = Rows(Mutex::new(rows(0..n)));
                black_box(reconcile(&list, &reversed))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_reconcile);

criterion_main!(benches);
