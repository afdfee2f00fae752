//! Minimal edit scripts between two sequences.

use crate::error::{ReactiveError, Result};

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    /// Add an element of the target sequence.
    Insert(T),
    /// Remove an element of the source sequence.
    Delete(T),
    /// Keep an element of the source sequence in place.
    Keep(T),
}

impl<T> Edit<T> {
    pub fn value(&self) -> &T {
        match self {
            Edit::Insert(value) | Edit::Delete(value) | Edit::Keep(value) => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Edit::Insert(value) | Edit::Delete(value) | Edit::Keep(value) => value,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Edit::Insert(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Edit::Delete(_))
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Edit::Keep(_))
    }

    /// `+`, `-` or `=`.
    pub fn tag(&self) -> char {
        match self {
            Edit::Insert(_) => '+',
            Edit::Delete(_) => '-',
            Edit::Keep(_) => '=',
        }
    }
}

/// `cells[i * cols + j]` is the edit distance between the first `i` elements
/// of the source and the first `j` elements of the target.
struct CostTable {
    cols: usize,
    cells: Vec<usize>,
}

impl CostTable {
    fn build<T, F>(a: &[T], b: &[T], eq: &F) -> Self
    where
        F: Fn(&T, &T) -> bool,
    {
        let cols = b.len() + 1;
        let mut cells = vec![0; (a.len() + 1) * cols];

        for i in 0..=a.len() {
            cells[i * cols] = i;
        }
        for j in 0..=b.len() {
            cells[j] = j;
        }

        for i in 1..=a.len() {
            for j in 1..=b.len() {
                cells[i * cols + j] = if eq(&a[i - 1], &b[j - 1]) {
                    cells[(i - 1) * cols + j - 1]
                } else {
                    1 + cells[(i - 1) * cols + j].min(cells[i * cols + j - 1])
                };
            }
        }

        Self { cols, cells }
    }

    fn at(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }
}

/// Compute the edit script turning `a` into `b`.
///
/// The script has the minimal number of inserts plus deletes under `eq`.
/// Kept and inserted elements appear in the order of `b`; deletes sit at the
/// position they occupied in `a`. `Keep` carries the element of `a`.
///
/// When removing from `a` and adding from `b` cost the same, the script
/// prefers to insert first while walking backwards, so deletes come before
/// inserts at the same position.
///
/// This is the classic dynamic programming edit distance: O(n·m) in time
/// and memory. Use it for short sequences such as child lists.
///
/// # Example
///
/// ```rust,ignore
/// let script = diff(&['a', 'b', 'c'], &['a', 'c', 'd'], |x, y| x == y);
/// assert_eq!(
///     script,
///     vec![Edit::Keep('a'), Edit::Delete('b'), Edit::Keep('c'), Edit::Insert('d')]
/// );
/// ```
pub fn diff<T, F>(a: &[T], b: &[T], eq: F) -> Vec<Edit<T>>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let table = CostTable::build(a, b, &eq);

    let mut script = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (a.len(), b.len());

    while i > 0 && j > 0 {
        if eq(&a[i - 1], &b[j - 1]) {
            script.push(Edit::Keep(a[i - 1].clone()));
            i -= 1;
            j -= 1;
        } else if table.at(i - 1, j) < table.at(i, j - 1) {
            script.push(Edit::Delete(a[i - 1].clone()));
            i -= 1;
        } else {
            script.push(Edit::Insert(b[j - 1].clone()));
            j -= 1;
        }
    }

    script.extend(a[..i].iter().rev().cloned().map(Edit::Delete));
    script.extend(b[..j].iter().rev().cloned().map(Edit::Insert));

    script.reverse();
    script
}

/// The number of inserts plus deletes needed to turn `a` into `b`.
pub fn edit_distance<T, F>(a: &[T], b: &[T], eq: F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    CostTable::build(a, b, &eq).at(a.len(), b.len())
}

/// Apply an edit script to `source`.
///
/// Each `Keep` and `Delete` consumes the next element of `source`; `Keep`
/// copies it to the output and `Insert` adds its own value. Fails if the
/// script does not consume `source` exactly.
pub fn patch<T: Clone>(source: &[T], script: &[Edit<T>]) -> Result<Vec<T>> {
    let mismatch = || ReactiveError::InvalidArgument("edit script does not match the source sequence".into());

    let mut remaining = source.iter();
    let mut output = Vec::with_capacity(source.len());

    for edit in script {
        match edit {
            Edit::Insert(value) => output.push(value.clone()),
            Edit::Delete(_) => {
                remaining.next().ok_or_else(mismatch)?;
            }
            Edit::Keep(_) => output.push(remaining.next().ok_or_else(mismatch)?.clone()),
        }
    }

    if remaining.next().is_some() {
        return Err(mismatch());
    }
    Ok(output)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
