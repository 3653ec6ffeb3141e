//! Index and count pairs consumed by counting filters.
//!
//! A cell is one position of a counting filter together with its count. A
//! [`CellExtractor`] is also an [`IndexExtractor`] over the cell positions, so
//! counting filters can be merged into plain filters directly.

#![allow(clippy::pedantic)]

use crate::core::indices::IndexExtractor;
use std::collections::BTreeMap;

/// A lazy sequence of `(index, count)` pairs.
///
/// Same early exit contract as [`IndexExtractor::process_indices`].
pub trait CellExtractor: IndexExtractor {
    /// Feed each `(index, count)` pair to `consumer`, stopping at the first `false`.
    fn process_cells(&self, consumer: &mut dyn FnMut(i32, i32) -> bool) -> bool;
}

/// Cells aggregated from indices or explicit pairs, in ascending index order.
///
/// # Examples
///
/// ```
/// use bloomforge::core::cells::{CellCounts, CellExtractor};
/// use bloomforge::core::indices::IndexArray;
///
/// let cells = CellCounts::from_index_extractor(&IndexArray::from(vec![4, 1, 4, 4]));
/// let mut pairs = Vec::new();
/// cells.process_cells(&mut |index, count| {
///     pairs.push((index, count));
///     true
/// });
/// assert_eq!(pairs, vec![(1, 1), (4, 3)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellCounts {
    counts: BTreeMap<i32, i32>,
}

impl CellCounts {
    /// Count how often each index occurs in `indices`.
    #[must_use]
    pub fn from_index_extractor(indices: &dyn IndexExtractor) -> Self {
        let mut counts = BTreeMap::new();
        indices.process_indices(&mut |index| {
            let count: &mut i32 = counts.entry(index).or_insert(0);
            *count = count.wrapping_add(1);
            true
        });
        Self { counts }
    }

    /// Aggregate explicit `(index, count)` pairs; repeated indices are summed.
    #[must_use]
    pub fn from_cells(cells: &[(i32, i32)]) -> Self {
        let mut counts = BTreeMap::new();
        for &(index, count) in cells {
            let total: &mut i32 = counts.entry(index).or_insert(0);
            *total = total.wrapping_add(count);
        }
        Self { counts }
    }

    /// Number of distinct indices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether there are no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl IndexExtractor for CellCounts {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        self.counts.keys().all(|&index| predicate(index))
    }
}

impl CellExtractor for CellCounts {
    fn process_cells(&self, consumer: &mut dyn FnMut(i32, i32) -> bool) -> bool {
        self.counts
            .iter()
            .all(|(&index, &count)| consumer(index, count))
    }
}
