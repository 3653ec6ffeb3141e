//! Sparse counting Bloom filter.
//!
//! A counting filter keeps an `i32` count per bit instead of a single flag, so
//! items can be removed again. A bit counts as enabled while its count is
//! positive; cells whose count returns to zero are dropped from storage.
//!
//! # Validity
//!
//! Counts are updated with wrapping arithmetic and every updated value is
//! OR-ed into a state word. A count that underflows below zero, or wraps past
//! `i32::MAX`, leaves the sign bit set in that word and the filter reports
//! [`is_valid`](CountingBloomFilter::is_valid) `false` from then on. Only
//! [`clear`](BloomFilter::clear) restores validity.
//!
//! ```text
//! merge(a)      count[i] += 1 for each distinct index i of a
//! remove(a)     count[i] -= 1 for each distinct index i of a
//! add(cells)    count[i] += c for each cell (i, c)
//! subtract(..)  count[i] -= c for each cell (i, c)
//! ```
//!
//! # Examples
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1000, 0.01).unwrap();
//! let mut filter = SparseCountingBloomFilter::new(shape);
//! let item = EnhancedDoubleHasher::from_data(b"item");
//!
//! filter.merge_hasher(&item).unwrap();
//! filter.merge_hasher(&item).unwrap();
//! assert_eq!(filter.max_insert_hasher(&item), 2);
//!
//! filter.remove_hasher(&item).unwrap();
//! assert!(filter.contains_hasher(&item).unwrap());
//! filter.remove_hasher(&item).unwrap();
//! assert!(filter.is_empty());
//! assert!(filter.is_valid());
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use crate::core::bit_maps::{BitMapArray, BitMapExtractor};
use crate::core::cells::{CellCounts, CellExtractor};
use crate::core::filter::{checked_bit_maps, process_checked, BloomFilter, CountingBloomFilter, SPARSE};
use crate::core::indices::{self, IndexExtractor};
use crate::core::shape::Shape;
use crate::error::{BloomForgeError, Result};
use crate::filters::sparse::process_sorted_as_bit_maps;
use std::collections::BTreeMap;

/// A counting Bloom filter storing non-zero counts in a `BTreeMap`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseCountingBloomFilter {
    shape: Shape,
    counts: BTreeMap<i32, i32>,
    state: i32,
}

impl SparseCountingBloomFilter {
    /// Create an empty, valid filter of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            counts: BTreeMap::new(),
            state: 0,
        }
    }

    /// The count stored for `index`, `0` when the cell is absent.
    #[inline]
    #[must_use]
    pub fn get_count(&self, index: i32) -> i32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    fn enabled(&self) -> impl Iterator<Item = i32> + '_ {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&index, _)| index)
    }

    /// Apply `op` to every cell of `cells`, stopping at the first index
    /// outside `[0, m)`. Cells before the failing one stay applied.
    fn apply(&mut self, cells: &dyn CellExtractor, op: fn(i32, i32) -> i32) -> Result<bool> {
        let was_valid = self.is_valid();
        let number_of_bits = self.shape.number_of_bits();
        let counts = &mut self.counts;
        let state = &mut self.state;
        let mut failure = None;
        cells.process_cells(&mut |index, count| {
            if index < 0 || index as usize >= number_of_bits {
                failure = Some(BloomForgeError::index_out_of_range(index, number_of_bits));
                return false;
            }
            let updated = op(counts.get(&index).copied().unwrap_or(0), count);
            *state |= updated;
            if updated == 0 {
                counts.remove(&index);
            } else {
                counts.insert(index, updated);
            }
            true
        });
        if was_valid && !self.is_valid() {
            tracing::warn!(shape = %self.shape, "counting filter overflowed and is no longer valid");
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(self.is_valid()),
        }
    }
}

impl IndexExtractor for SparseCountingBloomFilter {
    /// Indices with a positive count, ascending.
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        self.enabled().all(|index| predicate(index))
    }
}

impl BitMapExtractor for SparseCountingBloomFilter {
    fn process_bit_maps(&self, predicate: &mut dyn FnMut(u64) -> bool) -> bool {
        process_sorted_as_bit_maps(self.enabled(), self.shape.number_of_bit_maps(), predicate)
    }
}

impl CellExtractor for SparseCountingBloomFilter {
    /// Every stored cell, including negative counts of an invalid filter.
    fn process_cells(&self, consumer: &mut dyn FnMut(i32, i32) -> bool) -> bool {
        self.counts
            .iter()
            .all(|(&index, &count)| consumer(index, count))
    }
}

impl BloomFilter for SparseCountingBloomFilter {
    fn characteristics(&self) -> u32 {
        SPARSE
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.state = 0;
    }

    fn contains_indices(&self, indices: &dyn IndexExtractor) -> Result<bool> {
        let counts = &self.counts;
        process_checked(indices, self.shape.number_of_bits(), &mut |index| {
            counts.get(&index).is_some_and(|&count| count > 0)
        })
    }

    /// Increment each distinct index by one. Nothing is changed when any
    /// index is out of range.
    fn merge_indices(&mut self, indices: &dyn IndexExtractor) -> Result<bool> {
        let unique = indices.unique_indices();
        process_checked(&unique, self.shape.number_of_bits(), &mut |_| true)?;
        #[cfg(feature = "trace")]
        tracing::trace!(shape = %self.shape, cells = unique.len(), "SparseCountingBloomFilter::merge_indices");
        self.add(&CellCounts::from_index_extractor(&unique))
    }

    fn merge_bit_maps(&mut self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        let words = BitMapArray::from(checked_bit_maps(&self.shape, bit_maps)?);
        self.merge_indices(&indices::from_bit_map_extractor(&words))
    }

    fn cardinality(&self) -> usize {
        self.enabled().count()
    }

    fn is_empty(&self) -> bool {
        self.enabled().next().is_none()
    }
}

impl CountingBloomFilter for SparseCountingBloomFilter {
    fn add(&mut self, cells: &dyn CellExtractor) -> Result<bool> {
        self.apply(cells, i32::wrapping_add)
    }

    fn subtract(&mut self, cells: &dyn CellExtractor) -> Result<bool> {
        self.apply(cells, i32::wrapping_sub)
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.state >= 0
    }

    fn max_insert_cells(&self, cells: &dyn CellExtractor) -> i32 {
        let mut max = i32::MAX;
        cells.process_cells(&mut |index, needed| {
            if needed <= 0 {
                return true;
            }
            let count = self.get_count(index);
            let times = if count > 0 { count / needed } else { 0 };
            max = max.min(times);
            max != 0
        });
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indices::IndexArray;
    use crate::filters::{SimpleBloomFilter, SparseBloomFilter};
    use crate::hash::{EnhancedDoubleHasher, SimpleHasher};

    fn shape() -> Shape {
        Shape::from_km(17, 72).unwrap()
    }

    fn cells(filter: &SparseCountingBloomFilter) -> Vec<(i32, i32)> {
        let mut pairs = Vec::new();
        filter.process_cells(&mut |index, count| {
            pairs.push((index, count));
            true
        });
        pairs
    }

    #[test]
    fn test_merge_counts_distinct_indices_once() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        assert!(filter.merge_indices(&IndexArray::from(vec![3, 3, 5, 3])).unwrap());
        assert_eq!(cells(&filter), vec![(3, 1), (5, 1)]);

        filter.merge_indices(&IndexArray::from(vec![5])).unwrap();
        assert_eq!(filter.get_count(5), 2);
        assert_eq!(filter.cardinality(), 2);
        assert_eq!(filter.as_index_array(), vec![3, 5]);
    }

    #[test]
    fn test_merge_out_of_range_changes_nothing() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        assert!(filter.merge_indices(&IndexArray::from(vec![1, 2, 72])).is_err());
        assert!(filter.is_empty());
        assert!(filter.merge_indices(&IndexArray::from(vec![-1])).is_err());
        assert!(filter.is_valid());
    }

    #[test]
    fn test_overflow_makes_filter_invalid() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        assert!(filter.add(&CellCounts::from_cells(&[(1, i32::MAX)])).unwrap());
        assert!(filter.is_valid());

        let mut other = SimpleBloomFilter::new(shape());
        other.merge_indices(&IndexArray::from(vec![1])).unwrap();
        assert!(!filter.merge_filter(&other).unwrap());
        assert!(!filter.is_valid());
        assert_eq!(filter.get_count(1), i32::MIN);

        filter.clear();
        assert!(filter.is_valid());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_underflow_makes_filter_invalid() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        assert!(!filter.remove_indices(&IndexArray::from(vec![4])).unwrap());
        assert_eq!(cells(&filter), vec![(4, -1)]);
        // negative cells are not enabled bits
        assert_eq!(filter.cardinality(), 0);
        assert!(!filter.contains_indices(&IndexArray::from(vec![4])).unwrap());
    }

    #[test]
    fn test_subtract_removes_zero_cells() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        filter.add(&CellCounts::from_cells(&[(2, 3), (9, 1)])).unwrap();
        filter.subtract(&CellCounts::from_cells(&[(2, 3)])).unwrap();
        assert_eq!(cells(&filter), vec![(9, 1)]);
        assert!(filter.is_valid());
    }

    #[test]
    fn test_add_out_of_range_keeps_prior_cells() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        let result = filter.add(&CellCounts::from_cells(&[(1, 1), (80, 1)]));
        assert_eq!(result, Err(BloomForgeError::index_out_of_range(80, 72)));
        assert_eq!(cells(&filter), vec![(1, 1)]);
    }

    #[test]
    fn test_remove_restores_previous_state() {
        let first = EnhancedDoubleHasher::from_data(b"first");
        let second = EnhancedDoubleHasher::from_data(b"second");
        let mut filter = SparseCountingBloomFilter::new(shape());
        filter.merge_hasher(&first).unwrap();
        let snapshot = cells(&filter);

        filter.merge_hasher(&second).unwrap();
        assert!(filter.contains_hasher(&second).unwrap());
        assert!(filter.remove_hasher(&second).unwrap());
        assert_eq!(cells(&filter), snapshot);
    }

    #[test]
    fn test_max_insert() {
        let hasher = SimpleHasher::new(1, 1);
        let mut filter = SparseCountingBloomFilter::new(shape());
        assert_eq!(filter.max_insert_hasher(&hasher), 0);

        for _ in 0..3 {
            filter.merge_hasher(&hasher).unwrap();
        }
        assert_eq!(filter.max_insert_hasher(&hasher), 3);

        let mut dense = SimpleBloomFilter::new(shape());
        dense.merge_hasher(&hasher).unwrap();
        assert_eq!(filter.max_insert_filter(&dense), 3);
        assert_eq!(filter.max_insert_bit_maps(&dense), 3);
        assert_eq!(filter.max_insert_cells(&CellCounts::from_cells(&[(1, 2)])), 1);
        assert_eq!(filter.max_insert_cells(&CellCounts::from_cells(&[(1, -2)])), i32::MAX);
    }

    #[test]
    fn test_bit_maps_match_dense() {
        let hasher = EnhancedDoubleHasher::from_data(b"bits");
        let mut counting = SparseCountingBloomFilter::new(shape());
        let mut sparse = SparseBloomFilter::new(shape());
        counting.merge_hasher(&hasher).unwrap();
        counting.merge_hasher(&hasher).unwrap();
        sparse.merge_hasher(&hasher).unwrap();

        assert_eq!(counting.as_bit_map_array(), sparse.as_bit_map_array());
        assert_eq!(counting.cardinality(), sparse.cardinality());
        assert!(sparse.contains_filter(&counting).unwrap());
    }

    #[test]
    fn test_merge_bit_maps() {
        let mut filter = SparseCountingBloomFilter::new(shape());
        filter.merge_bit_maps(&BitMapArray::from(vec![0b1001])).unwrap();
        assert_eq!(cells(&filter), vec![(0, 1), (3, 1)]);
        assert!(filter.merge_bit_maps(&BitMapArray::from(vec![0, 1u64 << 20])).is_err());
        filter.remove_bit_maps(&BitMapArray::from(vec![0b1])).unwrap();
        assert_eq!(cells(&filter), vec![(3, 1)]);
    }
}
