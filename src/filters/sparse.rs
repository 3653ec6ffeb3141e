//! Sparse Bloom filter backed by an ordered index set.
//!
//! [`SparseBloomFilter`] keeps only the enabled indices. While the cardinality
//! stays below [`Shape::is_sparse`]'s threshold it is smaller than the dense
//! word array, and index traversal needs no bit scanning. Word traversal is
//! synthesized on the fly and always yields `ceil(m / 64)` words.

#![allow(clippy::pedantic)]
#![allow(clippy::cast_sign_loss)]

use crate::core::bit_maps::{self, BitMapArray, BitMapExtractor};
use crate::core::filter::{checked_bit_maps, process_checked, BloomFilter, SPARSE};
use crate::core::indices::{self, IndexExtractor};
use crate::core::shape::Shape;
use crate::error::Result;
use std::collections::BTreeSet;

/// Yield the words of a filter whose enabled bits are `sorted` (ascending,
/// non-negative), padded with zero words up to `limit` words.
pub(crate) fn process_sorted_as_bit_maps(
    sorted: impl Iterator<Item = i32>,
    limit: usize,
    predicate: &mut dyn FnMut(u64) -> bool,
) -> bool {
    let mut word = 0u64;
    let mut position = 0usize;
    for index in sorted {
        let target = bit_maps::get_long_index(index) as usize;
        while position != target {
            if !predicate(word) {
                return false;
            }
            word = 0;
            position += 1;
        }
        word |= bit_maps::get_long_bit(index);
    }
    if limit == 0 {
        return true;
    }
    if !predicate(word) {
        return false;
    }
    position += 1;
    while position < limit {
        if !predicate(0) {
            return false;
        }
        position += 1;
    }
    true
}

/// A Bloom filter storing the enabled indices in a `BTreeSet`.
///
/// # Examples
///
/// ```
/// use bloomforge::prelude::*;
///
/// let shape = Shape::from_km(3, 200).unwrap();
/// let mut filter = SparseBloomFilter::new(shape);
/// filter.merge_indices(&IndexArray::from(vec![150, 3])).unwrap();
///
/// assert_eq!(filter.as_index_array(), vec![3, 150]);
/// assert_eq!(filter.as_bit_map_array(), vec![1 << 3, 0, 1 << 22, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseBloomFilter {
    shape: Shape,
    indices: BTreeSet<i32>,
}

impl SparseBloomFilter {
    /// Create an empty filter of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            indices: BTreeSet::new(),
        }
    }
}

impl IndexExtractor for SparseBloomFilter {
    /// Enabled bits in ascending order, each once.
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        self.indices.iter().all(|&index| predicate(index))
    }

    fn as_index_array(&self) -> Vec<i32> {
        self.indices.iter().copied().collect()
    }
}

impl BitMapExtractor for SparseBloomFilter {
    fn process_bit_maps(&self, predicate: &mut dyn FnMut(u64) -> bool) -> bool {
        process_sorted_as_bit_maps(
            self.indices.iter().copied(),
            self.shape.number_of_bit_maps(),
            predicate,
        )
    }
}

impl BloomFilter for SparseBloomFilter {
    fn characteristics(&self) -> u32 {
        SPARSE
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn clear(&mut self) {
        self.indices.clear();
    }

    fn contains_indices(&self, indices: &dyn IndexExtractor) -> Result<bool> {
        let stored = &self.indices;
        process_checked(indices, self.shape.number_of_bits(), &mut |index| {
            stored.contains(&index)
        })
    }

    /// Indices produced before an out-of-range index remain merged.
    fn merge_indices(&mut self, indices: &dyn IndexExtractor) -> Result<bool> {
        let stored = &mut self.indices;
        process_checked(indices, self.shape.number_of_bits(), &mut |index| {
            stored.insert(index);
            true
        })?;
        #[cfg(feature = "trace")]
        tracing::trace!(shape = %self.shape, "SparseBloomFilter::merge_indices");
        Ok(true)
    }

    /// The filter is unchanged when `bit_maps` does not fit the shape.
    fn merge_bit_maps(&mut self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        let words = BitMapArray::from(checked_bit_maps(&self.shape, bit_maps)?);
        let stored = &mut self.indices;
        indices::from_bit_map_extractor(&words).process_indices(&mut |index| {
            stored.insert(index);
            true
        });
        #[cfg(feature = "trace")]
        tracing::trace!(shape = %self.shape, "SparseBloomFilter::merge_bit_maps");
        Ok(true)
    }

    fn cardinality(&self) -> usize {
        self.indices.len()
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
