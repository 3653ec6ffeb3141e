//! Dense Bloom filter backed by a word array.
//!
//! [`SimpleBloomFilter`] stores `ceil(m / 64)` words, so memory is fixed by the
//! shape and bit map operations are a single pass over the words. It is the
//! representation of choice once more than a handful of bits are enabled (see
//! [`Shape::is_sparse`]).
//!
//! # Examples
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1000, 0.01).unwrap();
//! let mut filter = SimpleBloomFilter::new(shape);
//!
//! let alice = EnhancedDoubleHasher::from_data(b"alice");
//! filter.merge_hasher(&alice).unwrap();
//!
//! assert!(filter.contains_hasher(&alice).unwrap());
//! assert!(filter.cardinality() <= shape.number_of_hash_functions());
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::bit_maps::{self, BitMapExtractor};
use crate::core::filter::{checked_bit_maps, process_checked, BloomFilter};
use crate::core::indices::{self, IndexExtractor};
use crate::core::shape::Shape;
use crate::error::Result;

/// A Bloom filter storing every bit in a `Vec<u64>`.
///
/// Cloning produces an independent copy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleBloomFilter {
    shape: Shape,
    bit_map: Vec<u64>,
}

impl SimpleBloomFilter {
    /// Create an empty filter of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            bit_map: vec![0; shape.number_of_bit_maps()],
        }
    }

    /// The backing words.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.bit_map
    }

    /// Memory used by the backing words, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.bit_map.len() * std::mem::size_of::<u64>()
    }
}

impl IndexExtractor for SimpleBloomFilter {
    /// Enabled bits in ascending order, each once.
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        indices::from_bit_map_extractor(self).process_indices(predicate)
    }
}

impl BitMapExtractor for SimpleBloomFilter {
    fn process_bit_maps(&self, predicate: &mut dyn FnMut(u64) -> bool) -> bool {
        self.bit_map.iter().all(|&word| predicate(word))
    }

    fn as_bit_map_array(&self) -> Vec<u64> {
        self.bit_map.clone()
    }
}

impl BloomFilter for SimpleBloomFilter {
    fn characteristics(&self) -> u32 {
        0
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn clear(&mut self) {
        self.bit_map.fill(0);
    }

    fn contains_indices(&self, indices: &dyn IndexExtractor) -> Result<bool> {
        let words = &self.bit_map;
        process_checked(indices, self.shape.number_of_bits(), &mut |index| {
            bit_maps::contains(words, index)
        })
    }

    /// Indices produced before an out-of-range index remain merged.
    fn merge_indices(&mut self, indices: &dyn IndexExtractor) -> Result<bool> {
        let words = &mut self.bit_map;
        process_checked(indices, self.shape.number_of_bits(), &mut |index| {
            bit_maps::set(words, index);
            true
        })?;
        #[cfg(feature = "trace")]
        tracing::trace!(shape = %self.shape, "SimpleBloomFilter::merge_indices");
        Ok(true)
    }

    /// The filter is unchanged when `bit_maps` does not fit the shape.
    fn merge_bit_maps(&mut self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        let incoming = checked_bit_maps(&self.shape, bit_maps)?;
        for (word, value) in self.bit_map.iter_mut().zip(incoming) {
            *word |= value;
        }
        #[cfg(feature = "trace")]
        tracing::trace!(shape = %self.shape, "SimpleBloomFilter::merge_bit_maps");
        Ok(true)
    }

    fn cardinality(&self) -> usize {
        self.bit_map.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn is_empty(&self) -> bool {
        self.bit_map.iter().all(|&w| w == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bit_maps::BitMapArray;
    use crate::core::indices::IndexArray;
    use crate::error::BloomForgeError;
    use crate::hash::{EnhancedDoubleHasher, SimpleHasher};

    fn shape() -> Shape {
        Shape::from_km(17, 72).unwrap()
    }

    #[test]
    fn test_new_is_empty() {
        let filter = SimpleBloomFilter::new(shape());
        assert!(filter.is_empty());
        assert!(!filter.is_full());
        assert_eq!(filter.cardinality(), 0);
        assert_eq!(filter.words().len(), 2);
        assert_eq!(filter.memory_usage(), 16);
        assert_eq!(filter.characteristics(), 0);
    }

    #[test]
    fn test_merge_indices_and_contains() {
        let mut filter = SimpleBloomFilter::new(shape());
        filter.merge_indices(&IndexArray::from(vec![0, 63, 64, 71])).unwrap();
        assert_eq!(filter.as_index_array(), vec![0, 63, 64, 71]);
        assert!(filter.contains_indices(&IndexArray::from(vec![63, 71])).unwrap());
        assert!(!filter.contains_indices(&IndexArray::from(vec![1])).unwrap());
    }

    #[test]
    fn test_merge_indices_out_of_range() {
        let mut filter = SimpleBloomFilter::new(shape());
        assert_eq!(
            filter.merge_indices(&IndexArray::from(vec![72])),
            Err(BloomForgeError::index_out_of_range(72, 72))
        );
        assert!(filter.merge_indices(&IndexArray::from(vec![-1])).is_err());
        assert!(filter.contains_indices(&IndexArray::from(vec![-1])).is_err());
        assert!(filter.contains_indices(&IndexArray::from(vec![100])).is_err());
    }

    #[test]
    fn test_merge_bit_maps_validation() {
        let mut filter = SimpleBloomFilter::new(shape());
        assert!(filter.merge_bit_maps(&BitMapArray::from(vec![1, 1, 1])).is_err());
        assert!(filter.merge_bit_maps(&BitMapArray::from(vec![0, 1 << 8])).is_err());
        assert!(filter.is_empty());

        filter.merge_bit_maps(&BitMapArray::from(vec![0b101])).unwrap();
        assert_eq!(filter.as_index_array(), vec![0, 2]);
    }

    #[test]
    fn test_merge_hasher_twice_is_idempotent() {
        let hasher = EnhancedDoubleHasher::from_data(b"idempotent");
        let mut filter = SimpleBloomFilter::new(shape());
        filter.merge_hasher(&hasher).unwrap();
        let once = filter.clone();
        filter.merge_hasher(&hasher).unwrap();
        assert_eq!(filter, once);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut filter = SimpleBloomFilter::new(shape());
        filter.merge_hasher(&SimpleHasher::new(1, 1)).unwrap();
        let copy = filter.clone();
        filter.clear();
        assert!(filter.is_empty());
        assert_eq!(copy.cardinality(), 17);
    }

    #[test]
    fn test_full_filter() {
        let shape = Shape::from_km(1, 70).unwrap();
        let mut filter = SimpleBloomFilter::new(shape);
        let all: Vec<i32> = (0..70).collect();
        filter.merge_indices(&IndexArray::from(all)).unwrap();
        assert!(filter.is_full());
        assert_eq!(filter.estimate_n().unwrap(), i32::MAX as usize);
    }

    #[test]
    fn test_contains_filter_and_bit_maps() {
        let mut big = SimpleBloomFilter::new(shape());
        let mut small = SimpleBloomFilter::new(shape());
        big.merge_hasher(&SimpleHasher::new(1, 1)).unwrap();
        small.merge_indices(&IndexArray::from(vec![2, 3])).unwrap();

        assert!(big.contains_filter(&small).unwrap());
        assert!(!small.contains_filter(&big).unwrap());
        assert!(big.contains_bit_maps(&small).unwrap());
        assert!(big.contains_hasher(&SimpleHasher::new(1, 1)).unwrap());
        assert!(!big.contains_hasher(&SimpleHasher::new(30, 1)).unwrap());
    }
}
