//! Core Bloom filter trait definitions.
//!
//! Every filter in the crate is a mutable bit set described by a [`Shape`]. A
//! filter is at the same time an [`IndexExtractor`] over its enabled bits and a
//! [`BitMapExtractor`] over its words, so any filter can be merged into, or
//! tested against, any other filter of the same shape.
//!
//! # Trait Hierarchy
//!
//! ```text
//! IndexExtractor + BitMapExtractor
//!     └── BloomFilter (merge, contains, cardinality, estimates)
//!             └── CountingBloomFilter (+ CellExtractor: add, subtract, remove)
//!
//! BloomFilterExtractor (a sequence of filters: layered filters)
//! ```
//!
//! # Design Principles
//!
//! 1. **No False Negatives**: after `merge_x(a)`, `contains_x(a)` is `true`
//! 2. **Representation Independence**: dense and sparse filters answer identically
//! 3. **Fail Fast**: indices outside `[0, m)` are errors, never silently dropped
//!
//! # Examples
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_km(17, 72).unwrap();
//! let mut first = SimpleBloomFilter::new(shape);
//! let mut second = SparseBloomFilter::new(shape);
//! first.merge_hasher(&SimpleHasher::new(1, 1)).unwrap();
//! second.merge_hasher(&SimpleHasher::new(11, 1)).unwrap();
//!
//! assert_eq!(first.cardinality(), 17);
//! assert_eq!(first.estimate_union(&second).unwrap(), 2);
//! assert_eq!(first.estimate_intersection(&second).unwrap(), 0);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use crate::core::bit_maps::{self, BitMapExtractor};
use crate::core::cells::{CellCounts, CellExtractor};
use crate::core::indices::{self, IndexExtractor};
use crate::core::shape::Shape;
use crate::error::{BloomForgeError, Result};
use crate::filters::SimpleBloomFilter;
use crate::hash::Hasher;

/// Characteristics flag: the filter stores indices rather than words, so index
/// traversal is the cheap direction.
pub const SPARSE: u32 = 0x1;

/// Convert a shape estimate into an item count.
///
/// Infinity saturates to `i32::MAX`; NaN (cardinality above `m`) is an error.
pub(crate) fn estimate_to_count(estimate: f64) -> Result<usize> {
    if estimate.is_infinite() {
        return Ok(i32::MAX as usize);
    }
    if estimate.is_nan() {
        return Err(BloomForgeError::estimation_failed("Cardinality too large"));
    }
    Ok(estimate.round().min(f64::from(i32::MAX)) as usize)
}

/// Fail unless `other` uses the same number of words as `shape`.
pub(crate) fn check_compatible(shape: &Shape, other: &dyn BloomFilter) -> Result<()> {
    let theirs = other.shape();
    if shape.number_of_bit_maps() != theirs.number_of_bit_maps() {
        return Err(BloomForgeError::incompatible_filters(format!(
            "{} does not match {}",
            shape, theirs
        )));
    }
    Ok(())
}

/// Traverse `indices`, failing on the first index outside `[0, number_of_bits)`.
///
/// `predicate` only sees in-range indices. Returns the traversal result.
pub(crate) fn process_checked(
    indices: &dyn IndexExtractor,
    number_of_bits: usize,
    predicate: &mut dyn FnMut(i32) -> bool,
) -> Result<bool> {
    let mut failure = None;
    let completed = indices.process_indices(&mut |index| {
        if index < 0 || index as usize >= number_of_bits {
            failure = Some(BloomForgeError::index_out_of_range(index, number_of_bits));
            return false;
        }
        predicate(index)
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(completed),
    }
}

/// Collect `bit_maps` and verify they fit a filter of `shape`.
///
/// # Errors
///
/// [`BloomForgeError::InvalidBitMaps`] when more words than
/// `shape.number_of_bit_maps()` are produced or a bit at or above `m` is set.
pub(crate) fn checked_bit_maps(shape: &Shape, bit_maps: &dyn BitMapExtractor) -> Result<Vec<u64>> {
    let limit = shape.number_of_bit_maps();
    let words = bit_maps.as_bit_map_array();
    if words.len() > limit {
        return Err(BloomForgeError::invalid_bit_maps(format!(
            "BitMapExtractor should send at most {} maps, sent {}",
            limit,
            words.len()
        )));
    }
    let tail_bits = shape.number_of_bits() % bit_maps::BITS_PER_WORD;
    if tail_bits != 0 && words.len() == limit {
        let excess = words[limit - 1] >> tail_bits;
        if excess != 0 {
            return Err(BloomForgeError::invalid_bit_maps(format!(
                "BitMapExtractor set a bit higher than the limit for the shape: {}",
                shape.number_of_bits()
            )));
        }
    }
    Ok(words)
}

/// A mutable Bloom filter over a fixed [`Shape`].
///
/// Implementors supply storage-specific merges and index containment; the
/// remaining operations are derived. All `merge_*` methods return the filter's
/// validity afterwards, which is always `true` for non-counting filters.
///
/// # Errors
///
/// Merge and containment methods fail with
/// [`BloomForgeError::IndexOutOfRange`] for indices outside `[0, m)`,
/// [`BloomForgeError::InvalidBitMaps`] for oversized bit maps and
/// [`BloomForgeError::IncompatibleFilters`] for filters of another size.
pub trait BloomFilter: IndexExtractor + BitMapExtractor {
    /// Bit flags describing the representation, see [`SPARSE`].
    fn characteristics(&self) -> u32;

    /// The shape of this filter.
    fn shape(&self) -> Shape;

    /// Disable every bit.
    fn clear(&mut self);

    /// Whether every index produced by `indices` is enabled.
    fn contains_indices(&self, indices: &dyn IndexExtractor) -> Result<bool>;

    /// Enable every index produced by `indices`.
    fn merge_indices(&mut self, indices: &dyn IndexExtractor) -> Result<bool>;

    /// OR `bit_maps` into this filter.
    fn merge_bit_maps(&mut self, bit_maps: &dyn BitMapExtractor) -> Result<bool>;

    /// Number of enabled bits.
    fn cardinality(&self) -> usize {
        let mut count = 0usize;
        self.process_bit_maps(&mut |word| {
            count += word.count_ones() as usize;
            true
        });
        count
    }

    /// Whether no bit is enabled.
    fn is_empty(&self) -> bool {
        self.process_bit_maps(&mut |word| word == 0)
    }

    /// Whether every one of the `m` bits is enabled.
    fn is_full(&self) -> bool {
        self.cardinality() == self.shape().number_of_bits()
    }

    /// Whether every bit enabled in `bit_maps` is enabled here.
    fn contains_bit_maps(&self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        Ok(self.process_bit_map_pairs(bit_maps, &mut |mine, theirs| (mine & theirs) == theirs))
    }

    /// Whether every bit enabled in `other` is enabled here.
    fn contains_filter(&self, other: &dyn BloomFilter) -> Result<bool> {
        check_compatible(&self.shape(), other)?;
        if other.characteristics() & SPARSE != 0 {
            self.contains_indices(other)
        } else {
            self.contains_bit_maps(other)
        }
    }

    /// Whether every index `hasher` produces for this shape is enabled.
    fn contains_hasher(&self, hasher: &dyn Hasher) -> Result<bool> {
        let shape = self.shape();
        self.contains_indices(&*hasher.unique_indices(&shape))
    }

    /// Enable every bit enabled in `other`.
    fn merge_filter(&mut self, other: &dyn BloomFilter) -> Result<bool> {
        check_compatible(&self.shape(), other)?;
        if other.characteristics() & SPARSE != 0 {
            self.merge_indices(other)
        } else {
            self.merge_bit_maps(other)
        }
    }

    /// Enable every index `hasher` produces for this shape.
    fn merge_hasher(&mut self, hasher: &dyn Hasher) -> Result<bool> {
        let shape = self.shape();
        self.merge_indices(&*hasher.unique_indices(&shape))
    }

    /// Estimated number of items merged into this filter.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::EstimationFailed`] if the cardinality exceeds `m`.
    fn estimate_n(&self) -> Result<usize> {
        estimate_to_count(self.shape().estimate_n(self.cardinality()))
    }

    /// Estimated number of items in the union of this filter and `other`.
    ///
    /// Computed from the cardinality of the bitwise OR; neither filter is
    /// modified.
    fn estimate_union(&self, other: &dyn BloomFilter) -> Result<usize> {
        check_compatible(&self.shape(), other)?;
        let mut cardinality = 0usize;
        self.process_bit_map_pairs(other, &mut |mine, theirs| {
            cardinality += (mine | theirs).count_ones() as usize;
            true
        });
        estimate_to_count(self.shape().estimate_n(cardinality))
    }

    /// Estimated number of items in the intersection of this filter and `other`.
    ///
    /// Uses `n(A) + n(B) - n(A ∪ B)`, clipped to `[0, i32::MAX]`. When one
    /// filter is full its estimate is infinite and the other estimate is
    /// returned; when both are full the result is `i32::MAX`.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::EstimationFailed`] when the union estimate is infinite
    /// although neither single estimate is.
    fn estimate_intersection(&self, other: &dyn BloomFilter) -> Result<usize> {
        check_compatible(&self.shape(), other)?;
        let shape = self.shape();
        let mine = shape.estimate_n(self.cardinality());
        let theirs = shape.estimate_n(other.cardinality());
        if mine.is_nan() || theirs.is_nan() {
            return Err(BloomForgeError::estimation_failed("Cardinality too large"));
        }
        if mine.is_infinite() && theirs.is_infinite() {
            return Ok(i32::MAX as usize);
        }
        if mine.is_infinite() {
            return estimate_to_count(theirs);
        }
        if theirs.is_infinite() {
            return estimate_to_count(mine);
        }
        let mut union_cardinality = 0usize;
        self.process_bit_map_pairs(other, &mut |a, b| {
            union_cardinality += (a | b).count_ones() as usize;
            true
        });
        let union = shape.estimate_n(union_cardinality);
        if union.is_infinite() {
            return Err(BloomForgeError::estimation_failed(
                "The estimated N for the union of the filters is infinite",
            ));
        }
        let estimate = (mine + theirs - union).round().max(0.0);
        Ok(estimate.min(f64::from(i32::MAX)) as usize)
    }

    /// This filter viewed as a sequence of filters, when it is one.
    ///
    /// Layered filters return themselves so containment tests against them can
    /// be answered layer by layer.
    fn as_bloom_filter_extractor(&self) -> Option<&dyn BloomFilterExtractor> {
        None
    }
}

/// A Bloom filter that keeps a count per bit.
///
/// Counts are `i32` values updated with wrapping arithmetic. Once any count
/// goes negative through underflow, or wraps past `i32::MAX`, the filter is
/// invalid until [`BloomFilter::clear`]; mutations already applied are kept.
/// `add`, `subtract` and every `merge_*`/`remove_*` method return
/// [`is_valid`](Self::is_valid) after the update.
///
/// Merging increments each distinct index of the argument by one; removing
/// decrements it by one.
pub trait CountingBloomFilter: BloomFilter + CellExtractor {
    /// Add each `(index, count)` pair to the stored counts.
    fn add(&mut self, cells: &dyn CellExtractor) -> Result<bool>;

    /// Subtract each `(index, count)` pair from the stored counts.
    fn subtract(&mut self, cells: &dyn CellExtractor) -> Result<bool>;

    /// Whether no count has ever under- or overflowed.
    fn is_valid(&self) -> bool;

    /// Largest count a single cell can hold.
    fn max_cell(&self) -> i32 {
        i32::MAX
    }

    /// Decrement each distinct index of `indices` by one.
    fn remove_indices(&mut self, indices: &dyn IndexExtractor) -> Result<bool> {
        let unique = indices.unique_indices();
        process_checked(&unique, self.shape().number_of_bits(), &mut |_| true)?;
        self.subtract(&CellCounts::from_index_extractor(&unique))
    }

    /// Decrement each bit enabled in `bit_maps` by one.
    fn remove_bit_maps(&mut self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        self.remove_indices(&indices::from_bit_map_extractor(bit_maps))
    }

    /// Decrement each bit enabled in `other` by one.
    fn remove_filter(&mut self, other: &dyn BloomFilter) -> Result<bool> {
        check_compatible(&self.shape(), other)?;
        self.remove_indices(other)
    }

    /// Decrement each distinct index `hasher` produces by one.
    fn remove_hasher(&mut self, hasher: &dyn Hasher) -> Result<bool> {
        let shape = self.shape();
        self.remove_indices(&*hasher.unique_indices(&shape))
    }

    /// How many times `cells` could be subtracted before a count goes negative.
    ///
    /// Cells with a non-positive count impose no limit; an extractor with no
    /// limiting cell yields `i32::MAX`.
    fn max_insert_cells(&self, cells: &dyn CellExtractor) -> i32;

    /// How many times the distinct `indices` are contained in this filter.
    fn max_insert_indices(&self, indices: &dyn IndexExtractor) -> i32 {
        self.max_insert_cells(&CellCounts::from_index_extractor(&indices.unique_indices()))
    }

    /// How many times the enabled bits of `bit_maps` are contained.
    fn max_insert_bit_maps(&self, bit_maps: &dyn BitMapExtractor) -> i32 {
        self.max_insert_indices(&indices::from_bit_map_extractor(bit_maps))
    }

    /// How many times `other` is contained.
    fn max_insert_filter(&self, other: &dyn BloomFilter) -> i32 {
        self.max_insert_indices(other)
    }

    /// How many times the indices of `hasher` are contained.
    fn max_insert_hasher(&self, hasher: &dyn Hasher) -> i32 {
        let shape = self.shape();
        self.max_insert_indices(&*hasher.unique_indices(&shape))
    }
}

/// A sequence of Bloom filters.
///
/// The filters are borrowed from the extractor for `'a`, so callers may keep
/// references to them while the extractor is borrowed.
pub trait BloomFilterExtractor {
    /// Feed each filter to `predicate` in order, stopping at the first `false`.
    fn process_bloom_filters<'a>(
        &'a self,
        predicate: &mut dyn FnMut(&'a dyn BloomFilter) -> bool,
    ) -> bool;

    /// Collect references to every filter.
    fn as_bloom_filter_array<'a>(&'a self) -> Vec<&'a dyn BloomFilter> {
        let mut filters = Vec::new();
        self.process_bloom_filters(&mut |filter| {
            filters.push(filter);
            true
        });
        filters
    }

    /// Traverse this sequence and `other` in lock step.
    ///
    /// The shorter sequence is padded with `None`.
    fn process_bloom_filter_pair<'a>(
        &'a self,
        other: &'a dyn BloomFilterExtractor,
        func: &mut dyn FnMut(Option<&'a dyn BloomFilter>, Option<&'a dyn BloomFilter>) -> bool,
    ) -> bool {
        let mine = self.as_bloom_filter_array();
        let mut position = 0;
        let completed = other.process_bloom_filters(&mut |theirs| {
            let filter = mine.get(position).copied();
            position += 1;
            func(filter, Some(theirs))
        });
        completed && mine.iter().skip(position).all(|&filter| func(Some(filter), None))
    }

    /// OR every filter into a single dense filter with the first filter's shape.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::InvalidParameters`] for an empty sequence and
    /// [`BloomForgeError::IncompatibleFilters`] when the filters differ in size.
    fn flatten(&self) -> Result<SimpleBloomFilter> {
        let mut result: Option<SimpleBloomFilter> = None;
        let mut failure = None;
        self.process_bloom_filters(&mut |filter| {
            let target = result.get_or_insert_with(|| SimpleBloomFilter::new(filter.shape()));
            match target.merge_filter(filter) {
                Ok(_) => true,
                Err(err) => {
                    failure = Some(err);
                    false
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
        result.ok_or_else(|| BloomForgeError::invalid_parameters("no filters to flatten"))
    }
}

/// A [`BloomFilterExtractor`] over borrowed filters.
///
/// # Examples
///
/// ```
/// use bloomforge::prelude::*;
///
/// let shape = Shape::from_km(3, 64).unwrap();
/// let mut a = SimpleBloomFilter::new(shape);
/// let mut b = SimpleBloomFilter::new(shape);
/// a.merge_indices(&IndexArray::from(vec![1])).unwrap();
/// b.merge_indices(&IndexArray::from(vec![2])).unwrap();
///
/// let filters = BloomFilterArray::from_bloom_filter_array(vec![&a, &b]);
/// assert_eq!(filters.flatten().unwrap().as_index_array(), vec![1, 2]);
/// ```
pub struct BloomFilterArray<'f> {
    filters: Vec<&'f dyn BloomFilter>,
}

impl<'f> BloomFilterArray<'f> {
    /// Wrap `filters`, traversed in the given order.
    #[must_use]
    pub fn from_bloom_filter_array(filters: Vec<&'f dyn BloomFilter>) -> Self {
        Self { filters }
    }
}

impl BloomFilterExtractor for BloomFilterArray<'_> {
    fn process_bloom_filters<'a>(
        &'a self,
        predicate: &mut dyn FnMut(&'a dyn BloomFilter) -> bool,
    ) -> bool {
        self.filters.iter().all(|&filter| predicate(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bit_maps::BitMapArray;
    use crate::core::indices::IndexArray;
    use crate::filters::{SimpleBloomFilter, SparseBloomFilter};
    use crate::hash::SimpleHasher;

    fn shape() -> Shape {
        Shape::from_km(17, 72).unwrap()
    }

    #[test]
    fn test_estimate_to_count() {
        assert_eq!(estimate_to_count(f64::INFINITY).unwrap(), i32::MAX as usize);
        assert_eq!(estimate_to_count(1.49).unwrap(), 1);
        assert_eq!(estimate_to_count(1.5).unwrap(), 2);
        assert_eq!(estimate_to_count(1e300).unwrap(), i32::MAX as usize);
        assert!(estimate_to_count(f64::NAN).is_err());
    }

    #[test]
    fn test_checked_bit_maps_limits() {
        let shape = shape();
        assert!(checked_bit_maps(&shape, &BitMapArray::from(vec![1, 1])).is_ok());
        assert!(checked_bit_maps(&shape, &BitMapArray::from(vec![1])).is_ok());
        assert!(checked_bit_maps(&shape, &BitMapArray::from(vec![1, 1, 1])).is_err());
        // bit 72 lives in word 1, bit 8
        assert!(checked_bit_maps(&shape, &BitMapArray::from(vec![0, 1 << 8])).is_err());
        assert!(checked_bit_maps(&shape, &BitMapArray::from(vec![0, 1 << 7])).is_ok());
    }

    #[test]
    fn test_estimates_across_representations() {
        let mut dense = SimpleBloomFilter::new(shape());
        let mut sparse = SparseBloomFilter::new(shape());
        dense.merge_hasher(&SimpleHasher::new(1, 1)).unwrap();
        sparse.merge_hasher(&SimpleHasher::new(11, 1)).unwrap();

        assert_eq!(dense.cardinality(), 17);
        assert_eq!(sparse.cardinality(), 17);
        assert_eq!(dense.estimate_n().unwrap(), 1);
        assert_eq!(dense.estimate_union(&sparse).unwrap(), 2);
        assert_eq!(sparse.estimate_union(&dense).unwrap(), 2);
        assert_eq!(dense.estimate_intersection(&sparse).unwrap(), 0);

        dense.merge_filter(&sparse).unwrap();
        assert_eq!(dense.cardinality(), 27);
    }

    #[test]
    fn test_estimate_intersection_with_full_filter() {
        let shape = Shape::from_km(3, 24).unwrap();
        let mut full = SimpleBloomFilter::new(shape);
        full.merge_bit_maps(&BitMapArray::from(vec![(1 << 24) - 1])).unwrap();
        assert!(full.is_full());

        let mut partial = SimpleBloomFilter::new(shape);
        partial.merge_indices(&IndexArray::from(vec![1, 2, 3])).unwrap();
        let expected = estimate_to_count(shape.estimate_n(3)).unwrap();

        assert_eq!(full.estimate_n().unwrap(), i32::MAX as usize);
        assert_eq!(full.estimate_intersection(&partial).unwrap(), expected);
        assert_eq!(partial.estimate_intersection(&full).unwrap(), expected);
        assert_eq!(full.estimate_intersection(&full.clone()).unwrap(), i32::MAX as usize);
    }

    #[test]
    fn test_incompatible_filters() {
        let small = SimpleBloomFilter::new(Shape::from_km(3, 64).unwrap());
        let mut large = SimpleBloomFilter::new(Shape::from_km(3, 128).unwrap());
        assert!(matches!(
            large.merge_filter(&small),
            Err(BloomForgeError::IncompatibleFilters { .. })
        ));
        assert!(large.contains_filter(&small).is_err());
        assert!(large.estimate_union(&small).is_err());

        // same word count, different k
        let other_k = SimpleBloomFilter::new(Shape::from_km(5, 64).unwrap());
        let mut base = SimpleBloomFilter::new(Shape::from_km(3, 64).unwrap());
        assert!(base.merge_filter(&other_k).is_ok());
    }

    #[test]
    fn test_filter_array_pairs_pad_with_none() {
        let shape = Shape::from_km(3, 64).unwrap();
        let a = SimpleBloomFilter::new(shape);
        let b = SimpleBloomFilter::new(shape);
        let c = SimpleBloomFilter::new(shape);
        let left = BloomFilterArray::from_bloom_filter_array(vec![&a, &b, &c]);
        let right = BloomFilterArray::from_bloom_filter_array(vec![&a]);

        let mut shapes = Vec::new();
        assert!(left.process_bloom_filter_pair(&right, &mut |x, y| {
            shapes.push((x.is_some(), y.is_some()));
            true
        }));
        assert_eq!(shapes, vec![(true, true), (true, false), (true, false)]);
    }

    #[test]
    fn test_flatten_empty_is_error() {
        let empty = BloomFilterArray::from_bloom_filter_array(Vec::new());
        assert!(empty.flatten().is_err());
    }
}
