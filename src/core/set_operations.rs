//! Set operations on the bit maps of two filters.
//!
//! Every function accepts any pair of [`BitMapExtractor`]s (filters included)
//! and walks them once with [`BitMapExtractor::process_bit_map_pairs`]. The
//! shorter side is treated as zero-padded.
//!
//! # Examples
//!
//! ```
//! use bloomforge::core::bit_maps::BitMapArray;
//! use bloomforge::core::set_operations;
//!
//! let a = BitMapArray::from(vec![0b0111]);
//! let b = BitMapArray::from(vec![0b1100]);
//! assert_eq!(set_operations::and_cardinality(&a, &b), 1);
//! assert_eq!(set_operations::or_cardinality(&a, &b), 4);
//! assert_eq!(set_operations::hamming_distance(&a, &b), 3);
//! assert!((set_operations::jaccard_similarity(&a, &b) - 0.25).abs() < 1e-12);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

use crate::core::bit_maps::BitMapExtractor;

fn pair_cardinality(
    first: &dyn BitMapExtractor,
    second: &dyn BitMapExtractor,
    op: fn(u64, u64) -> u64,
) -> usize {
    let mut count = 0usize;
    first.process_bit_map_pairs(second, &mut |a, b| {
        count += op(a, b).count_ones() as usize;
        true
    });
    count
}

/// Number of enabled bits.
#[must_use]
pub fn cardinality(bit_maps: &dyn BitMapExtractor) -> usize {
    let mut count = 0usize;
    bit_maps.process_bit_maps(&mut |word| {
        count += word.count_ones() as usize;
        true
    });
    count
}

/// Number of bits enabled in both.
#[must_use]
pub fn and_cardinality(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> usize {
    pair_cardinality(first, second, |a, b| a & b)
}

/// Number of bits enabled in either.
#[must_use]
pub fn or_cardinality(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> usize {
    pair_cardinality(first, second, |a, b| a | b)
}

/// Number of bits enabled in exactly one.
#[must_use]
pub fn xor_cardinality(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> usize {
    pair_cardinality(first, second, |a, b| a ^ b)
}

/// Number of positions where the two differ; same as [`xor_cardinality`].
#[must_use]
pub fn hamming_distance(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> usize {
    xor_cardinality(first, second)
}

/// `|A ∩ B| / |A ∪ B|`, defined as 0 when the intersection is empty.
#[must_use]
pub fn jaccard_similarity(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> f64 {
    let mut intersection = 0usize;
    let mut union = 0usize;
    first.process_bit_map_pairs(second, &mut |a, b| {
        intersection += (a & b).count_ones() as usize;
        union += (a | b).count_ones() as usize;
        true
    });
    if intersection == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// `1 - jaccard_similarity`.
#[must_use]
pub fn jaccard_distance(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> f64 {
    1.0 - jaccard_similarity(first, second)
}

/// `|A ∩ B| / (√|A| · √|B|)`, defined as 0 when the intersection is empty.
#[must_use]
pub fn cosine_similarity(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> f64 {
    let numerator = and_cardinality(first, second);
    if numerator == 0 {
        return 0.0;
    }
    numerator as f64 / ((cardinality(first) as f64).sqrt() * (cardinality(second) as f64).sqrt())
}

/// `1 - cosine_similarity`.
#[must_use]
pub fn cosine_distance(first: &dyn BitMapExtractor, second: &dyn BitMapExtractor) -> f64 {
    1.0 - cosine_similarity(first, second)
}
