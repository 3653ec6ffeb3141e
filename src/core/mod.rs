//! Core types, traits, and utilities for bloomforge.
//!
//! This module contains the building blocks every filter is made of:
//!
//! - **Configuration**: [`Shape`] (number of hash functions and bits)
//! - **Traversals**: [`IndexExtractor`], [`BitMapExtractor`], [`CellExtractor`]
//! - **Traits**: [`BloomFilter`], [`CountingBloomFilter`], [`BloomFilterExtractor`]
//! - **Utilities**: word-level helpers in [`bit_maps`], similarity measures in
//!   [`set_operations`]
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── shape.rs          - Shape and the probability formulas
//! ├── bit_maps.rs       - Word helpers, BitMapExtractor, BitMapArray
//! ├── indices.rs        - IndexExtractor, IndexArray, bit map to index view
//! ├── cells.rs          - CellExtractor, CellCounts
//! ├── filter.rs         - BloomFilter, CountingBloomFilter, BloomFilterExtractor
//! ├── set_operations.rs - Cardinalities, Hamming, Jaccard, cosine
//! └── mod.rs            - This file (public API)
//! ```
//!
//! # Converting Between Representations
//!
//! ```
//! use bloomforge::core::{indices, BitMapArray, BitMapExtractor, IndexArray, IndexExtractor};
//!
//! let original = IndexArray::from(vec![65, 1, 1]);
//! let bit_maps = BitMapArray::from_index_extractor(&original, 128).unwrap();
//! assert_eq!(bit_maps.as_bit_map_array(), vec![0b10, 0b10]);
//!
//! let back = indices::from_bit_map_extractor(&bit_maps);
//! assert_eq!(back.as_index_array(), vec![1, 65]);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bit_maps;
pub mod cells;
pub mod filter;
pub mod indices;
pub mod set_operations;
pub mod shape;

pub use bit_maps::{BitMapArray, BitMapExtractor};
pub use cells::{CellCounts, CellExtractor};
pub use filter::{BloomFilter, BloomFilterArray, BloomFilterExtractor, CountingBloomFilter, SPARSE};
pub use indices::{IndexArray, IndexExtractor};
pub use shape::Shape;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_reexports() {
        let shape = Shape::from_km(3, 100).unwrap();
        assert_eq!(shape.number_of_bit_maps(), 2);

        let indices = IndexArray::from(vec![99]);
        let bit_maps = BitMapArray::from_index_extractor(&indices, shape.number_of_bits()).unwrap();
        assert_eq!(bit_maps.as_bit_map_array(), vec![0, 1u64 << 35]);
    }

    #[test]
    fn test_bit_map_and_index_views_agree() {
        let bit_maps = BitMapArray::from(vec![u64::MAX, 0b101]);
        let view = indices::from_bit_map_extractor(&bit_maps);
        let expected: Vec<i32> = (0..64).chain([64, 66]).collect();
        assert_eq!(view.as_index_array(), expected);
        assert_eq!(set_operations::cardinality(&bit_maps), 66);
    }
}
