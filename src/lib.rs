//! BloomForge: Bloom filters built from shapes, hashers and extractors.
//!
//! BloomForge separates *what* a filter stores from *how* items become bits.
//! A [`Shape`] fixes the number of hash functions `k` and bits `m`; a
//! [`Hasher`](hash::Hasher) turns one item into `k` indices for that shape; a
//! filter stores the enabled bits densely, sparsely or as counts. Filters,
//! hashers, index lists and word arrays can all be merged into and tested
//! against each other.
//!
//! # What are Bloom Filters?
//!
//! A Bloom filter is a space-efficient probabilistic data structure that tests whether
//! an element is a member of a set. It can produce:
//! - **False positives**: May indicate an element is in the set when it isn't
//! - **Zero false negatives**: If it says an element isn't in the set, it definitely isn't
//!
//! # Quick Start
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! // Create a filter for 10,000 items with 1% false positive rate
//! let shape = Shape::from_np(10_000, 0.01).unwrap();
//! let mut filter = SimpleBloomFilter::new(shape);
//!
//! // Items are hashed once into two seeds
//! filter.merge_hasher(&EnhancedDoubleHasher::from_data(b"hello")).unwrap();
//! filter.merge_hasher(&EnhancedDoubleHasher::from_data(b"world")).unwrap();
//!
//! assert!(filter.contains_hasher(&EnhancedDoubleHasher::from_data(b"hello")).unwrap());
//! assert_eq!(filter.estimate_n().unwrap(), 2);
//! ```
//!
//! # Filters
//!
//! | Filter | Storage | Removal | Notes |
//! |--------|---------|---------|-------|
//! | [`SimpleBloomFilter`] | `ceil(m / 64)` words | No | Default choice |
//! | [`SparseBloomFilter`] | Ordered index set | No | Few enabled bits |
//! | [`SparseCountingBloomFilter`] | Index to count map | Yes | Tracks validity |
//! | [`LayeredBloomFilter`] | Chain of filters | Via eviction | Sliding windows |
//!
//! # Using Builders
//!
//! ```
//! use bloomforge::builder::ShapeBuilder;
//!
//! let shape = ShapeBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//! assert_eq!(shape.number_of_bits(), 95_851);
//! ```
//!
//! # Layered Filters
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1_000, 0.01).unwrap();
//! let manager = LayerManager::builder()
//!     .supplier(move || SimpleBloomFilter::new(shape))
//!     .extend_check(ExtendCheck::advance_on_count(100).unwrap())
//!     .cleanup(Cleanup::on_max_size(3).unwrap())
//!     .build()
//!     .unwrap();
//! let mut recent = LayeredBloomFilter::new(shape, manager).unwrap();
//!
//! recent.merge_hasher(&EnhancedDoubleHasher::from_data(b"first")).unwrap();
//! assert_eq!(recent.find_hasher(&EnhancedDoubleHasher::from_data(b"first")).unwrap(), vec![0]);
//! ```
//!
//! # Optional Features
//!
//! - `serde` - `Serialize`/`Deserialize` for shapes, filters and hashers
//! - `trace` - per-operation `tracing` events on merge paths
//!
//! State transitions (new layers, evictions, counting filters turning
//! invalid) are always reported through `tracing`; install a subscriber to
//! see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::len_zero)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/bloomforge/0.1.0")]

/// Core data structures and traits
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations (variants)
pub mod filters;

/// Hashers and seeding
pub mod hash;

/// Type-safe builders
pub mod builder;

// Re-export commonly used types at crate root
pub use error::{BloomForgeError, Result};

// Re-export core types and traits
pub use crate::core::{
    BitMapArray, BitMapExtractor, BloomFilter, BloomFilterArray, BloomFilterExtractor,
    CellCounts, CellExtractor, CountingBloomFilter, IndexArray, IndexExtractor, Shape,
};

// Re-export all filter types at the crate root
pub use filters::{
    LayerManager, LayeredBloomFilter, SimpleBloomFilter, SparseBloomFilter,
    SparseCountingBloomFilter,
};

// Re-export builders at the crate root
pub use builder::{LayerManagerBuilder, ShapeBuilder};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use bloomforge::prelude::*;
///
/// let mut filter = SparseBloomFilter::new(Shape::from_km(3, 100).unwrap());
/// filter.merge_hasher(&SimpleHasher::new(1, 2)).unwrap();
/// assert_eq!(filter.as_index_array(), vec![1, 3, 5]);
/// ```
pub mod prelude {
    pub use crate::core::{
        BitMapArray, BitMapExtractor, BloomFilter, BloomFilterArray, BloomFilterExtractor,
        CellCounts, CellExtractor, CountingBloomFilter, IndexArray, IndexExtractor, Shape,
        SPARSE,
    };
    pub use crate::error::{BloomForgeError, Result};
    pub use crate::filters::{
        Cleanup, ExtendCheck, LayerManager, LayeredBloomFilter, SimpleBloomFilter,
        SparseBloomFilter, SparseCountingBloomFilter,
    };
    pub use crate::hash::{EnhancedDoubleHasher, Hasher, HasherCollection, SimpleHasher, XxHasher};

    // Re-export builders
    pub use crate::builder::{LayerManagerBuilder, ShapeBuilder};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let shape = Shape::from_np(100, 0.01).unwrap();
        let mut filter = SimpleBloomFilter::new(shape);
        filter.merge_hasher(&EnhancedDoubleHasher::from_data(b"test")).unwrap();
        assert!(filter.contains_hasher(&EnhancedDoubleHasher::from_data(b"test")).unwrap());
    }

    #[test]
    fn test_trait_usage() {
        fn merge_and_check<F: BloomFilter>(filter: &mut F) {
            let item = XxHasher::new().hasher(b"item");
            filter.merge_hasher(&item).unwrap();
            assert!(filter.contains_hasher(&item).unwrap());
        }

        let shape = Shape::from_np(100, 0.01).unwrap();
        merge_and_check(&mut SimpleBloomFilter::new(shape));
        merge_and_check(&mut SparseBloomFilter::new(shape));
        merge_and_check(&mut SparseCountingBloomFilter::new(shape));
        merge_and_check(&mut LayeredBloomFilter::fixed(shape, 2).unwrap());
    }

    #[test]
    fn test_builder() {
        let shape = ShapeBuilder::new()
            .expected_items(1000)
            .false_positive_rate(0.01)
            .build()
            .unwrap();
        assert!(SimpleBloomFilter::new(shape).is_empty());
    }

    #[test]
    fn test_hasher_collection_merges_all_items() {
        let shape = Shape::from_np(100, 0.01).unwrap();
        let mut items = HasherCollection::new();
        items.add(EnhancedDoubleHasher::from_data(b"a"));
        items.add(EnhancedDoubleHasher::from_data(b"b"));

        let mut filter = SimpleBloomFilter::new(shape);
        filter.merge_hasher(&items).unwrap();
        assert!(filter.contains_hasher(&EnhancedDoubleHasher::from_data(b"a")).unwrap());
        assert!(filter.contains_hasher(&EnhancedDoubleHasher::from_data(b"b")).unwrap());
        assert_eq!(filter.estimate_n().unwrap(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialization() {
        let shape = Shape::from_np(100, 0.01).unwrap();
        let mut filter = SparseBloomFilter::new(shape);
        filter.merge_hasher(&EnhancedDoubleHasher::from_data(b"serialize_me")).unwrap();

        let json = serde_json::to_string(&filter).unwrap();
        let restored: SparseBloomFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, filter);
        assert!(restored
            .contains_hasher(&EnhancedDoubleHasher::from_data(b"serialize_me"))
            .unwrap());
    }
}
