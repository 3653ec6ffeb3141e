//! Bloom filter implementations.
//!
//! # Available Filters
//!
//! - [`SimpleBloomFilter`] - Dense filter over `ceil(m / 64)` words
//! - [`SparseBloomFilter`] - Ordered set of enabled indices
//! - [`SparseCountingBloomFilter`] - Per-bit counts, supports removal
//! - [`LayeredBloomFilter`] - Policy-driven chain of filters for sliding windows
//!
//! # Choosing a Filter
//!
//! | Filter | Use Case | Memory | Operations |
//! |--------|----------|--------|------------|
//! | [`SimpleBloomFilter`] | Most filters, many enabled bits | m bits | Merge, Contains |
//! | [`SparseBloomFilter`] | Few enabled bits (see [`Shape::is_sparse`](crate::core::Shape::is_sparse)) | ~32 bits per enabled bit | Merge, Contains |
//! | [`SparseCountingBloomFilter`] | Need deletion | ~64 bits per enabled bit | Merge, Remove, Contains |
//! | [`LayeredBloomFilter`] | Expiring data | one filter per layer | Merge, Contains, Find |
//!
//! # Examples
//!
//! ## Dense and Sparse Filters
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1_000, 0.01).unwrap();
//! let hasher = EnhancedDoubleHasher::from_data(b"hello");
//!
//! let mut dense = SimpleBloomFilter::new(shape);
//! let mut sparse = SparseBloomFilter::new(shape);
//! dense.merge_hasher(&hasher).unwrap();
//! sparse.merge_hasher(&hasher).unwrap();
//!
//! assert_eq!(dense.as_bit_map_array(), sparse.as_bit_map_array());
//! assert!(dense.contains_filter(&sparse).unwrap());
//! ```
//!
//! ## Counting Filter (with removal)
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1_000, 0.01).unwrap();
//! let mut filter = SparseCountingBloomFilter::new(shape);
//! let temporary = EnhancedDoubleHasher::from_data(b"temporary");
//!
//! filter.merge_hasher(&temporary).unwrap();
//! assert!(filter.contains_hasher(&temporary).unwrap());
//!
//! filter.remove_hasher(&temporary).unwrap();
//! assert!(!filter.contains_hasher(&temporary).unwrap());
//! ```
//!
//! ## Layered Filter (sliding window)
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1_000, 0.01).unwrap();
//! let manager = LayerManager::builder()
//!     .supplier(move || SimpleBloomFilter::new(shape))
//!     .extend_check(ExtendCheck::advance_on_count(1_000).unwrap())
//!     .cleanup(Cleanup::on_max_size(5).unwrap())
//!     .build()
//!     .unwrap();
//! let mut filter = LayeredBloomFilter::new(shape, manager).unwrap();
//!
//! for i in 0..10_000u32 {
//!     filter.merge_hasher(&EnhancedDoubleHasher::from_data(&i.to_le_bytes())).unwrap();
//! }
//! assert_eq!(filter.depth(), 5);
//! ```

#![warn(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod counting;
pub use counting::SparseCountingBloomFilter;

pub mod layer_manager;
pub use layer_manager::{
    Cleanup, CleanupPolicy, ExtendCheck, ExtendPolicy, LayerManager, LayerSupplier,
};

pub mod layered;
pub use layered::LayeredBloomFilter;

pub mod simple;
pub use simple::SimpleBloomFilter;

pub mod sparse;
pub use sparse::SparseBloomFilter;
