//! XXH3 based seeding of double hashers.
//!
//! Filters never hash application data themselves: a [`Hasher`](crate::hash::Hasher)
//! only needs two 64-bit seeds. This module turns arbitrary bytes into those
//! seeds with the 128-bit variant of XXH3, taking the high half as `initial`
//! and the low half as `increment`.
//!
//! # Implementation Note
//!
//! This module wraps the `xxhash-rust` crate, which selects SIMD code paths
//! at runtime where available.
//!
//! # Examples
//!
//! ```
//! use bloomforge::core::{BloomFilter, Shape};
//! use bloomforge::filters::SimpleBloomFilter;
//! use bloomforge::hash::XxHasher;
//!
//! let shape = Shape::from_np(1000, 0.01).unwrap();
//! let mut filter = SimpleBloomFilter::new(shape);
//! let hasher = XxHasher::new();
//!
//! filter.merge_hasher(&hasher.hasher(b"alice")).unwrap();
//! assert!(filter.contains_hasher(&hasher.hasher(b"alice")).unwrap());
//! ```
//!
//! # References
//!
//! - XXHash Project: https://github.com/Cyan4973/xxHash

#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use crate::hash::strategies::EnhancedDoubleHasher;
use xxhash_rust::xxh3::{xxh3_128, xxh3_128_with_seed};

/// Derives [`EnhancedDoubleHasher`] seeds from bytes with XXH3-128.
///
/// Different seeds produce independent hashers for the same bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Create a hasher with seed `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Create a hasher with an explicit seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// The two 64-bit halves of the XXH3-128 digest of `bytes`, high half first.
    #[inline]
    #[must_use]
    pub fn hash_pair(&self, bytes: &[u8]) -> (u64, u64) {
        let digest = if self.seed == 0 {
            xxh3_128(bytes)
        } else {
            xxh3_128_with_seed(bytes, self.seed)
        };
        ((digest >> 64) as u64, digest as u64)
    }

    /// An [`EnhancedDoubleHasher`] seeded from the digest of `bytes`.
    #[must_use]
    pub fn hasher(&self, bytes: &[u8]) -> EnhancedDoubleHasher {
        let (initial, increment) = self.hash_pair(bytes);
        EnhancedDoubleHasher::new(initial as i64, increment as i64)
    }
}
