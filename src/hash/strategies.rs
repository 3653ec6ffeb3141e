//! Double hashing strategies.
//!
//! Both hashers derive `k` indices from two 64-bit seeds, the `initial` value
//! and the `increment`, instead of running `k` independent hash functions.
//!
//! # Strategy Comparison
//!
//! | Strategy               | Formula (mod m)                      | Use Case                 |
//! |------------------------|--------------------------------------|--------------------------|
//! | [`SimpleHasher`]       | `h₁ + i·h₂`                          | Tests, predictable output|
//! | [`EnhancedDoubleHasher`] | `h₁ - i·h₂ - (i³ - i)/6`           | General purpose (default)|
//!
//! Seeds are reduced with [`mod_unsigned`], so they are treated as unsigned
//! 64-bit values: negative seeds are valid.
//!
//! # References
//!
//! - Kirsch, A., & Mitzenmacher, M. (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"
//! - Dillinger, P. C., & Manolios, P. (2004). "Bloom Filters in Probabilistic Verification"

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use crate::core::bit_maps::mod_unsigned;
use crate::core::indices::IndexExtractor;
use crate::core::shape::Shape;
use crate::error::{BloomForgeError, Result};
use crate::hash::hasher::Hasher;
use crate::hash::xxhash::XxHasher;

/// Plain double hashing: `index(i) = (initial + i·increment) mod m`.
///
/// An increment of zero modulo `m` yields the same index `k` times.
///
/// # Examples
///
/// ```
/// use bloomforge::core::{IndexExtractor, Shape};
/// use bloomforge::hash::{Hasher, SimpleHasher};
///
/// let shape = Shape::from_km(4, 10).unwrap();
/// let hasher = SimpleHasher::new(8, 3);
/// assert_eq!(hasher.indices(&shape).as_index_array(), vec![8, 1, 4, 7]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleHasher {
    initial: i64,
    increment: i64,
}

impl SimpleHasher {
    /// Create a hasher from its two seeds.
    #[must_use]
    pub const fn new(initial: i64, increment: i64) -> Self {
        Self { initial, increment }
    }
}

struct SimpleIndices {
    initial: i64,
    increment: i64,
    shape: Shape,
}

impl IndexExtractor for SimpleIndices {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        let bits = self.shape.number_of_bits() as i32;
        let mut index = mod_unsigned(self.initial, bits);
        let increment = mod_unsigned(self.increment, bits);
        for _ in 0..self.shape.number_of_hash_functions() {
            if !predicate(index) {
                return false;
            }
            // index + increment may not fit in an i32
            index = if index >= bits - increment {
                index - (bits - increment)
            } else {
                index + increment
            };
        }
        true
    }
}

impl Hasher for SimpleHasher {
    fn indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a> {
        Box::new(SimpleIndices {
            initial: self.initial,
            increment: self.increment,
            shape: *shape,
        })
    }
}

/// Enhanced double hashing with a tetrahedral correction term.
///
/// ```text
/// index(i) = (initial - i·increment - (i³ - i)/6) mod m
/// ```
///
/// Computed incrementally with two modulus operations up front and sign
/// checks afterwards, so every intermediate value stays in `[0, m)`.
///
/// # Examples
///
/// ```
/// use bloomforge::core::{IndexExtractor, Shape};
/// use bloomforge::hash::{EnhancedDoubleHasher, Hasher};
///
/// let shape = Shape::from_km(5, 72).unwrap();
/// let hasher = EnhancedDoubleHasher::new(1, 1);
/// assert_eq!(hasher.indices(&shape).as_index_array(), vec![1, 0, 71, 71, 1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnhancedDoubleHasher {
    initial: i64,
    increment: i64,
}

impl EnhancedDoubleHasher {
    /// Create a hasher from its two seeds.
    #[must_use]
    pub const fn new(initial: i64, increment: i64) -> Self {
        Self { initial, increment }
    }

    /// Create a hasher from a digest.
    ///
    /// The first half of `buffer` becomes `initial` and the second half
    /// `increment`. Each half is read big-endian, using at most its first 8
    /// bytes; a half shorter than 8 bytes is padded with zeros on the right.
    /// For an odd length the extra byte belongs to the second half.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::InvalidParameters`] if `buffer` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomforge::hash::EnhancedDoubleHasher;
    ///
    /// let hasher = EnhancedDoubleHasher::from_bytes(&[1, 2]).unwrap();
    /// assert_eq!(hasher.initial(), 1 << 56);
    /// assert_eq!(hasher.increment(), 2 << 56);
    /// ```
    pub fn from_bytes(buffer: &[u8]) -> Result<Self> {
        if buffer.is_empty() {
            return Err(BloomForgeError::invalid_parameters(
                "buffer length must be greater than 0",
            ));
        }
        let segment = buffer.len() / 2;
        let (first, second) = buffer.split_at(segment);
        Ok(Self {
            initial: read_seed(first),
            increment: read_seed(second),
        })
    }

    /// Hash arbitrary data with XXH3-128 and use the digest halves as seeds.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomforge::hash::EnhancedDoubleHasher;
    ///
    /// let a = EnhancedDoubleHasher::from_data(b"hello");
    /// let b = EnhancedDoubleHasher::from_data(b"hello");
    /// assert_eq!(a, b);
    /// assert_ne!(a, EnhancedDoubleHasher::from_data(b"world"));
    /// ```
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        XxHasher::new().hasher(data)
    }

    /// The initial seed.
    #[inline]
    #[must_use]
    pub fn initial(&self) -> i64 {
        self.initial
    }

    /// The increment seed.
    #[inline]
    #[must_use]
    pub fn increment(&self) -> i64 {
        self.increment
    }
}

/// Read up to 8 bytes big-endian, left aligned in the 64-bit result.
fn read_seed(bytes: &[u8]) -> i64 {
    let mut word = [0u8; 8];
    let len = bytes.len().min(8);
    word[..len].copy_from_slice(&bytes[..len]);
    i64::from_be_bytes(word)
}

struct EnhancedIndices {
    initial: i64,
    increment: i64,
    shape: Shape,
}

impl IndexExtractor for EnhancedIndices {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        let bits = self.shape.number_of_bits() as i32;
        let mut index = mod_unsigned(self.initial, bits);
        let mut increment = mod_unsigned(self.increment, bits);
        // tetrahedral term, kept in [0, bits)
        let mut tetrahedral = 0i32;
        for _ in 0..self.shape.number_of_hash_functions() {
            if !predicate(index) {
                return false;
            }
            index -= increment;
            if index < 0 {
                index += bits;
            }
            increment -= tetrahedral;
            if increment < 0 {
                increment += bits;
            }
            tetrahedral += 1;
            if tetrahedral == bits {
                tetrahedral = 0;
            }
        }
        true
    }
}

impl Hasher for EnhancedDoubleHasher {
    fn indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a> {
        Box::new(EnhancedIndices {
            initial: self.initial,
            increment: self.increment,
            shape: *shape,
        })
    }
}
