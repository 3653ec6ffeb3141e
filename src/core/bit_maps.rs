//! Bit map words and the [`BitMapExtractor`] traversal.
//!
//! A bit map is a `u64` word: word `i` holds bits `[64·i, 64·i + 63]` with the
//! lowest bit index in the least significant bit. A filter of `m` bits is
//! represented by [`number_of_bit_maps(m)`](number_of_bit_maps) words, and
//! that word array is the crate's exchange format between filters.
//!
//! # Word Layout
//!
//! ```text
//! bit index:   127 ... 65 64 | 63 ... 1 0
//! word:        [     1      ] [    0     ]
//! ```
//!
//! # Examples
//!
//! ```
//! use bloomforge::core::bit_maps;
//!
//! let mut words = vec![0u64; bit_maps::number_of_bit_maps(130)];
//! bit_maps::set(&mut words, 128);
//! assert_eq!(words, vec![0, 0, 1]);
//! assert!(bit_maps::contains(&words, 128));
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::indices::IndexExtractor;
use crate::error::{BloomForgeError, Result};

/// Number of bits in one bit map word.
pub const BITS_PER_WORD: usize = 64;

/// Shift that divides a bit index by 64.
const DIVIDE_BY_64: u32 = 6;

/// Number of words needed to hold `number_of_bits` bits.
///
/// # Examples
///
/// ```
/// use bloomforge::core::bit_maps::number_of_bit_maps;
///
/// assert_eq!(number_of_bit_maps(1), 1);
/// assert_eq!(number_of_bit_maps(64), 1);
/// assert_eq!(number_of_bit_maps(65), 2);
/// ```
#[inline]
#[must_use]
pub fn number_of_bit_maps(number_of_bits: usize) -> usize {
    number_of_bits / BITS_PER_WORD + usize::from(number_of_bits % BITS_PER_WORD != 0)
}

/// Position of the word holding `bit_index`.
///
/// Negative indices map to negative word positions, so callers must range
/// check before using the result to address a slice.
#[inline]
#[must_use]
pub fn get_long_index(bit_index: i32) -> i32 {
    bit_index >> DIVIDE_BY_64
}

/// Mask selecting `bit_index` within its word.
#[inline]
#[must_use]
pub fn get_long_bit(bit_index: i32) -> u64 {
    1u64 << (bit_index & 0x3f)
}

/// Enable `bit_index` in `bit_maps`.
///
/// # Panics
///
/// Panics if `bit_index` is negative or addresses a word past the end of
/// `bit_maps`.
#[inline]
pub fn set(bit_maps: &mut [u64], bit_index: i32) {
    assert!(bit_index >= 0, "negative bit index {}", bit_index);
    bit_maps[get_long_index(bit_index) as usize] |= get_long_bit(bit_index);
}

/// Whether `bit_index` is enabled in `bit_maps`.
///
/// # Panics
///
/// Panics if `bit_index` is negative or addresses a word past the end of
/// `bit_maps`.
#[inline]
#[must_use]
pub fn contains(bit_maps: &[u64], bit_index: i32) -> bool {
    assert!(bit_index >= 0, "negative bit index {}", bit_index);
    (bit_maps[get_long_index(bit_index) as usize] & get_long_bit(bit_index)) != 0
}

/// Remainder of `dividend` interpreted as an unsigned 64-bit value, divided
/// by the positive `divisor`.
///
/// Halving the dividend before dividing keeps the quotient within the signed
/// range, so the result equals `(dividend as u64) % (divisor as u64)` for
/// every input.
///
/// # Panics
///
/// Panics (division by zero) if `divisor == 0`.
///
/// # Examples
///
/// ```
/// use bloomforge::core::bit_maps::mod_unsigned;
///
/// assert_eq!(mod_unsigned(-1, 13), (u64::MAX % 13) as i32);
/// assert_eq!(mod_unsigned(25, 13), 12);
/// ```
#[must_use]
pub fn mod_unsigned(dividend: i64, divisor: i32) -> i32 {
    let divisor = i64::from(divisor);
    let quotient = (((dividend as u64) >> 1) as i64 / divisor) << 1;
    let remainder = dividend.wrapping_sub(quotient.wrapping_mul(divisor));
    // remainder is in [0, 2·divisor)
    let remainder = if (remainder as u64) >= divisor as u64 {
        remainder.wrapping_sub(divisor)
    } else {
        remainder
    };
    remainder as i32
}

/// A lazy sequence of bit map words.
///
/// Implementors only provide [`process_bit_maps`](Self::process_bit_maps);
/// everything else is derived from it.
///
/// # Early Exit
///
/// The predicate returns `false` to stop the traversal. The traversal then
/// returns `false` immediately; a traversal that visits every word returns
/// `true`.
pub trait BitMapExtractor {
    /// Feed each word to `predicate` in order, stopping at the first `false`.
    fn process_bit_maps(&self, predicate: &mut dyn FnMut(u64) -> bool) -> bool;

    /// Collect every word into a vector.
    fn as_bit_map_array(&self) -> Vec<u64> {
        let mut words = Vec::new();
        self.process_bit_maps(&mut |word| {
            words.push(word);
            true
        });
        words
    }

    /// Traverse this extractor and `other` in lock step.
    ///
    /// `func` receives `(self_word, other_word)`. When one side is shorter it
    /// is padded with zero words, so every word of both sides is visited
    /// unless `func` stops the traversal.
    fn process_bit_map_pairs(
        &self,
        other: &dyn BitMapExtractor,
        func: &mut dyn FnMut(u64, u64) -> bool,
    ) -> bool {
        let words = self.as_bit_map_array();
        let mut position = 0;
        let completed = other.process_bit_maps(&mut |other_word| {
            let word = words.get(position).copied().unwrap_or(0);
            position += 1;
            func(word, other_word)
        });
        if !completed {
            return false;
        }
        words.iter().skip(position).all(|&word| func(word, 0))
    }
}

/// A [`BitMapExtractor`] over an owned word array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitMapArray {
    words: Vec<u64>,
}

impl BitMapArray {
    /// Wrap a copy of `words`.
    #[must_use]
    pub fn from_bit_map_array(words: &[u64]) -> Self {
        Self {
            words: words.to_vec(),
        }
    }

    /// Build the bit maps of `number_of_bits` bits with every index produced
    /// by `indices` enabled.
    ///
    /// The result always has [`number_of_bit_maps(number_of_bits)`](number_of_bit_maps)
    /// words. Duplicate indices are harmless.
    ///
    /// # Errors
    ///
    /// Returns [`BloomForgeError::IndexOutOfRange`] for the first index outside
    /// `[0, number_of_bits)`; the traversal stops there.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomforge::core::bit_maps::BitMapArray;
    /// use bloomforge::core::indices::IndexArray;
    ///
    /// let indices = IndexArray::from(vec![0, 65, 65, 1]);
    /// let bit_maps = BitMapArray::from_index_extractor(&indices, 72).unwrap();
    /// assert_eq!(bit_maps.words(), &[0b11u64, 0b10]);
    /// ```
    pub fn from_index_extractor(indices: &dyn IndexExtractor, number_of_bits: usize) -> Result<Self> {
        let mut words = vec![0u64; number_of_bit_maps(number_of_bits)];
        let mut failure = None;
        indices.process_indices(&mut |index| {
            if index < 0 || index as usize >= number_of_bits {
                failure = Some(BloomForgeError::index_out_of_range(index, number_of_bits));
                return false;
            }
            set(&mut words, index);
            true
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(Self { words }),
        }
    }

    /// The wrapped words.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Consume the wrapper and return its words.
    #[must_use]
    pub fn into_words(self) -> Vec<u64> {
        self.words
    }
}

impl From<Vec<u64>> for BitMapArray {
    fn from(words: Vec<u64>) -> Self {
        Self { words }
    }
}

impl BitMapExtractor for BitMapArray {
    fn process_bit_maps(&self, predicate: &mut dyn FnMut(u64) -> bool) -> bool {
        self.words.iter().all(|&word| predicate(word))
    }

    fn as_bit_map_array(&self) -> Vec<u64> {
        self.words.clone()
    }
}
