//! The [`IndexExtractor`] traversal over enabled bit indices.
//!
//! Index extractors are the common currency of the crate: hashers turn data
//! into indices, filters expose their enabled bits as indices, and every merge
//! or containment test can consume them.
//!
//! Whether an extractor yields duplicates, and in which order, is documented by
//! each implementation. [`IndexExtractor::unique_indices`] gives a sorted,
//! duplicate-free view of any extractor.
//!
//! # Examples
//!
//! ```
//! use bloomforge::core::bit_maps::BitMapArray;
//! use bloomforge::core::indices::{self, IndexArray, IndexExtractor};
//!
//! let bit_maps = BitMapArray::from(vec![0b1010, 1]);
//! let indices = indices::from_bit_map_extractor(&bit_maps);
//! assert_eq!(indices.as_index_array(), vec![1, 3, 64]);
//!
//! let duplicated = IndexArray::from(vec![9, 3, 9]);
//! assert_eq!(duplicated.unique_indices().as_index_array(), vec![3, 9]);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use crate::core::bit_maps::BitMapExtractor;
use std::collections::BTreeSet;

/// A lazy sequence of bit indices.
///
/// # Early Exit
///
/// The predicate returns `false` to stop the traversal. The traversal then
/// returns `false` immediately; a traversal that visits every index returns
/// `true`.
pub trait IndexExtractor {
    /// Feed each index to `predicate`, stopping at the first `false`.
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool;

    /// Collect every index, in traversal order and with duplicates.
    fn as_index_array(&self) -> Vec<i32> {
        let mut result = Vec::new();
        self.process_indices(&mut |index| {
            result.push(index);
            true
        });
        result
    }

    /// Sorted, duplicate-free copy of the indices.
    fn unique_indices(&self) -> IndexArray {
        let mut seen = BTreeSet::new();
        self.process_indices(&mut |index| {
            seen.insert(index);
            true
        });
        IndexArray {
            indices: seen.into_iter().collect(),
        }
    }
}

/// An [`IndexExtractor`] over an owned array, yielding values exactly as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexArray {
    indices: Vec<i32>,
}

impl IndexArray {
    /// Wrap a copy of `indices`.
    #[must_use]
    pub fn from_index_array(indices: &[i32]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }

    /// Number of stored indices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no index is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl From<Vec<i32>> for IndexArray {
    fn from(indices: Vec<i32>) -> Self {
        Self { indices }
    }
}

impl IndexExtractor for IndexArray {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        self.indices.iter().all(|&index| predicate(index))
    }

    fn as_index_array(&self) -> Vec<i32> {
        self.indices.clone()
    }
}

/// Indices of the enabled bits of a [`BitMapExtractor`].
///
/// Yields ascending, distinct values: word by word, least significant bit
/// first. Created by [`from_bit_map_extractor`].
pub struct BitMapIndices<'a> {
    bit_maps: &'a dyn BitMapExtractor,
}

/// View the enabled bits of `bit_maps` as indices.
#[must_use]
pub fn from_bit_map_extractor(bit_maps: &dyn BitMapExtractor) -> BitMapIndices<'_> {
    BitMapIndices { bit_maps }
}

impl IndexExtractor for BitMapIndices<'_> {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        let mut offset: i64 = 0;
        self.bit_maps.process_bit_maps(&mut |word| {
            let mut remaining = word;
            while remaining != 0 {
                let bit = i64::from(remaining.trailing_zeros());
                if !predicate((offset + bit) as i32) {
                    return false;
                }
                remaining &= remaining - 1;
            }
            offset += 64;
            true
        })
    }

    fn unique_indices(&self) -> IndexArray {
        IndexArray::from(self.as_index_array())
    }
}
