//! The [`Hasher`] trait and hasher combinators.
//!
//! A hasher is a value object that, for a given [`Shape`], produces the `k`
//! bit indices representing one item. Hashers are pure: the same hasher and
//! shape always yield the same sequence.
//!
//! # Duplicates
//!
//! Double hashing can revisit an index (for example when the increment is
//! zero modulo `m`). [`Hasher::indices`] reports every generated value;
//! [`Hasher::unique_indices`] drops repeats while keeping generation order.
//! Filters merge and test through `unique_indices`.
//!
//! # Examples
//!
//! ```
//! use bloomforge::core::{IndexExtractor, Shape};
//! use bloomforge::hash::{Hasher, SimpleHasher};
//!
//! let shape = Shape::from_km(5, 10).unwrap();
//! let hasher = SimpleHasher::new(3, 0);
//! assert_eq!(hasher.indices(&shape).as_index_array(), vec![3, 3, 3, 3, 3]);
//! assert_eq!(hasher.unique_indices(&shape).as_index_array(), vec![3]);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_sign_loss)]

use crate::core::bit_maps;
use crate::core::indices::IndexExtractor;
use crate::core::shape::Shape;

/// Produces the bit indices of one item for any [`Shape`].
///
/// Only [`indices`](Self::indices) must be implemented. Values are expected in
/// `[0, m)`; filters reject anything else.
pub trait Hasher {
    /// Every index generated for `shape`, in generation order, duplicates kept.
    fn indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a>;

    /// Indices generated for `shape` with repeats removed.
    ///
    /// The first occurrence of each index is kept, so the order is the
    /// generation order.
    fn unique_indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a> {
        Box::new(UniqueIndices {
            inner: self.indices(shape),
            expected: shape.number_of_hash_functions(),
            number_of_bits: shape.number_of_bits(),
        })
    }
}

/// Removes repeated indices from a hasher's output.
///
/// Indices outside `[0, m)` are not tracked and pass through untouched so the
/// consuming filter can report them.
struct UniqueIndices<'a> {
    inner: Box<dyn IndexExtractor + 'a>,
    /// Upper bound on the number of indices `inner` produces.
    expected: usize,
    number_of_bits: usize,
}

/// Indices already reported during one traversal.
///
/// A short list is scanned when few indices are expected relative to `m`;
/// otherwise a bit map of `m` bits is used.
enum Seen {
    List(Vec<i32>),
    Words(Vec<u64>),
}

impl Seen {
    fn new(expected: usize, number_of_bits: usize) -> Self {
        let words = bit_maps::number_of_bit_maps(number_of_bits);
        if expected <= words {
            Seen::List(Vec::with_capacity(expected))
        } else {
            Seen::Words(vec![0u64; words])
        }
    }

    /// Records `index`, returning `false` if it was already recorded.
    fn insert(&mut self, index: i32) -> bool {
        match self {
            Seen::List(list) => {
                if list.contains(&index) {
                    return false;
                }
                list.push(index);
                true
            }
            Seen::Words(words) => {
                if bit_maps::contains(words, index) {
                    return false;
                }
                bit_maps::set(words, index);
                true
            }
        }
    }
}

impl IndexExtractor for UniqueIndices<'_> {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        let mut seen = Seen::new(self.expected, self.number_of_bits);
        let number_of_bits = self.number_of_bits;
        self.inner.process_indices(&mut |index| {
            if index < 0 || index as usize >= number_of_bits {
                return predicate(index);
            }
            if !seen.insert(index) {
                return true;
            }
            predicate(index)
        })
    }
}

/// A hasher made of several hashers, representing several items at once.
///
/// # Examples
///
/// ```
/// use bloomforge::core::{IndexExtractor, Shape};
/// use bloomforge::hash::{Hasher, HasherCollection, SimpleHasher};
///
/// let shape = Shape::from_km(3, 72).unwrap();
/// let mut collection = HasherCollection::new();
/// collection.add(SimpleHasher::new(1, 1));
/// collection.add(SimpleHasher::new(2, 1));
///
/// assert_eq!(collection.indices(&shape).as_index_array(), vec![1, 2, 3, 2, 3, 4]);
/// assert_eq!(
///     collection.absolute_unique_indices(&shape).as_index_array(),
///     vec![1, 2, 3, 4]
/// );
/// ```
#[derive(Default)]
pub struct HasherCollection {
    hashers: Vec<Box<dyn Hasher>>,
}

impl HasherCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hasher` to the collection.
    pub fn add<H: Hasher + 'static>(&mut self, hasher: H) {
        self.hashers.push(Box::new(hasher));
    }

    /// Append an already boxed hasher.
    pub fn add_boxed(&mut self, hasher: Box<dyn Hasher>) {
        self.hashers.push(hasher);
    }

    /// Number of hashers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hashers.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashers.is_empty()
    }

    /// Indices of all member hashers with repeats removed across members.
    ///
    /// Order is the generation order of the first occurrence.
    #[must_use]
    pub fn absolute_unique_indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a> {
        Box::new(UniqueIndices {
            inner: self.indices(shape),
            expected: shape.number_of_hash_functions() * self.hashers.len(),
            number_of_bits: shape.number_of_bits(),
        })
    }
}

impl std::fmt::Debug for HasherCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HasherCollection")
            .field("hashers", &self.hashers.len())
            .finish()
    }
}

/// Concatenation of the member extractors.
struct Concatenated<'a> {
    parts: Vec<Box<dyn IndexExtractor + 'a>>,
}

impl IndexExtractor for Concatenated<'_> {
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        self.parts.iter().all(|part| part.process_indices(predicate))
    }
}

impl Hasher for HasherCollection {
    /// Every member's indices, member after member.
    fn indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a> {
        Box::new(Concatenated {
            parts: self.hashers.iter().map(|h| h.indices(shape)).collect(),
        })
    }

    /// Every member's unique indices, member after member.
    ///
    /// An index shared by two members appears twice, so counting filters
    /// count each member once.
    fn unique_indices<'a>(&'a self, shape: &Shape) -> Box<dyn IndexExtractor + 'a> {
        Box::new(Concatenated {
            parts: self
                .hashers
                .iter()
                .map(|h| h.unique_indices(shape))
                .collect(),
        })
    }
}
