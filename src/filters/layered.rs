//! Layered Bloom filter.
//!
//! A [`LayeredBloomFilter`] presents the layers of a [`LayerManager`] as a
//! single filter. Merges always go to the manager's target, so growth and
//! eviction happen as a side effect of writing. Queries answer "does any
//! layer hold this", which is what a sliding window over time or volume
//! needs: once a layer is evicted, its items are forgotten.
//!
//! Bit map traversal, cardinality and the estimates work on the union of all
//! layers. Index traversal visits each layer in turn and may repeat indices.
//!
//! # Examples
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(100, 0.01).unwrap();
//! let mut filter = LayeredBloomFilter::fixed(shape, 3).unwrap();
//! for word in ["a", "b", "c", "d"] {
//!     filter.merge_hasher(&EnhancedDoubleHasher::from_data(word.as_bytes())).unwrap();
//! }
//!
//! // one item per layer, the oldest was evicted
//! assert_eq!(filter.depth(), 3);
//! assert!(filter.contains_hasher(&EnhancedDoubleHasher::from_data(b"d")).unwrap());
//! assert_eq!(filter.find_hasher(&EnhancedDoubleHasher::from_data(b"c")).unwrap(), vec![1]);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use crate::core::bit_maps::{BitMapArray, BitMapExtractor};
use crate::core::filter::{check_compatible, BloomFilter, BloomFilterExtractor};
use crate::core::indices::IndexExtractor;
use crate::core::shape::Shape;
use crate::error::{BloomForgeError, Result};
use crate::filters::layer_manager::{Cleanup, ExtendCheck, LayerManager};
use crate::filters::SimpleBloomFilter;
use crate::hash::Hasher;

/// A Bloom filter made of the layers of a [`LayerManager`].
///
/// Cloning deep-copies every layer.
#[derive(Debug, Clone)]
pub struct LayeredBloomFilter<T: BloomFilter + Clone + 'static> {
    shape: Shape,
    manager: LayerManager<T>,
}

impl<T: BloomFilter + Clone + 'static> LayeredBloomFilter<T> {
    /// Wrap `manager`, whose layers must have `shape`.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::IncompatibleFilters`] when the manager's layers use
    /// another shape.
    pub fn new(shape: Shape, manager: LayerManager<T>) -> Result<Self> {
        let layer_shape = manager.last().shape();
        if layer_shape != shape {
            return Err(BloomForgeError::incompatible_filters(format!(
                "layers have {}, expected {}",
                layer_shape, shape
            )));
        }
        Ok(Self { shape, manager })
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.manager.depth()
    }

    /// The layer at `depth`, `0` being the oldest.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::LayerOutOfRange`] when there is no such layer.
    pub fn get(&self, depth: usize) -> Result<&T> {
        self.manager.get(depth)
    }

    /// Force a new target layer.
    pub fn next(&mut self) {
        self.manager.next();
    }

    /// Run the manager's cleanup policy.
    pub fn cleanup(&mut self) {
        self.manager.cleanup();
    }

    /// The underlying manager.
    #[must_use]
    pub fn manager(&self) -> &LayerManager<T> {
        &self.manager
    }

    fn find(&self, mut test: impl FnMut(&T) -> Result<bool>) -> Result<Vec<usize>> {
        let mut found = Vec::new();
        for (depth, layer) in self.manager.iter().enumerate() {
            if test(layer)? {
                found.push(depth);
            }
        }
        Ok(found)
    }

    fn any_layer(&self, mut test: impl FnMut(&T) -> Result<bool>) -> Result<bool> {
        for layer in self.manager.iter() {
            if test(layer)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Positions of the layers containing every index of `indices`, ascending.
    pub fn find_indices(&self, indices: &dyn IndexExtractor) -> Result<Vec<usize>> {
        self.find(|layer| layer.contains_indices(indices))
    }

    /// Positions of the layers containing every bit of `bit_maps`, ascending.
    pub fn find_bit_maps(&self, bit_maps: &dyn BitMapExtractor) -> Result<Vec<usize>> {
        self.find(|layer| layer.contains_bit_maps(bit_maps))
    }

    /// Positions of the layers containing `filter`, ascending.
    pub fn find_filter(&self, filter: &dyn BloomFilter) -> Result<Vec<usize>> {
        self.find(|layer| layer.contains_filter(filter))
    }

    /// Positions of the layers containing the indices of `hasher`, ascending.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::IndexOutOfRange`] if the hasher misbehaves.
    pub fn find_hasher(&self, hasher: &dyn Hasher) -> Result<Vec<usize>> {
        let indices = hasher.unique_indices(&self.shape);
        self.find(|layer| layer.contains_indices(&*indices))
    }

    /// The OR of every layer's words, sized for this filter's shape.
    fn flattened_words(&self) -> Vec<u64> {
        let mut words = vec![0u64; self.shape.number_of_bit_maps()];
        for layer in self.manager.iter() {
            let mut position = 0;
            layer.process_bit_maps(&mut |word| {
                if let Some(slot) = words.get_mut(position) {
                    *slot |= word;
                }
                position += 1;
                true
            });
        }
        words
    }
}

impl LayeredBloomFilter<SimpleBloomFilter> {
    /// A filter holding at most `max_depth` dense layers with one merge each.
    ///
    /// Every merge into a populated target starts a new layer and the oldest
    /// layer is evicted beyond `max_depth`, so the filter remembers the last
    /// `max_depth` merges.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::InvalidParameters`] when `max_depth` is zero.
    pub fn fixed(shape: Shape, max_depth: usize) -> Result<Self> {
        let manager = LayerManager::builder()
            .supplier(move || SimpleBloomFilter::new(shape))
            .extend_check(ExtendCheck::advance_on_populated())
            .cleanup(Cleanup::on_max_size(max_depth)?)
            .build()?;
        Self::new(shape, manager)
    }
}

impl<T: BloomFilter + Clone + 'static> IndexExtractor for LayeredBloomFilter<T> {
    /// The indices of each layer in turn, oldest layer first.
    fn process_indices(&self, predicate: &mut dyn FnMut(i32) -> bool) -> bool {
        self.manager
            .iter()
            .all(|layer| layer.process_indices(predicate))
    }
}

impl<T: BloomFilter + Clone + 'static> BitMapExtractor for LayeredBloomFilter<T> {
    /// The words of the union of all layers.
    fn process_bit_maps(&self, predicate: &mut dyn FnMut(u64) -> bool) -> bool {
        self.flattened_words().into_iter().all(|word| predicate(word))
    }

    fn as_bit_map_array(&self) -> Vec<u64> {
        self.flattened_words()
    }
}

impl<T: BloomFilter + Clone + 'static> BloomFilter for LayeredBloomFilter<T> {
    fn characteristics(&self) -> u32 {
        0
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    /// Drop every layer and start over with one empty layer.
    fn clear(&mut self) {
        self.manager.clear();
    }

    /// Whether any single layer contains all of `indices`.
    fn contains_indices(&self, indices: &dyn IndexExtractor) -> Result<bool> {
        self.any_layer(|layer| layer.contains_indices(indices))
    }

    fn merge_indices(&mut self, indices: &dyn IndexExtractor) -> Result<bool> {
        #[cfg(feature = "trace")]
        tracing::trace!(depth = self.manager.depth(), "LayeredBloomFilter::merge_indices");
        self.manager.target().merge_indices(indices)
    }

    fn merge_bit_maps(&mut self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        #[cfg(feature = "trace")]
        tracing::trace!(depth = self.manager.depth(), "LayeredBloomFilter::merge_bit_maps");
        self.manager.target().merge_bit_maps(bit_maps)
    }

    fn merge_filter(&mut self, other: &dyn BloomFilter) -> Result<bool> {
        check_compatible(&self.shape, other)?;
        self.manager.target().merge_filter(other)
    }

    fn merge_hasher(&mut self, hasher: &dyn Hasher) -> Result<bool> {
        self.manager.target().merge_hasher(hasher)
    }

    fn is_empty(&self) -> bool {
        self.manager.iter().all(|layer| layer.is_empty())
    }

    /// Whether any single layer contains all of `bit_maps`.
    fn contains_bit_maps(&self, bit_maps: &dyn BitMapExtractor) -> Result<bool> {
        self.any_layer(|layer| layer.contains_bit_maps(bit_maps))
    }

    /// Whether `other` is held by this filter.
    ///
    /// A plain filter must be contained by a single layer. A layered filter is
    /// contained when each of its layers is contained by some layer here.
    fn contains_filter(&self, other: &dyn BloomFilter) -> Result<bool> {
        check_compatible(&self.shape, other)?;
        let Some(layers) = other.as_bloom_filter_extractor() else {
            return self.any_layer(|layer| layer.contains_filter(other));
        };
        let mut failure = None;
        let contained = layers.process_bloom_filters(&mut |theirs| {
            match self.any_layer(|layer| layer.contains_filter(theirs)) {
                Ok(found) => found,
                Err(err) => {
                    failure = Some(err);
                    false
                }
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(contained),
        }
    }

    fn as_bloom_filter_extractor(&self) -> Option<&dyn BloomFilterExtractor> {
        Some(self)
    }
}

impl<T: BloomFilter + Clone + 'static> BloomFilterExtractor for LayeredBloomFilter<T> {
    fn process_bloom_filters<'a>(
        &'a self,
        predicate: &mut dyn FnMut(&'a dyn BloomFilter) -> bool,
    ) -> bool {
        self.manager.process_bloom_filters(predicate)
    }

    fn flatten(&self) -> Result<SimpleBloomFilter> {
        let mut result = SimpleBloomFilter::new(self.shape);
        result.merge_bit_maps(&BitMapArray::from(self.flattened_words()))?;
        Ok(result)
    }
}
