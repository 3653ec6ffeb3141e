//! Ordered layers of Bloom filters with pluggable growth and eviction.
//!
//! A [`LayerManager`] owns a deque of filters, oldest first. The newest layer
//! is the *target* that receives merges. Two policies decide the shape of the
//! deque over time:
//!
//! - an [`ExtendPolicy`] is consulted every time the target is requested and
//!   decides whether a fresh layer should be appended first
//! - a [`CleanupPolicy`] runs before every append and may evict layers
//!
//! Both are usually built from [`ExtendCheck`] and [`Cleanup`], but any
//! `FnMut` closure over the layer deque that is `Clone + Send` works as well.
//!
//! # Lifecycle
//!
//! ```text
//! target() ──► extend policy fires? ──no──► last layer
//!                    │ yes
//!                    ▼
//!              next(): cleanup policy ──► push supplier() ──► last layer
//! ```
//!
//! The manager always holds at least one layer. `next()` appends after the
//! cleanup policy has run, and an explicit `cleanup()` that evicts every
//! layer creates a new one from the supplier.
//!
//! # Examples
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_km(3, 64).unwrap();
//! let mut manager = LayerManager::builder()
//!     .supplier(move || SimpleBloomFilter::new(shape))
//!     .extend_check(ExtendCheck::advance_on_populated())
//!     .cleanup(Cleanup::on_max_size(2).unwrap())
//!     .build()
//!     .unwrap();
//!
//! for i in 0..5 {
//!     manager.target().merge_indices(&IndexArray::from(vec![i])).unwrap();
//! }
//! assert_eq!(manager.depth(), 2);
//! assert_eq!(manager.first().as_index_array(), vec![3]);
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use crate::builder::layer_manager::{Initial, LayerManagerBuilder};
use crate::builder::validation;
use crate::core::filter::{BloomFilter, BloomFilterExtractor};
use crate::error::{BloomForgeError, Result};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Produces the empty filter used for every new layer.
pub type LayerSupplier<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Decides whether the manager appends a new layer before handing out the
/// target.
///
/// Policies may keep state (see [`ExtendCheck::advance_on_count`]); the state
/// is copied when the manager is cloned.
pub trait ExtendPolicy<T>: Send {
    /// Whether a new layer should be appended to `layers`.
    fn should_advance(&mut self, layers: &VecDeque<T>) -> bool;

    /// A copy of this policy, including its state.
    fn clone_box(&self) -> Box<dyn ExtendPolicy<T>>;
}

impl<T, F> ExtendPolicy<T> for F
where
    F: FnMut(&VecDeque<T>) -> bool + Clone + Send + 'static,
{
    fn should_advance(&mut self, layers: &VecDeque<T>) -> bool {
        self(layers)
    }

    fn clone_box(&self) -> Box<dyn ExtendPolicy<T>> {
        Box::new(self.clone())
    }
}

/// Evicts layers before a new layer is appended, or on demand.
pub trait CleanupPolicy<T>: Send {
    /// Remove layers from `layers` as the policy requires.
    fn cleanup(&mut self, layers: &mut VecDeque<T>);

    /// A copy of this policy, including its state.
    fn clone_box(&self) -> Box<dyn CleanupPolicy<T>>;
}

impl<T, F> CleanupPolicy<T> for F
where
    F: FnMut(&mut VecDeque<T>) + Clone + Send + 'static,
{
    fn cleanup(&mut self, layers: &mut VecDeque<T>) {
        self(layers)
    }

    fn clone_box(&self) -> Box<dyn CleanupPolicy<T>> {
        Box::new(self.clone())
    }
}

/// Built-in [`ExtendPolicy`] constructors.
pub struct ExtendCheck;

impl ExtendCheck {
    /// Never append a layer on its own; only [`LayerManager::next`] does.
    #[must_use]
    pub fn never_advance() -> NeverAdvance {
        NeverAdvance
    }

    /// Append a layer as soon as the target holds any enabled bit.
    #[must_use]
    pub fn advance_on_populated() -> AdvanceOnPopulated {
        AdvanceOnPopulated
    }

    /// Append a layer on every `break_at`-th evaluation.
    ///
    /// With one merge per evaluation the target receives `break_at - 1`
    /// merges before the next merge lands in a new layer.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::InvalidParameters`] when `break_at` is zero.
    pub fn advance_on_count(break_at: usize) -> Result<AdvanceOnCount> {
        validation::validate_break_at(break_at)?;
        Ok(AdvanceOnCount { break_at, count: 0 })
    }

    /// Append a layer once the estimated number of items in the target
    /// reaches `max_n`.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::InvalidParameters`] unless `max_n` is positive.
    pub fn advance_on_saturation(max_n: f64) -> Result<AdvanceOnSaturation> {
        validation::validate_max_n(max_n)?;
        Ok(AdvanceOnSaturation { max_n })
    }
}

/// See [`ExtendCheck::never_advance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAdvance;

impl<T: BloomFilter> ExtendPolicy<T> for NeverAdvance {
    fn should_advance(&mut self, _layers: &VecDeque<T>) -> bool {
        false
    }

    fn clone_box(&self) -> Box<dyn ExtendPolicy<T>> {
        Box::new(*self)
    }
}

/// See [`ExtendCheck::advance_on_populated`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceOnPopulated;

impl<T: BloomFilter> ExtendPolicy<T> for AdvanceOnPopulated {
    fn should_advance(&mut self, layers: &VecDeque<T>) -> bool {
        layers.back().is_some_and(|target| !target.is_empty())
    }

    fn clone_box(&self) -> Box<dyn ExtendPolicy<T>> {
        Box::new(*self)
    }
}

/// See [`ExtendCheck::advance_on_count`].
#[derive(Debug, Clone, Copy)]
pub struct AdvanceOnCount {
    break_at: usize,
    count: usize,
}

impl<T: BloomFilter> ExtendPolicy<T> for AdvanceOnCount {
    fn should_advance(&mut self, _layers: &VecDeque<T>) -> bool {
        self.count += 1;
        if self.count == self.break_at {
            self.count = 0;
            true
        } else {
            false
        }
    }

    fn clone_box(&self) -> Box<dyn ExtendPolicy<T>> {
        Box::new(*self)
    }
}

/// See [`ExtendCheck::advance_on_saturation`].
#[derive(Debug, Clone, Copy)]
pub struct AdvanceOnSaturation {
    max_n: f64,
}

impl<T: BloomFilter> ExtendPolicy<T> for AdvanceOnSaturation {
    fn should_advance(&mut self, layers: &VecDeque<T>) -> bool {
        layers
            .back()
            .is_some_and(|target| target.shape().estimate_n(target.cardinality()) >= self.max_n)
    }

    fn clone_box(&self) -> Box<dyn ExtendPolicy<T>> {
        Box::new(*self)
    }
}

/// Built-in [`CleanupPolicy`] constructors.
pub struct Cleanup;

impl Cleanup {
    /// Keep every layer.
    #[must_use]
    pub fn no_cleanup() -> NoCleanup {
        NoCleanup
    }

    /// Evict the oldest layers until there is room for one more below
    /// `max_size`.
    ///
    /// Run by `next()` this keeps the depth at `max_size` or less. An explicit
    /// [`LayerManager::cleanup`] call leaves at most `max_size - 1` layers.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::InvalidParameters`] when `max_size` is zero.
    pub fn on_max_size(max_size: usize) -> Result<OnMaxSize> {
        validation::validate_max_size(max_size)?;
        Ok(OnMaxSize { max_size })
    }

    /// Evict the newest layer when it is empty and not the only layer.
    ///
    /// Run by `next()` this replaces an unused target instead of stacking a
    /// second empty layer on top of it. Layers in the middle of the deque are
    /// never touched.
    #[must_use]
    pub fn remove_empty_target() -> RemoveEmptyTarget {
        RemoveEmptyTarget
    }

    /// Evict every layer matching `predicate`.
    #[must_use]
    pub fn remove_if<P>(predicate: P) -> RemoveIf<P> {
        RemoveIf { predicate }
    }
}

/// See [`Cleanup::no_cleanup`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCleanup;

impl<T: BloomFilter> CleanupPolicy<T> for NoCleanup {
    fn cleanup(&mut self, _layers: &mut VecDeque<T>) {}

    fn clone_box(&self) -> Box<dyn CleanupPolicy<T>> {
        Box::new(*self)
    }
}

/// See [`Cleanup::on_max_size`].
#[derive(Debug, Clone, Copy)]
pub struct OnMaxSize {
    max_size: usize,
}

impl<T: BloomFilter> CleanupPolicy<T> for OnMaxSize {
    fn cleanup(&mut self, layers: &mut VecDeque<T>) {
        while layers.len() >= self.max_size {
            layers.pop_front();
        }
    }

    fn clone_box(&self) -> Box<dyn CleanupPolicy<T>> {
        Box::new(*self)
    }
}

/// See [`Cleanup::remove_empty_target`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveEmptyTarget;

impl<T: BloomFilter> CleanupPolicy<T> for RemoveEmptyTarget {
    fn cleanup(&mut self, layers: &mut VecDeque<T>) {
        if layers.len() > 1 && layers.back().is_some_and(|target| target.is_empty()) {
            layers.pop_back();
        }
    }

    fn clone_box(&self) -> Box<dyn CleanupPolicy<T>> {
        Box::new(*self)
    }
}

/// See [`Cleanup::remove_if`].
#[derive(Clone)]
pub struct RemoveIf<P> {
    predicate: P,
}

impl<T, P> CleanupPolicy<T> for RemoveIf<P>
where
    T: BloomFilter,
    P: Fn(&T) -> bool + Clone + Send + 'static,
{
    fn cleanup(&mut self, layers: &mut VecDeque<T>) {
        let predicate = &self.predicate;
        layers.retain(|layer| !predicate(layer));
    }

    fn clone_box(&self) -> Box<dyn CleanupPolicy<T>> {
        Box::new(self.clone())
    }
}

/// An ordered, policy-driven sequence of Bloom filter layers.
///
/// Built with [`LayerManager::builder`]. Cloning deep-copies every layer and
/// the policy state; the supplier is shared.
pub struct LayerManager<T: BloomFilter + Clone + 'static> {
    layers: VecDeque<T>,
    supplier: LayerSupplier<T>,
    extend_check: Box<dyn ExtendPolicy<T>>,
    cleanup: Box<dyn CleanupPolicy<T>>,
}

impl<T: BloomFilter + Clone + 'static> LayerManager<T> {
    /// Start building a manager.
    #[must_use]
    pub fn builder() -> LayerManagerBuilder<Initial, T> {
        LayerManagerBuilder::new()
    }

    /// Create a manager holding a single layer from `supplier`.
    pub(crate) fn from_parts(
        supplier: LayerSupplier<T>,
        extend_check: Box<dyn ExtendPolicy<T>>,
        cleanup: Box<dyn CleanupPolicy<T>>,
    ) -> Self {
        let mut manager = Self {
            layers: VecDeque::new(),
            supplier,
            extend_check,
            cleanup,
        };
        manager.push_layer();
        manager
    }

    fn push_layer(&mut self) {
        self.layers.push_back((self.supplier)());
    }

    /// Runs the cleanup policy. May leave the deque empty.
    fn evict(&mut self) {
        let before = self.layers.len();
        self.cleanup.cleanup(&mut self.layers);
        let evicted = before.saturating_sub(self.layers.len());
        if evicted > 0 {
            tracing::debug!(evicted, depth = self.layers.len(), "evicted layers");
        }
    }

    /// The layer that receives merges.
    ///
    /// Evaluates the extend policy first and appends a new layer when it
    /// fires, so the returned layer may be fresh.
    pub fn target(&mut self) -> &mut T {
        if self.extend_check.should_advance(&self.layers) {
            self.next();
        }
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// Run the cleanup policy, then append a new layer from the supplier.
    pub fn next(&mut self) {
        self.evict();
        self.push_layer();
        tracing::debug!(depth = self.layers.len(), "appended layer");
    }

    /// Run the cleanup policy without appending a layer.
    ///
    /// A new empty layer is created when the policy evicts every layer.
    pub fn cleanup(&mut self) {
        self.evict();
        if self.layers.is_empty() {
            self.push_layer();
        }
    }

    /// Drop every layer and start over with a single empty layer.
    ///
    /// Policy state, such as an [`ExtendCheck::advance_on_count`] counter, is
    /// kept.
    pub fn clear(&mut self) {
        let depth = self.layers.len();
        self.layers.clear();
        self.push_layer();
        tracing::debug!(dropped = depth, "cleared layers");
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// The layer at `depth`, `0` being the oldest.
    ///
    /// # Errors
    ///
    /// [`BloomForgeError::LayerOutOfRange`] when `depth >= self.depth()`.
    pub fn get(&self, depth: usize) -> Result<&T> {
        self.layers
            .get(depth)
            .ok_or_else(|| BloomForgeError::layer_out_of_range(depth, self.layers.len()))
    }

    /// The oldest layer.
    #[must_use]
    pub fn first(&self) -> &T {
        &self.layers[0]
    }

    /// The newest layer, without consulting the extend policy.
    #[must_use]
    pub fn last(&self) -> &T {
        &self.layers[self.layers.len() - 1]
    }

    /// Iterate the layers, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.layers.iter()
    }
}

impl<T: BloomFilter + Clone + 'static> Clone for LayerManager<T> {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
            supplier: Arc::clone(&self.supplier),
            extend_check: self.extend_check.clone_box(),
            cleanup: self.cleanup.clone_box(),
        }
    }
}

impl<T: BloomFilter + Clone + 'static> fmt::Debug for LayerManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerManager")
            .field("depth", &self.layers.len())
            .finish_non_exhaustive()
    }
}

impl<T: BloomFilter + Clone + 'static> BloomFilterExtractor for LayerManager<T> {
    fn process_bloom_filters<'a>(
        &'a self,
        predicate: &mut dyn FnMut(&'a dyn BloomFilter) -> bool,
    ) -> bool {
        self.layers.iter().all(|layer| predicate(layer))
    }
}
