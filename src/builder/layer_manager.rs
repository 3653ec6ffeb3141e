//! Builder for layer managers.
//!
//! # Type-State Pattern
//!
//! The layer supplier is the only required parameter:
//!
//! ```text
//! Initial → WithSupplier → LayerManager
//!     ↓           ↓
//!  .supplier()  .build()
//! ```
//!
//! The extend check defaults to [`ExtendCheck::never_advance`] and the
//! cleanup to [`Cleanup::no_cleanup`]; both can be set in any state.
//!
//! # Examples
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1000, 0.01).unwrap();
//! let manager = LayerManager::builder()
//!     .supplier(move || SparseBloomFilter::new(shape))
//!     .extend_check(ExtendCheck::advance_on_count(100).unwrap())
//!     .cleanup(Cleanup::on_max_size(10).unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(manager.depth(), 1);
//! ```

use super::validation;
use crate::core::filter::BloomFilter;
use crate::error::{BloomForgeError, Result};
use crate::filters::layer_manager::{
    Cleanup, CleanupPolicy, ExtendCheck, ExtendPolicy, LayerManager, LayerSupplier,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-state marker: no supplier yet.
pub struct Initial;

/// Type-state marker: supplier set, ready to build.
pub struct WithSupplier;

/// Builder for [`LayerManager`] with type-state guarantees.
///
/// # Type Parameters
///
/// - `State`: Current builder state (Initial, WithSupplier)
/// - `T`: Layer filter type
pub struct LayerManagerBuilder<State, T: BloomFilter + Clone + 'static> {
    supplier: Option<LayerSupplier<T>>,
    extend_check: Box<dyn ExtendPolicy<T>>,
    cleanup: Box<dyn CleanupPolicy<T>>,
    _state: PhantomData<State>,
}

impl<T: BloomFilter + Clone + 'static> LayerManagerBuilder<Initial, T> {
    /// Create a builder with the default policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supplier: None,
            extend_check: Box::new(ExtendCheck::never_advance()),
            cleanup: Box::new(Cleanup::no_cleanup()),
            _state: PhantomData,
        }
    }

    /// Set the factory for new layers. Transitions to `WithSupplier`.
    ///
    /// Every call must return an empty filter of the same shape.
    #[must_use]
    pub fn supplier<F>(self, supplier: F) -> LayerManagerBuilder<WithSupplier, T>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        LayerManagerBuilder {
            supplier: Some(Arc::new(supplier)),
            extend_check: self.extend_check,
            cleanup: self.cleanup,
            _state: PhantomData,
        }
    }
}

impl<T: BloomFilter + Clone + 'static> Default for LayerManagerBuilder<Initial, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, T: BloomFilter + Clone + 'static> LayerManagerBuilder<State, T> {
    /// Set the policy deciding when a new layer is appended.
    #[must_use]
    pub fn extend_check(mut self, policy: impl ExtendPolicy<T> + 'static) -> Self {
        self.extend_check = Box::new(policy);
        self
    }

    /// Set the policy deciding which layers are evicted.
    #[must_use]
    pub fn cleanup(mut self, policy: impl CleanupPolicy<T> + 'static) -> Self {
        self.cleanup = Box::new(policy);
        self
    }
}

impl<T: BloomFilter + Clone + 'static> LayerManagerBuilder<WithSupplier, T> {
    /// Build the manager, seeded with one layer from the supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier produces a non-empty filter.
    pub fn build(self) -> Result<LayerManager<T>> {
        let supplier = self
            .supplier
            .ok_or_else(|| BloomForgeError::invalid_parameters("layer supplier is required"))?;
        validation::validate_empty_layer(&supplier())?;
        Ok(LayerManager::from_parts(supplier, self.extend_check, self.cleanup))
    }
}
