//! Builder pattern for shapes and layer managers.
//!
//! This module provides fluent, type-safe builders with compile-time
//! guarantees that required parameters are provided.
//!
//! # Design Philosophy
//!
//! ## Type-State Pattern
//!
//! Builders use the type-state pattern to enforce parameter requirements at
//! compile time. Each builder progresses through states, with methods only
//! available in appropriate states.
//!
//! ## Error Handling
//!
//! - **Compile-time errors**: Missing required parameters
//! - **Runtime errors**: Invalid parameter values (out of range)
//!
//! # Examples
//!
//! ## Shape Builder
//!
//! ```
//! use bloomforge::builder::ShapeBuilder;
//!
//! let shape = ShapeBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//! assert_eq!(shape.number_of_hash_functions(), 7);
//! ```
//!
//! ## Layer Manager Builder
//!
//! ```
//! use bloomforge::prelude::*;
//!
//! let shape = Shape::from_np(1_000, 0.01).unwrap();
//! let manager = LayerManager::builder()
//!     .supplier(move || SimpleBloomFilter::new(shape))
//!     .extend_check(ExtendCheck::advance_on_saturation(1_000.0).unwrap())
//!     .cleanup(Cleanup::on_max_size(24).unwrap())  // Optional
//!     .build()
//!     .unwrap();
//! let filter = LayeredBloomFilter::new(shape, manager).unwrap();
//! assert!(filter.is_empty());
//! ```
//!
//! # Builder Comparison
//!
//! | Builder | Required Parameters | Key Optional Parameters |
//! |---------|---------------------|-------------------------|
//! | Shape | items, fp_rate or bits | hash_functions (with bits) |
//! | LayerManager | supplier | extend_check, cleanup |

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod layer_manager;
pub mod shape;

pub use layer_manager::LayerManagerBuilder;
pub use shape::ShapeBuilder;

use crate::error::{BloomForgeError, Result};

/// Common validation functions for all builders and policies.
pub(crate) mod validation {
    use super::*;
    use crate::core::filter::BloomFilter;

    /// Validate expected items count.
    ///
    /// # Errors
    ///
    /// Returns error if `items == 0`.
    #[inline]
    pub fn validate_items(items: usize) -> Result<()> {
        if items == 0 {
            return Err(BloomForgeError::invalid_item_count(items));
        }
        Ok(())
    }

    /// Validate false positive rate.
    ///
    /// # Errors
    ///
    /// Returns error if `fp_rate` is not in (0, 1).
    #[inline]
    pub fn validate_fp_rate(fp_rate: f64) -> Result<()> {
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(BloomForgeError::probability_out_of_bounds(fp_rate));
        }
        Ok(())
    }

    /// Validate the evaluation count of a counting extend check.
    ///
    /// # Errors
    ///
    /// Returns error if `break_at == 0`.
    #[inline]
    pub fn validate_break_at(break_at: usize) -> Result<()> {
        if break_at == 0 {
            return Err(BloomForgeError::invalid_parameters(
                "break_at must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate the saturation threshold of an extend check.
    ///
    /// # Errors
    ///
    /// Returns error unless `max_n` is a positive number.
    #[inline]
    pub fn validate_max_n(max_n: f64) -> Result<()> {
        if !(max_n > 0.0) {
            return Err(BloomForgeError::invalid_parameters(format!(
                "max_n must be greater than 0, got {}",
                max_n
            )));
        }
        Ok(())
    }

    /// Validate the layer limit of a cleanup policy.
    ///
    /// # Errors
    ///
    /// Returns error if `max_size == 0`.
    #[inline]
    pub fn validate_max_size(max_size: usize) -> Result<()> {
        if max_size == 0 {
            return Err(BloomForgeError::invalid_parameters(
                "max_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate that a supplier hands out empty layers.
    ///
    /// # Errors
    ///
    /// Returns error if `layer` has any enabled bit.
    #[inline]
    pub fn validate_empty_layer(layer: &dyn BloomFilter) -> Result<()> {
        if !layer.is_empty() {
            return Err(BloomForgeError::invalid_parameters(
                "layer supplier must produce empty filters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Prelude for convenient builder imports.
pub mod prelude {
    pub use super::{LayerManagerBuilder, ShapeBuilder};
}
