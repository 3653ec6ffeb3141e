//! Builder for filter shapes.
//!
//! # Type-State Pattern
//!
//! The number of items is always required. It is followed by either the
//! target false positive rate or the number of bits:
//!
//! ```text
//! Initial → WithItems ─┬─ .false_positive_rate() → WithProbability → Shape
//!                      └─ .number_of_bits()      → WithBits        → Shape
//!                                                  (.hash_functions() optional)
//! ```
//!
//! # Examples
//!
//! ```
//! use bloomforge::builder::ShapeBuilder;
//!
//! let by_rate = ShapeBuilder::new()
//!     .expected_items(5000)
//!     .false_positive_rate(1.0 / 100_000.0)
//!     .build()
//!     .unwrap();
//! assert_eq!(by_rate.number_of_bits(), 119_814);
//!
//! let by_size = ShapeBuilder::new()
//!     .expected_items(5000)
//!     .number_of_bits(119_814)
//!     .hash_functions(17)
//!     .build()
//!     .unwrap();
//! assert_eq!(by_rate, by_size);
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use bloomforge::builder::ShapeBuilder;
//!
//! let result = ShapeBuilder::new()
//!     .expected_items(0)  // Invalid!
//!     .false_positive_rate(0.01)
//!     .build();
//!
//! assert!(result.is_err());
//! ```

use super::validation;
use crate::core::shape::Shape;
use crate::error::Result;
use std::marker::PhantomData;

/// Type-state marker: nothing set.
pub struct Initial;

/// Type-state marker: item count set.
pub struct WithItems;

/// Type-state marker: item count and false positive rate set.
pub struct WithProbability;

/// Type-state marker: item count and number of bits set.
pub struct WithBits;

/// Builder for [`Shape`] with type-state guarantees.
#[derive(Debug, Clone)]
pub struct ShapeBuilder<State> {
    expected_items: usize,
    probability: f64,
    number_of_bits: usize,
    hash_functions: Option<usize>,
    _state: PhantomData<State>,
}

impl ShapeBuilder<Initial> {
    /// Create a new shape builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expected_items: 0,
            probability: 0.0,
            number_of_bits: 0,
            hash_functions: None,
            _state: PhantomData,
        }
    }

    /// Set the expected number of items (must be > 0).
    #[must_use]
    pub fn expected_items(self, items: usize) -> ShapeBuilder<WithItems> {
        self.transition(|b| b.expected_items = items)
    }
}

impl Default for ShapeBuilder<Initial> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> ShapeBuilder<State> {
    fn transition<Next>(self, update: impl FnOnce(&mut Self)) -> ShapeBuilder<Next> {
        let mut this = self;
        update(&mut this);
        ShapeBuilder {
            expected_items: this.expected_items,
            probability: this.probability,
            number_of_bits: this.number_of_bits,
            hash_functions: this.hash_functions,
            _state: PhantomData,
        }
    }
}

impl ShapeBuilder<WithItems> {
    /// Size the filter for the target false positive rate (must be in (0, 1)).
    #[must_use]
    pub fn false_positive_rate(self, probability: f64) -> ShapeBuilder<WithProbability> {
        self.transition(|b| b.probability = probability)
    }

    /// Use exactly `bits` bits.
    #[must_use]
    pub fn number_of_bits(self, bits: usize) -> ShapeBuilder<WithBits> {
        self.transition(|b| b.number_of_bits = bits)
    }
}

impl ShapeBuilder<WithProbability> {
    /// Build the optimal shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the item count is zero, the rate is outside
    /// (0, 1), or the resulting filter is too large.
    pub fn build(self) -> Result<Shape> {
        validation::validate_items(self.expected_items)?;
        validation::validate_fp_rate(self.probability)?;
        Shape::from_np(self.expected_items, self.probability)
    }
}

impl ShapeBuilder<WithBits> {
    /// Use `k` hash functions instead of the optimal number for the size.
    #[must_use]
    pub fn hash_functions(mut self, k: usize) -> Self {
        self.hash_functions = Some(k);
        self
    }

    /// Build the shape.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of range or the resulting
    /// false positive rate is 0 or 1.
    pub fn build(self) -> Result<Shape> {
        validation::validate_items(self.expected_items)?;
        match self.hash_functions {
            Some(k) => Shape::from_nmk(self.expected_items, self.number_of_bits, k),
            None => Shape::from_nm(self.expected_items, self.number_of_bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BloomForgeError;

    #[test]
    fn test_by_rate_matches_constructor() {
        let built = ShapeBuilder::new()
            .expected_items(1000)
            .false_positive_rate(0.01)
            .build()
            .unwrap();
        assert_eq!(built, Shape::from_np(1000, 0.01).unwrap());
    }

    #[test]
    fn test_by_bits_uses_optimal_k() {
        let built = ShapeBuilder::new()
            .expected_items(1000)
            .number_of_bits(10_000)
            .build()
            .unwrap();
        assert_eq!(built, Shape::from_nm(1000, 10_000).unwrap());
    }

    #[test]
    fn test_invalid_rate() {
        let result = ShapeBuilder::new()
            .expected_items(10)
            .false_positive_rate(1.5)
            .build();
        assert!(matches!(
            result,
            Err(BloomForgeError::ProbabilityOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_zero_hash_functions() {
        let result = ShapeBuilder::new()
            .expected_items(10)
            .number_of_bits(100)
            .hash_functions(0)
            .build();
        assert!(result.is_err());
    }
}
