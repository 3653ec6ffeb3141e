//! Error types for bloomforge operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`], whose error type
//! is [`BloomForgeError`]. Errors describe caller mistakes (bad shape parameters,
//! indices outside the filter, mismatched filters) or estimates that cannot be
//! represented. Counting-filter overflow is deliberately *not* an error: it is
//! reported through the filter's validity flag.
//!
//! # Error Propagation
//!
//! ```
//! use bloomforge::{Result, Shape};
//!
//! fn build_shapes(n: usize, p: f64) -> Result<(Shape, Shape)> {
//!     let by_rate = Shape::from_np(n, p)?;
//!     let by_bits = Shape::from_nm(n, by_rate.number_of_bits())?;
//!     Ok((by_rate, by_bits))
//! }
//! # assert!(build_shapes(1000, 0.01).is_ok());
//! ```

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for bloomforge operations.
///
/// # Examples
/// ```
/// use bloomforge::{BloomForgeError, Result};
///
/// fn validate(k: usize) -> Result<()> {
///     if k == 0 {
///         return Err(BloomForgeError::invalid_hash_count(k));
///     }
///     Ok(())
/// }
/// # assert!(validate(3).is_ok());
/// ```
pub type Result<T> = std::result::Result<T, BloomForgeError>;

/// Errors that can occur during Bloom filter operations.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - Each variant carries the offending value so messages are self-contained
#[derive(Debug, Clone, PartialEq)]
pub enum BloomForgeError {
    /// Invalid parameters that do not fit a more specific variant.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// A probability outside the open interval (0, 1).
    ///
    /// Raised both for a requested false positive rate and for the rate a
    /// shape would actually produce (a shape that always answers "maybe" is
    /// rejected).
    ProbabilityOutOfBounds {
        /// The offending probability.
        probability: f64,
    },

    /// Expected number of items is zero.
    InvalidItemCount {
        /// The invalid count that was provided.
        count: usize,
    },

    /// Number of hash functions is below one or above `i32::MAX`.
    InvalidHashCount {
        /// The invalid hash count provided.
        count: usize,
    },

    /// Number of bits is below one or above `i32::MAX`.
    InvalidFilterSize {
        /// The invalid size in bits.
        size: usize,
    },

    /// Two filters cannot be combined.
    IncompatibleFilters {
        /// Description of the incompatibility.
        reason: String,
    },

    /// An extractor produced an index outside `[0, m)`.
    IndexOutOfRange {
        /// The offending index.
        index: i32,
        /// Number of bits in the receiving filter.
        number_of_bits: usize,
    },

    /// A bit map sequence does not fit the receiving filter.
    InvalidBitMaps {
        /// Description of the mismatch.
        reason: String,
    },

    /// A cardinality estimate could not be computed.
    EstimationFailed {
        /// Description of the failure.
        reason: String,
    },

    /// A layer position outside the current chain.
    LayerOutOfRange {
        /// Requested layer position.
        depth: usize,
        /// Number of layers in the chain.
        layers: usize,
    },
}

impl fmt::Display for BloomForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid Bloom filter parameters: {}.", message)
            }
            Self::ProbabilityOutOfBounds { probability } => {
                write!(
                    f,
                    "Probability {} is out of bounds. Must be in range (0, 1).",
                    probability
                )
            }
            Self::InvalidItemCount { count } => {
                write!(
                    f,
                    "Invalid item count: {}. Number of items must be greater than 0.",
                    count
                )
            }
            Self::InvalidHashCount { count } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be in range [1, {}].",
                    count,
                    i32::MAX
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be in range [1, {}].",
                    size,
                    i32::MAX
                )
            }
            Self::IncompatibleFilters { reason } => {
                write!(
                    f,
                    "Cannot perform operation on incompatible filters: {}.",
                    reason
                )
            }
            Self::IndexOutOfRange {
                index,
                number_of_bits,
            } => {
                write!(
                    f,
                    "IndexExtractor should only send values in the range [0, {}), got {}",
                    number_of_bits, index
                )
            }
            Self::InvalidBitMaps { reason } => {
                write!(f, "Invalid bit maps: {}.", reason)
            }
            Self::EstimationFailed { reason } => {
                write!(f, "Estimation failed: {}.", reason)
            }
            Self::LayerOutOfRange { depth, layers } => {
                write!(
                    f,
                    "Layer {} out of range for a chain of {} layers",
                    depth, layers
                )
            }
        }
    }
}

impl std::error::Error for BloomForgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl BloomForgeError {
    /// Create an `InvalidParameters` error with a formatted message.
    ///
    /// # Examples
    /// ```
    /// use bloomforge::BloomForgeError;
    ///
    /// let err = BloomForgeError::invalid_parameters(format!("max depth {} must be > 0", 0));
    /// assert!(err.to_string().contains("max depth"));
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `ProbabilityOutOfBounds` error.
    #[must_use]
    pub fn probability_out_of_bounds(probability: f64) -> Self {
        Self::ProbabilityOutOfBounds { probability }
    }

    /// Create an `InvalidItemCount` error.
    #[must_use]
    pub fn invalid_item_count(count: usize) -> Self {
        Self::InvalidItemCount { count }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize) -> Self {
        Self::InvalidHashCount { count }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create an `IncompatibleFilters` error.
    #[must_use]
    pub fn incompatible_filters(reason: impl Into<String>) -> Self {
        Self::IncompatibleFilters {
            reason: reason.into(),
        }
    }

    /// Create an `IndexOutOfRange` error.
    #[must_use]
    pub fn index_out_of_range(index: i32, number_of_bits: usize) -> Self {
        Self::IndexOutOfRange {
            index,
            number_of_bits,
        }
    }

    /// Create an `InvalidBitMaps` error.
    #[must_use]
    pub fn invalid_bit_maps(reason: impl Into<String>) -> Self {
        Self::InvalidBitMaps {
            reason: reason.into(),
        }
    }

    /// Create an `EstimationFailed` error.
    #[must_use]
    pub fn estimation_failed(reason: impl Into<String>) -> Self {
        Self::EstimationFailed {
            reason: reason.into(),
        }
    }

    /// Create a `LayerOutOfRange` error.
    #[must_use]
    pub fn layer_out_of_range(depth: usize, layers: usize) -> Self {
        Self::LayerOutOfRange { depth, layers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_parameters() {
        let err = BloomForgeError::invalid_parameters("test message");
        let display = format!("{err}");
        assert!(display.contains("Invalid Bloom filter parameters"));
        assert!(display.contains("test message"));
        assert!(display.ends_with('.'));
    }

    #[test]
    fn test_error_display_probability_out_of_bounds() {
        let err = BloomForgeError::probability_out_of_bounds(1.5);
        let display = format!("{err}");
        assert!(display.contains("1.5"));
        assert!(display.contains("out of bounds"));
        assert!(display.contains("(0, 1)"));
    }

    #[test]
    fn test_error_display_invalid_item_count() {
        let err = BloomForgeError::invalid_item_count(0);
        let display = format!("{err}");
        assert!(display.contains("0"));
        assert!(display.contains("greater than 0"));
    }

    #[test]
    fn test_error_display_invalid_hash_count() {
        let err = BloomForgeError::invalid_hash_count(0);
        let display = format!("{err}");
        assert!(display.contains("count: 0"));
        assert!(display.contains(&i32::MAX.to_string()));
    }

    #[test]
    fn test_error_display_invalid_filter_size() {
        let err = BloomForgeError::invalid_filter_size(0);
        let display = format!("{err}");
        assert!(display.contains("0 bits"));
    }

    #[test]
    fn test_error_display_index_out_of_range() {
        let err = BloomForgeError::index_out_of_range(-3, 72);
        let display = format!("{}", err);
        assert!(display.contains("[0, 72)"));
        assert!(display.contains("-3"));
    }

    #[test]
    fn test_error_display_incompatible_filters() {
        let err = BloomForgeError::incompatible_filters("different sizes");
        let display = format!("{err}");
        assert!(display.contains("incompatible"));
        assert!(display.contains("different sizes"));
    }

    #[test]
    fn test_error_display_layer_out_of_range() {
        let err = BloomForgeError::layer_out_of_range(4, 2);
        let display = format!("{err}");
        assert!(display.contains("Layer 4"));
        assert!(display.contains("2 layers"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> =
            Box::new(BloomForgeError::estimation_failed("Cardinality too large"));
    }

    #[test]
    fn test_error_clone() {
        let err1 = BloomForgeError::invalid_bit_maps("too many words");
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(BloomForgeError::invalid_item_count(0))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
