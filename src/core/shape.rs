//! Filter shape: the number of hash functions and the number of bits.
//!
//! A [`Shape`] is the immutable configuration every filter, hasher and
//! extractor in the crate agrees on. It can be built from any of the common
//! parameter combinations and exposes the classic Bloom filter formulas.
//!
//! # Mathematical Background
//!
//! Given:
//! - `n`: number of items merged into the filter
//! - `p`: false positive probability
//! - `m`: number of bits
//! - `k`: number of hash functions
//!
//! ```text
//! m = ceil(-n × ln(p) / (ln 2)²)
//! k = round((m / n) × ln 2)
//! p = (1 - e^(-kn/m))^k
//! n ≈ -(m / k) × ln(1 - c / m)      (c = number of enabled bits)
//! ```
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Swamidass & Baldi (2007). "Mathematical correction for fingerprint similarity measures
//!   to improve chemical retrieval"

#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::core::bit_maps;
use crate::error::{BloomForgeError, Result};
use std::f64::consts::LN_2;
use std::fmt;

/// (ln 2)², the denominator of the optimal bit count formula.
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Largest value accepted for `k`, `m` and computed `n`.
const MAX_DIMENSION: usize = i32::MAX as usize;

/// The shape of a Bloom filter.
///
/// Two shapes are equal when both `k` and `m` are equal.
///
/// # Examples
///
/// ```
/// use bloomforge::Shape;
///
/// let shape = Shape::from_np(1000, 0.01).unwrap();
/// assert_eq!(shape.number_of_bits(), 9586);
/// assert_eq!(shape.number_of_hash_functions(), 7);
/// assert!(shape.probability(1000) < 0.0101);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawShape")
)]
pub struct Shape {
    number_of_hash_functions: usize,
    number_of_bits: usize,
}

impl Shape {
    /// Create a shape from the number of hash functions and bits.
    ///
    /// # Errors
    ///
    /// - [`BloomForgeError::InvalidHashCount`] if `k` is 0 or above `i32::MAX`
    /// - [`BloomForgeError::InvalidFilterSize`] if `m` is 0 or above `i32::MAX`
    pub fn from_km(number_of_hash_functions: usize, number_of_bits: usize) -> Result<Self> {
        check_number_of_hash_functions(number_of_hash_functions)?;
        check_number_of_bits(number_of_bits)?;
        Ok(Self {
            number_of_hash_functions,
            number_of_bits,
        })
    }

    /// Create the optimal shape for `n` items at false positive rate `p`.
    ///
    /// # Arguments
    ///
    /// * `number_of_items` - Expected number of items (must be > 0)
    /// * `probability` - Target false positive rate, in (0, 1)
    ///
    /// # Errors
    ///
    /// - [`BloomForgeError::InvalidItemCount`] if `n == 0`
    /// - [`BloomForgeError::ProbabilityOutOfBounds`] if `p` is not in (0, 1)
    /// - [`BloomForgeError::InvalidFilterSize`] if the resulting `m` exceeds `i32::MAX`
    /// - [`BloomForgeError::InvalidParameters`] if the resulting `k` is 0
    /// - [`BloomForgeError::ProbabilityOutOfBounds`] if the resulting rate is not in (0, 1)
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomforge::Shape;
    ///
    /// let shape = Shape::from_np(5000, 1.0 / 100_000.0).unwrap();
    /// assert_eq!(shape.number_of_bits(), 119_814);
    /// assert_eq!(shape.number_of_hash_functions(), 17);
    /// ```
    pub fn from_np(number_of_items: usize, probability: f64) -> Result<Self> {
        check_number_of_items(number_of_items)?;
        check_probability(probability)?;
        let m = (-(number_of_items as f64) * probability.ln() / LN2_SQUARED).ceil();
        if m > MAX_DIMENSION as f64 {
            return Err(BloomForgeError::invalid_filter_size(m as usize));
        }
        let number_of_bits = m as usize;
        let number_of_hash_functions =
            calculate_number_of_hash_functions(number_of_items, number_of_bits)?;
        let shape = Self {
            number_of_hash_functions,
            number_of_bits,
        };
        check_calculated_probability(shape.probability(number_of_items))?;
        Ok(shape)
    }

    /// Create the optimal shape for `n` items in `m` bits.
    ///
    /// # Errors
    ///
    /// - [`BloomForgeError::InvalidItemCount`] if `n == 0`
    /// - [`BloomForgeError::InvalidFilterSize`] if `m` is out of range
    /// - [`BloomForgeError::InvalidParameters`] if the filter is too small for a single hash
    /// - [`BloomForgeError::ProbabilityOutOfBounds`] if the resulting rate is not in (0, 1)
    pub fn from_nm(number_of_items: usize, number_of_bits: usize) -> Result<Self> {
        check_number_of_items(number_of_items)?;
        check_number_of_bits(number_of_bits)?;
        let number_of_hash_functions =
            calculate_number_of_hash_functions(number_of_items, number_of_bits)?;
        let shape = Self {
            number_of_hash_functions,
            number_of_bits,
        };
        check_calculated_probability(shape.probability(number_of_items))?;
        Ok(shape)
    }

    /// Create a shape from `n`, `m` and `k`, verifying the resulting rate.
    ///
    /// # Errors
    ///
    /// Same as [`Shape::from_km`], plus [`BloomForgeError::InvalidItemCount`]
    /// for `n == 0` and [`BloomForgeError::ProbabilityOutOfBounds`] when the
    /// shape would have a false positive rate of 0 or 1.
    pub fn from_nmk(
        number_of_items: usize,
        number_of_bits: usize,
        number_of_hash_functions: usize,
    ) -> Result<Self> {
        check_number_of_items(number_of_items)?;
        let shape = Self::from_km(number_of_hash_functions, number_of_bits)?;
        check_calculated_probability(shape.probability(number_of_items))?;
        Ok(shape)
    }

    /// Create a shape from `p`, `m` and `k`.
    ///
    /// The number of items is derived as `n = ceil(-m × ln(1 - p^(1/k)) / k)`
    /// and the result is validated like [`Shape::from_nmk`].
    ///
    /// # Errors
    ///
    /// - [`BloomForgeError::ProbabilityOutOfBounds`] if `p` is not in (0, 1)
    /// - [`BloomForgeError::InvalidItemCount`] if the derived `n` exceeds `i32::MAX`
    /// - any error of [`Shape::from_nmk`]
    pub fn from_pmk(
        probability: f64,
        number_of_bits: usize,
        number_of_hash_functions: usize,
    ) -> Result<Self> {
        check_number_of_bits(number_of_bits)?;
        check_number_of_hash_functions(number_of_hash_functions)?;
        check_probability(probability)?;
        let k = number_of_hash_functions as f64;
        // ln(1 - p^(1/k)) computed without cancellation for p close to 1
        let ln_free = (-(probability.ln() / k).exp_m1()).ln();
        let n = (-(number_of_bits as f64) * ln_free / k).ceil();
        if n > MAX_DIMENSION as f64 {
            return Err(BloomForgeError::invalid_item_count(n as usize));
        }
        Self::from_nmk(n as usize, number_of_bits, number_of_hash_functions)
    }

    /// Number of hash functions (`k`).
    #[inline]
    #[must_use]
    pub fn number_of_hash_functions(&self) -> usize {
        self.number_of_hash_functions
    }

    /// Number of bits (`m`).
    #[inline]
    #[must_use]
    pub fn number_of_bits(&self) -> usize {
        self.number_of_bits
    }

    /// Number of 64-bit words needed to hold `m` bits.
    #[inline]
    #[must_use]
    pub fn number_of_bit_maps(&self) -> usize {
        bit_maps::number_of_bit_maps(self.number_of_bits)
    }

    /// Expected false positive rate after `n` items have been merged.
    ///
    /// `p = (1 - e^(-kn/m))^k`, and exactly 0 for an empty filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomforge::Shape;
    ///
    /// let shape = Shape::from_km(5, 24).unwrap();
    /// assert_eq!(shape.probability(0), 0.0);
    /// assert!((shape.probability(1) - 0.000_235_247).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn probability(&self, number_of_items: usize) -> f64 {
        if number_of_items == 0 {
            return 0.0;
        }
        let k = self.number_of_hash_functions as f64;
        let exponent = -k * number_of_items as f64 / self.number_of_bits as f64;
        (-exponent.exp_m1()).powf(k)
    }

    /// Estimate the number of items that produced `cardinality` enabled bits.
    ///
    /// Returns `f64::INFINITY` when every bit is enabled. A cardinality larger
    /// than `m` has no meaning and yields `NaN`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomforge::Shape;
    ///
    /// let shape = Shape::from_km(3, 24).unwrap();
    /// assert_eq!(shape.estimate_n(0), 0.0);
    /// assert!(shape.estimate_n(24).is_infinite());
    /// ```
    #[must_use]
    pub fn estimate_n(&self, cardinality: usize) -> f64 {
        let m = self.number_of_bits as f64;
        let k = self.number_of_hash_functions as f64;
        let c = cardinality as f64;
        -(m / k) * (-c / m).ln_1p()
    }

    /// Estimate the maximum number of items that fit before the false positive
    /// rate degrades past the optimum: `m × ln 2 / k`.
    #[must_use]
    pub fn estimate_max_n(&self) -> f64 {
        self.number_of_bits as f64 * LN_2 / self.number_of_hash_functions as f64
    }

    /// Whether a filter with `cardinality` enabled bits is cheaper to hold as
    /// a list of 32-bit indices than as an array of 64-bit words.
    #[inline]
    #[must_use]
    pub fn is_sparse(&self, cardinality: usize) -> bool {
        cardinality <= self.number_of_bit_maps() * 2
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shape[k={} m={}]",
            self.number_of_hash_functions, self.number_of_bits
        )
    }
}

/// Unchecked wire form of a [`Shape`]; deserialization goes through
/// [`Shape::from_km`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawShape {
    number_of_hash_functions: usize,
    number_of_bits: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawShape> for Shape {
    type Error = BloomForgeError;

    fn try_from(raw: RawShape) -> Result<Self> {
        Shape::from_km(raw.number_of_hash_functions, raw.number_of_bits)
    }
}

fn check_number_of_items(number_of_items: usize) -> Result<()> {
    if number_of_items == 0 {
        return Err(BloomForgeError::invalid_item_count(number_of_items));
    }
    Ok(())
}

fn check_number_of_bits(number_of_bits: usize) -> Result<()> {
    if number_of_bits == 0 || number_of_bits > MAX_DIMENSION {
        return Err(BloomForgeError::invalid_filter_size(number_of_bits));
    }
    Ok(())
}

fn check_number_of_hash_functions(number_of_hash_functions: usize) -> Result<()> {
    if number_of_hash_functions == 0 || number_of_hash_functions > MAX_DIMENSION {
        return Err(BloomForgeError::invalid_hash_count(number_of_hash_functions));
    }
    Ok(())
}

fn check_probability(probability: f64) -> Result<()> {
    // negated form also rejects NaN
    if !(probability > 0.0 && probability < 1.0) {
        return Err(BloomForgeError::probability_out_of_bounds(probability));
    }
    Ok(())
}

fn check_calculated_probability(probability: f64) -> Result<()> {
    if probability >= 1.0 || probability <= 0.0 || probability.is_nan() {
        return Err(BloomForgeError::probability_out_of_bounds(probability));
    }
    Ok(())
}

fn calculate_number_of_hash_functions(number_of_items: usize, number_of_bits: usize) -> Result<usize> {
    let k = (LN_2 * number_of_bits as f64 / number_of_items as f64).round();
    if k < 1.0 {
        return Err(BloomForgeError::invalid_parameters(format!(
            "Filter too small: calculated number of hash functions ({}) was less than 1",
            k
        )));
    }
    // m ≤ i32::MAX and n ≥ 1 keep k within range
    Ok(k as usize)
}
