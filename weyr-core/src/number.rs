//! Exact rational numbers using dashu
//!
//! Uses dashu-ratio (RBig) so that ranks, powers and eigenvalue checks
//! never suffer from rounding. Every value is kept in lowest terms.

use dashu_base::Abs;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Serialize, Serializer, Deserializer};
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// Exact rational number
///
/// Built on dashu-ratio's RBig. All operations return Results or new
/// values - never panic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rational {
    inner: RBig,
}

impl Rational {
    // ========== Construction ==========

    /// Create from string representation
    /// Supports: "123", "-42", "1/3", "-2/4", "0.25", "-1.5"
    pub fn from_str(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        // Rational format "a/b"
        if let Some((num_str, den_str)) = s.split_once('/') {
            let num: IBig = num_str.trim().parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            let den: IBig = den_str.trim().parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            if den == IBig::ZERO {
                return Err(NumberError::DivisionByZero);
            }
            return Self::from_ibig(num).checked_div(&Self::from_ibig(den));
        }

        // Finite decimal "a.b" - scaled integer over a power of ten
        if let Some((int_part, frac_part)) = s.split_once('.') {
            if frac_part.is_empty() || !frac_part.chars().all(|c| c.is_ascii_digit()) {
                return Err(NumberError::ParseError(s.to_string()));
            }
            let digits = format!("{}{}", int_part, frac_part);
            let scaled: IBig = digits.parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            let scale = UBig::from(10u8).pow(frac_part.len());
            return Ok(Self { inner: RBig::from_parts(scaled, scale) });
        }

        let inner: IBig = s.parse()
            .map_err(|_| NumberError::ParseError(s.to_string()))?;
        Ok(Self::from_ibig(inner))
    }

    /// Create from i64
    pub fn from_i64(n: i64) -> Self {
        Self::from_ibig(IBig::from(n))
    }

    /// Create from an arbitrary precision integer
    pub fn from_ibig(n: IBig) -> Self {
        Self { inner: RBig::from(n) }
    }

    /// Create from ratio (exact division)
    pub fn from_ratio(num: i64, den: i64) -> Result<Self, NumberError> {
        Self::from_i64(num).checked_div(&Self::from_i64(den))
    }

    pub fn zero() -> Self {
        Self { inner: RBig::ZERO }
    }

    pub fn one() -> Self {
        Self { inner: RBig::ONE }
    }

    // ========== Predicates ==========

    pub fn is_zero(&self) -> bool {
        self.inner == RBig::ZERO
    }

    pub fn is_one(&self) -> bool {
        self.inner == RBig::ONE
    }

    pub fn is_negative(&self) -> bool {
        self.inner < RBig::ZERO
    }

    /// Check if value is an integer
    pub fn is_integer(&self) -> bool {
        *self.inner.denominator() == UBig::ONE
    }

    // ========== Basic Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        Self { inner: &self.inner + &other.inner }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self { inner: &self.inner - &other.inner }
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self { inner: &self.inner * &other.inner }
    }

    pub fn neg(&self) -> Self {
        Self { inner: -self.inner.clone() }
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(Self { inner: &self.inner / &other.inner })
        }
    }

    /// Multiplicative inverse, None for zero
    pub fn recip(&self) -> Option<Self> {
        Self::one().checked_div(self).ok()
    }

    /// Integer power (exact)
    pub fn pow(&self, exp: i32) -> Result<Self, NumberError> {
        let mut result = Self::one();
        for _ in 0..exp.unsigned_abs() {
            result = result.mul(self);
        }

        if exp < 0 {
            Self::one().checked_div(&result)
        } else {
            Ok(result)
        }
    }

    pub fn abs(&self) -> Self {
        let num = self.inner.numerator().clone().abs();
        Self { inner: RBig::from_parts(num, self.inner.denominator().clone()) }
    }

    // ========== Accessors ==========

    pub fn numerator(&self) -> &IBig {
        self.inner.numerator()
    }

    pub fn denominator(&self) -> &UBig {
        self.inner.denominator()
    }

    /// Try to convert to i64 (integers only)
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.inner.numerator().clone().try_into().ok()
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.inner.numerator())
        } else {
            write!(f, "{}/{}", self.inner.numerator(), self.inner.denominator())
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl From<IBig> for Rational {
    fn from(n: IBig) -> Self {
        Self::from_ibig(n)
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
