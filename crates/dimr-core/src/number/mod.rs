//! Arbitrary-precision decimal values with pluggable arithmetic backends

mod backend;
mod decimal;
mod manual;
mod rounding;

pub use backend::ArithmeticBackend;
pub use decimal::DecimalBackend;
pub use manual::ManualBackend;
pub use rounding::RoundingMode;

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Fractional digits used for division and conversion results unless the
/// caller overrides the scale.
pub const DEFAULT_SCALE: u32 = 10;

/// Rounding mode used unless the caller overrides it.
pub const DEFAULT_ROUNDING: RoundingMode = RoundingMode::HalfUp;

/// An immutable arbitrary-precision decimal value.
///
/// The value is held in canonical string form, and every operation is
/// delegated to the [`ArithmeticBackend`] the number was constructed
/// with. Because the canonical form is backend-independent, operands from
/// different backends mix freely; the left-hand operand's backend does
/// the work.
#[derive(Clone)]
pub struct Number {
    value: String,
    backend: Arc<dyn ArithmeticBackend>,
}

impl Number {
    /// Parse a decimal string on the default (`rust_decimal`-backed)
    /// backend. Fails with `InvalidArgument` on non-numeric input.
    pub fn new(value: &str) -> Result<Number> {
        Number::with_backend(value, DecimalBackend::shared())
    }

    /// Parse a decimal string on an explicit backend.
    pub fn with_backend(value: &str, backend: Arc<dyn ArithmeticBackend>) -> Result<Number> {
        let value = backend.normalize(value)?;
        Ok(Number { value, backend })
    }

    /// The canonical decimal string: optional sign, no leading or
    /// trailing zero padding, no exponent notation.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The backend this number delegates its arithmetic to.
    pub fn backend(&self) -> &Arc<dyn ArithmeticBackend> {
        &self.backend
    }

    fn wrap(&self, value: String) -> Number {
        Number {
            value,
            backend: Arc::clone(&self.backend),
        }
    }

    pub fn add(&self, other: &Number) -> Result<Number> {
        Ok(self.wrap(self.backend.add(&self.value, &other.value)?))
    }

    pub fn subtract(&self, other: &Number) -> Result<Number> {
        Ok(self.wrap(self.backend.subtract(&self.value, &other.value)?))
    }

    pub fn multiply(&self, other: &Number) -> Result<Number> {
        Ok(self.wrap(self.backend.multiply(&self.value, &other.value)?))
    }

    pub fn divide(&self, other: &Number, scale: u32, mode: RoundingMode) -> Result<Number> {
        Ok(self.wrap(self.backend.divide(&self.value, &other.value, scale, mode)?))
    }

    /// Raise to an arbitrary decimal exponent. Integer exponents are
    /// exact; fractional ones go through the backend's floating-point
    /// fallback.
    pub fn power(&self, exponent: &Number) -> Result<Number> {
        Ok(self.wrap(self.backend.power(&self.value, &exponent.value)?))
    }

    /// Raise to an integer exponent.
    pub fn powi(&self, exponent: i64) -> Result<Number> {
        Ok(self.wrap(self.backend.power(&self.value, &exponent.to_string())?))
    }

    pub fn sqrt(&self, scale: u32) -> Result<Number> {
        Ok(self.wrap(self.backend.sqrt(&self.value, scale)?))
    }

    pub fn abs(&self) -> Result<Number> {
        Ok(self.wrap(self.backend.abs(&self.value)?))
    }

    pub fn negate(&self) -> Result<Number> {
        Ok(self.wrap(self.backend.negate(&self.value)?))
    }

    pub fn round(&self, precision: u32, mode: RoundingMode) -> Result<Number> {
        Ok(self.wrap(self.backend.round(&self.value, precision, mode)?))
    }

    pub fn compare(&self, other: &Number) -> Result<Ordering> {
        self.backend.compare(&self.value, &other.value)
    }

    /// Numeric equality. Canonical forms are unique, so this is exact.
    pub fn equals(&self, other: &Number) -> bool {
        self.value == other.value
    }

    /// Equality within a non-negative tolerance: `|a - b| <= tolerance`.
    pub fn equals_within(&self, other: &Number, tolerance: &Number) -> Result<bool> {
        let difference = self.subtract(other)?.abs()?;
        Ok(difference.compare(tolerance)? != Ordering::Greater)
    }

    pub fn min(&self, other: &Number) -> Result<Number> {
        Ok(if self.compare(other)? == Ordering::Greater {
            other.clone()
        } else {
            self.clone()
        })
    }

    pub fn max(&self, other: &Number) -> Result<Number> {
        Ok(if self.compare(other)? == Ordering::Less {
            other.clone()
        } else {
            self.clone()
        })
    }

    pub fn is_zero(&self) -> bool {
        self.value == "0"
    }

    pub fn is_negative(&self) -> bool {
        self.value.starts_with('-')
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && !self.is_negative()
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Number")
            .field("value", &self.value)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Numeric equality through the canonical form; the backend does not
/// participate in identity.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Number {}

impl FromStr for Number {
    type Err = crate::error::CalcError;

    fn from_str(s: &str) -> Result<Number> {
        Number::new(s)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number {
            value: value.to_string(),
            backend: DecimalBackend::shared(),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::from(value as i64)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Number::new(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(s: &str) -> Number {
        Number::new(s).unwrap()
    }

    #[test]
    fn test_construction_and_value() {
        assert_eq!(n("1.500").value(), "1.5");
        assert_eq!(Number::from(42).value(), "42");
        assert_eq!("3.25".parse::<Number>().unwrap().value(), "3.25");
        assert!(Number::new("abc").is_err());
    }

    #[test]
    fn test_immutable_operations() {
        let a = n("10");
        let b = n("4");
        assert_eq!(a.add(&b).unwrap().value(), "14");
        assert_eq!(a.subtract(&b).unwrap().value(), "6");
        assert_eq!(a.multiply(&b).unwrap().value(), "40");
        assert_eq!(
            a.divide(&b, 2, RoundingMode::HalfUp).unwrap().value(),
            "2.5"
        );
        // Operands untouched.
        assert_eq!(a.value(), "10");
        assert_eq!(b.value(), "4");
    }

    #[test]
    fn test_predicates() {
        assert!(n("0").is_zero());
        assert!(n("-0.0").is_zero());
        assert!(n("-1").is_negative());
        assert!(n("0.001").is_positive());
        assert!(!n("0").is_positive());
    }

    #[test]
    fn test_min_max_equals() {
        let a = n("1.5");
        let b = n("1.50");
        assert!(a.equals(&b));
        assert_eq!(a.min(&n("2")).unwrap(), a);
        assert_eq!(a.max(&n("2")).unwrap(), n("2"));
        assert!(a
            .equals_within(&n("1.5001"), &n("0.001"))
            .unwrap());
        assert!(!a.equals_within(&n("1.51"), &n("0.001")).unwrap());
    }

    #[test]
    fn test_mixed_backend_arithmetic() {
        let decimal = Number::new("0.1").unwrap();
        let manual = Number::with_backend("0.2", ManualBackend::shared()).unwrap();
        // Left-hand backend does the work; the canonical form carries over.
        assert_eq!(decimal.add(&manual).unwrap().value(), "0.3");
        assert_eq!(manual.add(&decimal).unwrap().value(), "0.3");
        assert_eq!(manual.add(&decimal).unwrap().backend().name(), "manual");
    }

    #[test]
    fn test_serde_round_trip() {
        let a = n("-12.75");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"-12.75\"");
        let back: Number = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
