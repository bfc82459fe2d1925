//! The pluggable arithmetic strategy behind [`Number`](super::Number)
//!
//! Backends operate on canonical decimal strings: an optional leading
//! minus, integer digits without leading zeros, and an optional fraction
//! without trailing zeros. `normalize` is the entry point that takes
//! arbitrary caller input into that form; every other method may assume
//! (but must not require) canonical operands, since mixed-backend
//! arithmetic re-derives operands through their canonical string form.

use crate::error::Result;
use crate::number::RoundingMode;
use std::cmp::Ordering;
use std::fmt;

/// Digit-level arithmetic operations a backend must provide.
///
/// Division carries one guard digit internally before rounding to the
/// requested scale; `sqrt` works at `scale + 2` precision. Division by
/// zero anywhere is an `InvalidOperation` failure, never a silent
/// infinity or NaN.
pub trait ArithmeticBackend: fmt::Debug + Send + Sync {
    /// Short identifier used in error messages and debugging.
    fn name(&self) -> &'static str;

    /// Parse and canonicalize a decimal string. Fails with
    /// `InvalidArgument` on non-numeric input.
    fn normalize(&self, value: &str) -> Result<String>;

    fn add(&self, a: &str, b: &str) -> Result<String>;

    fn subtract(&self, a: &str, b: &str) -> Result<String>;

    fn multiply(&self, a: &str, b: &str) -> Result<String>;

    /// Quotient rounded to `scale` fractional digits under `mode`.
    fn divide(&self, a: &str, b: &str, scale: u32, mode: RoundingMode) -> Result<String>;

    /// Raise `a` to `exponent`. Integer exponents are computed exactly;
    /// fractional exponents fall back to floating point and fail with
    /// `InvalidOperation` if the result is non-finite.
    fn power(&self, a: &str, exponent: &str) -> Result<String>;

    /// Square root rounded to `scale` fractional digits.
    fn sqrt(&self, a: &str, scale: u32) -> Result<String>;

    /// Round to `precision` fractional digits under `mode`.
    fn round(&self, a: &str, precision: u32, mode: RoundingMode) -> Result<String>;

    /// Numeric three-way comparison.
    fn compare(&self, a: &str, b: &str) -> Result<Ordering>;

    /// Magnitude of `a`. Canonical forms make this a sign strip.
    fn abs(&self, a: &str) -> Result<String> {
        let n = self.normalize(a)?;
        Ok(n.strip_prefix('-').unwrap_or(&n).to_string())
    }

    /// Additive inverse of `a`. Zero stays unsigned.
    fn negate(&self, a: &str) -> Result<String> {
        let n = self.normalize(a)?;
        if n == "0" {
            Ok(n)
        } else if let Some(stripped) = n.strip_prefix('-') {
            Ok(stripped.to_string())
        } else {
            Ok(format!("-{n}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::DecimalBackend;

    #[test]
    fn test_default_abs_and_negate() {
        let backend = DecimalBackend::new();
        assert_eq!(backend.abs("-3.25").unwrap(), "3.25");
        assert_eq!(backend.abs("3.25").unwrap(), "3.25");
        assert_eq!(backend.negate("3.25").unwrap(), "-3.25");
        assert_eq!(backend.negate("-3.25").unwrap(), "3.25");
        assert_eq!(backend.negate("0").unwrap(), "0");
        assert_eq!(backend.negate("-0.000").unwrap(), "0");
    }
}
