//! Production arithmetic backend built on `rust_decimal`

use crate::error::{CalcError, Result};
use crate::number::{ArithmeticBackend, RoundingMode};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

static SHARED: LazyLock<Arc<DecimalBackend>> = LazyLock::new(|| Arc::new(DecimalBackend::new()));

/// Backend delegating to the `rust_decimal` fixed-point type.
///
/// The engine's rounding modes translate to the library's own strategies;
/// `HalfOdd`, which the library does not provide, is derived from the two
/// midpoint strategies. Precision is the library's 28 significant digits,
/// comfortably above the engine's default working scale.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalBackend;

impl DecimalBackend {
    pub fn new() -> Self {
        DecimalBackend
    }

    /// The process-wide instance new [`Number`](crate::Number)s use
    /// unless a backend is supplied explicitly.
    pub fn shared() -> Arc<DecimalBackend> {
        Arc::clone(&SHARED)
    }

    fn parse(&self, value: &str) -> Result<Decimal> {
        let trimmed = value.trim();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        Decimal::from_str(unsigned)
            .map_err(|_| CalcError::argument(format!("not a numeric string: {value:?}")))
    }

    fn canonical(&self, value: Decimal) -> String {
        if value.is_zero() {
            "0".to_string()
        } else {
            value.normalize().to_string()
        }
    }
}

/// Round under the engine's mode table, mapping onto the library's
/// strategies where one exists.
fn round_with(value: Decimal, scale: u32, mode: RoundingMode) -> Decimal {
    let strategy = match mode {
        RoundingMode::Up => RoundingStrategy::AwayFromZero,
        RoundingMode::Down => RoundingStrategy::ToZero,
        RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
        RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
        RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        RoundingMode::HalfOdd => return round_half_odd(value, scale),
    };
    value.round_dp_with_strategy(scale, strategy)
}

/// The two midpoint strategies disagree exactly on ties; on a tie the
/// half-odd rule picks the odd neighbour.
fn round_half_odd(value: Decimal, scale: u32) -> Decimal {
    let toward = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointTowardZero);
    let away = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    if toward == away {
        return toward;
    }
    if last_fractional_digit(toward, scale) % 2 == 0 {
        away
    } else {
        toward
    }
}

/// Digit at the `scale`-th fractional position of `value`'s magnitude.
fn last_fractional_digit(value: Decimal, scale: u32) -> u8 {
    let shifted = (value.abs() / Decimal::new(1, scale)).trunc();
    (shifted % Decimal::TEN).to_u8().unwrap_or(0)
}

impl ArithmeticBackend for DecimalBackend {
    fn name(&self) -> &'static str {
        "decimal"
    }

    fn normalize(&self, value: &str) -> Result<String> {
        Ok(self.canonical(self.parse(value)?))
    }

    fn add(&self, a: &str, b: &str) -> Result<String> {
        let sum = self
            .parse(a)?
            .checked_add(self.parse(b)?)
            .ok_or_else(|| CalcError::operation(format!("numeric overflow in {a} + {b}")))?;
        Ok(self.canonical(sum))
    }

    fn subtract(&self, a: &str, b: &str) -> Result<String> {
        let difference = self
            .parse(a)?
            .checked_sub(self.parse(b)?)
            .ok_or_else(|| CalcError::operation(format!("numeric overflow in {a} - {b}")))?;
        Ok(self.canonical(difference))
    }

    fn multiply(&self, a: &str, b: &str) -> Result<String> {
        let product = self
            .parse(a)?
            .checked_mul(self.parse(b)?)
            .ok_or_else(|| CalcError::operation(format!("numeric overflow in {a} * {b}")))?;
        Ok(self.canonical(product))
    }

    fn divide(&self, a: &str, b: &str, scale: u32, mode: RoundingMode) -> Result<String> {
        let dividend = self.parse(a)?;
        let divisor = self.parse(b)?;
        if divisor.is_zero() {
            return Err(CalcError::operation("division by zero"));
        }
        let quotient = dividend
            .checked_div(divisor)
            .ok_or_else(|| CalcError::operation(format!("numeric overflow in {a} / {b}")))?;
        Ok(self.canonical(round_with(quotient, scale, mode)))
    }

    fn power(&self, a: &str, exponent: &str) -> Result<String> {
        let base = self.parse(a)?;
        let exp = self.parse(exponent)?;
        if exp.fract().is_zero() {
            let exp = exp
                .to_i64()
                .ok_or_else(|| CalcError::argument(format!("exponent out of range: {exponent}")))?;
            if base.is_zero() && exp < 0 {
                return Err(CalcError::operation("division by zero"));
            }
            let result = base.checked_powi(exp).ok_or_else(|| {
                CalcError::operation(format!("numeric overflow in {a} ^ {exponent}"))
            })?;
            return Ok(self.canonical(result));
        }
        // Fractional exponent: floating-point fallback.
        let approx = base
            .to_f64()
            .zip(exp.to_f64())
            .map(|(b, e)| b.powf(e))
            .ok_or_else(|| {
                CalcError::operation(format!("cannot evaluate {a} ^ {exponent} in floating point"))
            })?;
        if !approx.is_finite() {
            return Err(CalcError::operation(format!(
                "non-finite result for {a} ^ {exponent}"
            )));
        }
        let result = Decimal::from_f64(approx).ok_or_else(|| {
            CalcError::operation(format!("result of {a} ^ {exponent} is not representable"))
        })?;
        Ok(self.canonical(result))
    }

    fn sqrt(&self, a: &str, scale: u32) -> Result<String> {
        let value = self.parse(a)?;
        let root = value.sqrt().ok_or_else(|| {
            CalcError::operation(format!("square root of negative value {a}"))
        })?;
        Ok(self.canonical(round_with(root, scale, RoundingMode::HalfUp)))
    }

    fn round(&self, a: &str, precision: u32, mode: RoundingMode) -> Result<String> {
        let value = self.parse(a)?;
        Ok(self.canonical(round_with(value, precision, mode)))
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(self.parse(a)?.cmp(&self.parse(b)?))
    }
}
