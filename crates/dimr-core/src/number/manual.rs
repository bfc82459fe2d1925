//! From-scratch digit-string arithmetic backend
//!
//! For hosts without an arbitrary-precision decimal library. Values are
//! sign + big-endian decimal digits + fractional scale; every operation,
//! including all eight rounding modes and a Newton's-method square root,
//! is implemented directly on the digit vectors.

use crate::error::{CalcError, Result};
use crate::number::{ArithmeticBackend, RoundingMode, DEFAULT_SCALE};
use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

/// Hard ceiling on Newton iterations; convergence is quadratic, so the
/// cap exists purely to guarantee termination.
const NEWTON_MAX_ITERATIONS: usize = 100;

static SHARED: LazyLock<Arc<ManualBackend>> = LazyLock::new(|| Arc::new(ManualBackend::new()));

/// Pure digit-string arithmetic backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualBackend;

impl ManualBackend {
    pub fn new() -> Self {
        ManualBackend
    }

    /// A process-wide shared instance.
    pub fn shared() -> Arc<ManualBackend> {
        Arc::clone(&SHARED)
    }
}

/// Decimal magnitude with sign: `digits` big-endian, the trailing
/// `scale` of them sitting right of the decimal point.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Digits {
    negative: bool,
    digits: Vec<u8>,
    scale: usize,
}

impl Digits {
    fn zero() -> Self {
        Digits {
            negative: false,
            digits: vec![0],
            scale: 0,
        }
    }

    fn one() -> Self {
        Digits {
            negative: false,
            digits: vec![1],
            scale: 0,
        }
    }

    fn two() -> Self {
        Digits {
            negative: false,
            digits: vec![2],
            scale: 0,
        }
    }

    fn is_zero(&self) -> bool {
        self.digits.iter().all(|&d| d == 0)
    }

    /// Canonical shape: no trailing fraction zeros, no leading integer
    /// zeros beyond the mandatory one, no negative zero.
    fn trim(mut self) -> Self {
        while self.scale > 0 && self.digits.last() == Some(&0) {
            self.digits.pop();
            self.scale -= 1;
        }
        while self.digits.len() > self.scale + 1 && self.digits.first() == Some(&0) {
            self.digits.remove(0);
        }
        while self.digits.len() < self.scale + 1 {
            self.digits.insert(0, 0);
        }
        if self.is_zero() {
            self.negative = false;
        }
        self
    }

    fn to_canonical(&self) -> String {
        let split = self.digits.len() - self.scale;
        let mut out = String::with_capacity(self.digits.len() + 2);
        if self.negative && !self.is_zero() {
            out.push('-');
        }
        for &d in &self.digits[..split] {
            out.push((b'0' + d) as char);
        }
        if self.scale > 0 {
            out.push('.');
            for &d in &self.digits[split..] {
                out.push((b'0' + d) as char);
            }
        }
        out
    }
}

fn parse(value: &str) -> Result<Digits> {
    let bad = || CalcError::argument(format!("not a numeric string: {value:?}"));
    let trimmed = value.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(bad());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(bad());
    }
    let digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes())
        .map(|b| b - b'0')
        .collect();
    Ok(Digits {
        negative,
        digits,
        scale: frac_part.len(),
    }
    .trim())
}

// --- integer-magnitude helpers (big-endian digit vectors) ---

fn strip_leading(mut v: Vec<u8>) -> Vec<u8> {
    while v.len() > 1 && v[0] == 0 {
        v.remove(0);
    }
    if v.is_empty() {
        v.push(0);
    }
    v
}

fn cmp_mag(a: &[u8], b: &[u8]) -> Ordering {
    let a = {
        let mut i = 0;
        while i + 1 < a.len() && a[i] == 0 {
            i += 1;
        }
        &a[i..]
    };
    let b = {
        let mut i = 0;
        while i + 1 < b.len() && b[i] == 0 {
            i += 1;
        }
        &b[i..]
    };
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn add_mag(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
    let mut carry = 0u8;
    let mut ai = a.iter().rev();
    let mut bi = b.iter().rev();
    loop {
        let (x, y) = (ai.next(), bi.next());
        if x.is_none() && y.is_none() && carry == 0 {
            break;
        }
        let sum = x.copied().unwrap_or(0) + y.copied().unwrap_or(0) + carry;
        out.push(sum % 10);
        carry = sum / 10;
    }
    if out.is_empty() {
        out.push(0);
    }
    out.reverse();
    out
}

/// Magnitude subtraction; requires `a >= b`.
fn sub_mag(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = 0i8;
    let mut bi = b.iter().rev();
    for &x in a.iter().rev() {
        let y = bi.next().copied().unwrap_or(0);
        let mut diff = x as i8 - y as i8 - borrow;
        if diff < 0 {
            diff += 10;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(diff as u8);
    }
    out.reverse();
    strip_leading(out)
}

fn mul_small(a: &[u8], m: u8) -> Vec<u8> {
    if m == 0 {
        return vec![0];
    }
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry = 0u32;
    for &d in a.iter().rev() {
        let p = d as u32 * m as u32 + carry;
        out.push((p % 10) as u8);
        carry = p / 10;
    }
    while carry > 0 {
        out.push((carry % 10) as u8);
        carry /= 10;
    }
    out.reverse();
    strip_leading(out)
}

fn mul_mag(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut acc = vec![0u32; a.len() + b.len()];
    for (i, &x) in a.iter().rev().enumerate() {
        for (j, &y) in b.iter().rev().enumerate() {
            acc[i + j] += x as u32 * y as u32;
        }
    }
    let mut out = Vec::with_capacity(acc.len());
    let mut carry = 0u32;
    for v in acc {
        let sum = v + carry;
        out.push((sum % 10) as u8);
        carry = sum / 10;
    }
    while carry > 0 {
        out.push((carry % 10) as u8);
        carry /= 10;
    }
    out.reverse();
    strip_leading(out)
}

/// Schoolbook long division of magnitudes; returns (quotient, remainder).
/// The divisor must be non-zero.
fn divmod_mag(n: &[u8], d: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut quotient = Vec::with_capacity(n.len());
    let mut remainder: Vec<u8> = vec![0];
    for &digit in n {
        remainder.push(digit);
        remainder = strip_leading(remainder);
        let mut q = 0u8;
        for candidate in (1..=9u8).rev() {
            if cmp_mag(&mul_small(d, candidate), &remainder) != Ordering::Greater {
                q = candidate;
                break;
            }
        }
        if q > 0 {
            remainder = sub_mag(&remainder, &mul_small(d, q));
        }
        quotient.push(q);
    }
    (strip_leading(quotient), remainder)
}

fn shl10(mut v: Vec<u8>, k: usize) -> Vec<u8> {
    v.extend(std::iter::repeat(0).take(k));
    strip_leading(v)
}

/// Pad with trailing fraction zeros so both magnitudes share a scale.
fn align(a: &Digits, b: &Digits) -> (Vec<u8>, Vec<u8>, usize) {
    let scale = a.scale.max(b.scale);
    (
        shl10(a.digits.clone(), scale - a.scale),
        shl10(b.digits.clone(), scale - b.scale),
        scale,
    )
}

// --- signed operations on Digits ---

fn add_digits(a: &Digits, b: &Digits) -> Digits {
    let (am, bm, scale) = align(a, b);
    let (negative, digits) = if a.negative == b.negative {
        (a.negative, add_mag(&am, &bm))
    } else {
        match cmp_mag(&am, &bm) {
            Ordering::Equal => (false, vec![0]),
            Ordering::Greater => (a.negative, sub_mag(&am, &bm)),
            Ordering::Less => (b.negative, sub_mag(&bm, &am)),
        }
    };
    Digits {
        negative,
        digits,
        scale,
    }
    .trim()
}

fn negate_digits(a: &Digits) -> Digits {
    Digits {
        negative: !a.negative,
        digits: a.digits.clone(),
        scale: a.scale,
    }
    .trim()
}

fn mul_digits(a: &Digits, b: &Digits) -> Digits {
    Digits {
        negative: a.negative != b.negative,
        digits: mul_mag(&a.digits, &b.digits),
        scale: a.scale + b.scale,
    }
    .trim()
}

fn cmp_digits(a: &Digits, b: &Digits) -> Ordering {
    match (a.negative, b.negative) {
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
        (negative, _) => {
            let (am, bm, _) = align(a, b);
            let mag = cmp_mag(&am, &bm);
            if negative {
                mag.reverse()
            } else {
                mag
            }
        }
    }
}

/// Drop fractional digits beyond `precision`, then apply the rounding
/// decision to the first discarded digit.
fn round_digits(value: Digits, precision: usize, mode: RoundingMode) -> Digits {
    if value.scale <= precision {
        return value.trim();
    }
    let drop = value.scale - precision;
    let keep = value.digits.len() - drop;
    let next = value.digits[keep];
    let mut digits = value.digits[..keep].to_vec();
    if digits.is_empty() {
        digits.push(0);
    }
    let last_kept = *digits.last().unwrap_or(&0);
    let mut rounded = Digits {
        negative: value.negative,
        digits,
        scale: precision,
    };
    if mode.rounds_away(value.negative, next, last_kept) {
        rounded.digits = add_mag(&rounded.digits, &[1]);
    }
    rounded.trim()
}

/// Quotient at `scale` fractional digits: one guard digit is computed,
/// then the rounding mode decides on it.
fn divide_digits(a: &Digits, b: &Digits, scale: usize, mode: RoundingMode) -> Result<Digits> {
    if b.is_zero() {
        return Err(CalcError::operation("division by zero"));
    }
    if a.is_zero() {
        return Ok(Digits::zero());
    }
    let work = scale + 1;
    let mut numerator = a.digits.clone();
    let mut denominator = b.digits.clone();
    // a/b = (A * 10^b.scale) / (B * 10^a.scale), scaled up by 10^work.
    let up = b.scale + work;
    if up >= a.scale {
        numerator = shl10(numerator, up - a.scale);
    } else {
        denominator = shl10(denominator, a.scale - up);
    }
    let (quotient, _) = divmod_mag(&numerator, &denominator);
    let raw = Digits {
        negative: a.negative != b.negative,
        digits: quotient,
        scale: work,
    };
    // Restore the mandatory integer digit before rounding.
    let padded = if raw.digits.len() < work + 1 {
        let mut digits = vec![0; work + 1 - raw.digits.len()];
        digits.extend(raw.digits.iter());
        Digits {
            negative: raw.negative,
            digits,
            scale: work,
        }
    } else {
        raw
    };
    Ok(round_digits(padded, scale, mode))
}

fn pow_integer(base: &Digits, exponent: u64) -> Digits {
    let mut result = Digits::one();
    let mut square = base.clone();
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = mul_digits(&result, &square);
        }
        remaining >>= 1;
        if remaining > 0 {
            square = mul_digits(&square, &square);
        }
    }
    result
}

/// Newton's method: x <- (x + v/x) / 2 at `scale + 2` working precision
/// until two consecutive iterates agree to `scale` digits.
fn sqrt_digits(value: &Digits, scale: usize) -> Result<Digits> {
    if value.negative && !value.is_zero() {
        return Err(CalcError::operation(format!(
            "square root of negative value {}",
            value.to_canonical()
        )));
    }
    if value.is_zero() {
        return Ok(Digits::zero());
    }
    let work = scale + 2;
    let mut x = initial_sqrt_guess(value, work);
    let mut settled = round_digits(x.clone(), scale, RoundingMode::HalfUp).to_canonical();
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let quotient = divide_digits(value, &x, work, RoundingMode::HalfEven)?;
        let next = divide_digits(
            &add_digits(&x, &quotient),
            &Digits::two(),
            work,
            RoundingMode::HalfEven,
        )?;
        let next_settled = round_digits(next.clone(), scale, RoundingMode::HalfUp).to_canonical();
        if next_settled == settled {
            return Ok(round_digits(next, scale, RoundingMode::HalfUp));
        }
        settled = next_settled;
        x = next;
    }
    Ok(round_digits(x, scale, RoundingMode::HalfUp))
}

/// Floating-point seed for the Newton iteration; falls back to 1 when
/// the seed is unusable (out of range, zero).
fn initial_sqrt_guess(value: &Digits, work: usize) -> Digits {
    let approx: Option<f64> = value.to_canonical().parse().ok();
    let guess = approx.map(f64::sqrt).filter(|g| g.is_finite() && *g > 0.0);
    match guess {
        Some(g) => {
            let formatted = format!("{:.*}", work.min(17), g);
            match parse(&formatted) {
                Ok(d) if !d.is_zero() => d,
                _ => Digits::one(),
            }
        }
        None => Digits::one(),
    }
}

impl ArithmeticBackend for ManualBackend {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn normalize(&self, value: &str) -> Result<String> {
        Ok(parse(value)?.to_canonical())
    }

    fn add(&self, a: &str, b: &str) -> Result<String> {
        Ok(add_digits(&parse(a)?, &parse(b)?).to_canonical())
    }

    fn subtract(&self, a: &str, b: &str) -> Result<String> {
        Ok(add_digits(&parse(a)?, &negate_digits(&parse(b)?)).to_canonical())
    }

    fn multiply(&self, a: &str, b: &str) -> Result<String> {
        Ok(mul_digits(&parse(a)?, &parse(b)?).to_canonical())
    }

    fn divide(&self, a: &str, b: &str, scale: u32, mode: RoundingMode) -> Result<String> {
        Ok(divide_digits(&parse(a)?, &parse(b)?, scale as usize, mode)?.to_canonical())
    }

    fn power(&self, a: &str, exponent: &str) -> Result<String> {
        let base = parse(a)?;
        let exp = parse(exponent)?;
        if exp.scale == 0 {
            let magnitude = exp
                .digits
                .iter()
                .try_fold(0u64, |acc, &d| {
                    acc.checked_mul(10)?.checked_add(d as u64)
                })
                .ok_or_else(|| {
                    CalcError::argument(format!("exponent out of range: {exponent}"))
                })?;
            if magnitude == 0 {
                return Ok("1".to_string());
            }
            if base.is_zero() && exp.negative {
                return Err(CalcError::operation("division by zero"));
            }
            let raised = pow_integer(&base, magnitude);
            if exp.negative {
                let inverted = divide_digits(
                    &Digits::one(),
                    &raised,
                    DEFAULT_SCALE as usize,
                    RoundingMode::HalfUp,
                )?;
                return Ok(inverted.to_canonical());
            }
            return Ok(raised.to_canonical());
        }
        // Fractional exponent: floating-point fallback.
        let base_f: f64 = base
            .to_canonical()
            .parse()
            .map_err(|_| CalcError::operation(format!("cannot evaluate {a} ^ {exponent}")))?;
        let exp_f: f64 = exp
            .to_canonical()
            .parse()
            .map_err(|_| CalcError::operation(format!("cannot evaluate {a} ^ {exponent}")))?;
        let approx = base_f.powf(exp_f);
        if !approx.is_finite() {
            return Err(CalcError::operation(format!(
                "non-finite result for {a} ^ {exponent}"
            )));
        }
        Ok(parse(&format!("{approx:.12}"))?.to_canonical())
    }

    fn sqrt(&self, a: &str, scale: u32) -> Result<String> {
        Ok(sqrt_digits(&parse(a)?, scale as usize)?.to_canonical())
    }

    fn round(&self, a: &str, precision: u32, mode: RoundingMode) -> Result<String> {
        Ok(round_digits(parse(a)?, precision as usize, mode).to_canonical())
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(cmp_digits(&parse(a)?, &parse(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn backend() -> ManualBackend {
        ManualBackend::new()
    }

    #[test]
    fn test_parse_and_canonical() {
        let b = backend();
        assert_eq!(b.normalize("007.250").unwrap(), "7.25");
        assert_eq!(b.normalize(".5").unwrap(), "0.5");
        assert_eq!(b.normalize("5.").unwrap(), "5");
        assert_eq!(b.normalize("-0.0").unwrap(), "0");
        assert_eq!(b.normalize("+12").unwrap(), "12");
        assert!(b.normalize("").is_err());
        assert!(b.normalize(".").is_err());
        assert!(b.normalize("1e5").is_err());
        assert!(b.normalize("--1").is_err());
    }

    #[test]
    fn test_addition_and_subtraction() {
        let b = backend();
        assert_eq!(b.add("0.1", "0.2").unwrap(), "0.3");
        assert_eq!(b.add("999", "1").unwrap(), "1000");
        assert_eq!(b.add("-1.5", "1.5").unwrap(), "0");
        assert_eq!(b.add("-2", "0.5").unwrap(), "-1.5");
        assert_eq!(b.subtract("1", "0.999").unwrap(), "0.001");
        assert_eq!(b.subtract("0.5", "2").unwrap(), "-1.5");
    }

    #[test]
    fn test_multiplication() {
        let b = backend();
        assert_eq!(b.multiply("1.5", "2").unwrap(), "3");
        assert_eq!(b.multiply("-0.25", "0.25").unwrap(), "-0.0625");
        assert_eq!(b.multiply("123456789", "987654321").unwrap(), "121932631112635269");
        assert_eq!(b.multiply("0", "-4.2").unwrap(), "0");
    }

    #[test]
    fn test_division_with_guard_digit() {
        let b = backend();
        assert_eq!(b.divide("1", "3", 4, RoundingMode::HalfUp).unwrap(), "0.3333");
        assert_eq!(b.divide("2", "3", 4, RoundingMode::HalfUp).unwrap(), "0.6667");
        assert_eq!(b.divide("2", "3", 4, RoundingMode::Down).unwrap(), "0.6666");
        assert_eq!(b.divide("1", "8", 2, RoundingMode::HalfEven).unwrap(), "0.12");
        assert_eq!(b.divide("-1", "3", 4, RoundingMode::Floor).unwrap(), "-0.3334");
        assert_eq!(b.divide("10", "4", 0, RoundingMode::HalfUp).unwrap(), "3");
        assert!(matches!(
            b.divide("1", "0", 4, RoundingMode::HalfUp),
            Err(CalcError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_rounding_mode_table() {
        let b = backend();
        assert_eq!(b.round("2.345", 2, RoundingMode::HalfUp).unwrap(), "2.35");
        assert_eq!(b.round("2.345", 2, RoundingMode::HalfDown).unwrap(), "2.34");
        assert_eq!(b.round("2.345", 2, RoundingMode::HalfEven).unwrap(), "2.34");
        assert_eq!(b.round("2.345", 2, RoundingMode::HalfOdd).unwrap(), "2.35");
        assert_eq!(b.round("2.355", 2, RoundingMode::HalfEven).unwrap(), "2.36");
        assert_eq!(b.round("2.355", 2, RoundingMode::HalfOdd).unwrap(), "2.35");
        assert_eq!(b.round("2.341", 2, RoundingMode::Up).unwrap(), "2.35");
        assert_eq!(b.round("2.349", 2, RoundingMode::Down).unwrap(), "2.34");
        assert_eq!(b.round("-2.341", 2, RoundingMode::Ceiling).unwrap(), "-2.34");
        assert_eq!(b.round("-2.341", 2, RoundingMode::Floor).unwrap(), "-2.35");
    }

    #[test]
    fn test_round_carry_propagation() {
        let b = backend();
        assert_eq!(b.round("9.99", 1, RoundingMode::HalfUp).unwrap(), "10");
        assert_eq!(b.round("0.999", 2, RoundingMode::Up).unwrap(), "1");
        assert_eq!(b.round("-9.95", 1, RoundingMode::HalfUp).unwrap(), "-10");
    }

    #[test]
    fn test_power() {
        let b = backend();
        assert_eq!(b.power("2", "10").unwrap(), "1024");
        assert_eq!(b.power("1.1", "2").unwrap(), "1.21");
        assert_eq!(b.power("5", "0").unwrap(), "1");
        assert_eq!(b.power("2", "-2").unwrap(), "0.25");
        assert_eq!(b.power("-2", "3").unwrap(), "-8");
        assert_eq!(b.power("9", "0.5").unwrap(), "3");
        assert!(matches!(
            b.power("0", "-1"),
            Err(CalcError::InvalidOperation(_))
        ));
        assert!(matches!(
            b.power("-4", "0.5"),
            Err(CalcError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_newton_sqrt() {
        let b = backend();
        assert_eq!(b.sqrt("9", 10).unwrap(), "3");
        assert_eq!(b.sqrt("0", 10).unwrap(), "0");
        assert_eq!(b.sqrt("2", 10).unwrap(), "1.4142135624");
        assert_eq!(b.sqrt("152.2756", 4).unwrap(), "12.34");
        assert_eq!(b.sqrt("0.25", 10).unwrap(), "0.5");
        assert!(matches!(b.sqrt("-1", 4), Err(CalcError::InvalidOperation(_))));
    }

    #[test]
    fn test_compare() {
        let b = backend();
        assert_eq!(b.compare("1.50", "1.5").unwrap(), Ordering::Equal);
        assert_eq!(b.compare("-2", "1").unwrap(), Ordering::Less);
        assert_eq!(b.compare("-1", "-2").unwrap(), Ordering::Greater);
        assert_eq!(b.compare("3.01", "3.001").unwrap(), Ordering::Greater);
        assert_eq!(b.compare("0", "-0.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_abs_negate_defaults() {
        let b = backend();
        assert_eq!(b.abs("-12.5").unwrap(), "12.5");
        assert_eq!(b.negate("12.5").unwrap(), "-12.5");
        assert_eq!(b.negate("-0").unwrap(), "0");
    }
}
