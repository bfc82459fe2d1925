//! Dimensional formulas over the seven SI base dimensions

use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical quantity's "shape": one integer exponent per SI base
/// dimension. Two quantities may be added or compared iff their formulas
/// are equal; multiplication and division combine formulas exponent-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionalFormula {
    length: i32,
    mass: i32,
    time: i32,
    current: i32,
    temperature: i32,
    amount: i32,
    luminosity: i32,
}

impl DimensionalFormula {
    /// The dimensionless formula (all exponents zero).
    pub const DIMENSIONLESS: DimensionalFormula = DimensionalFormula::new(0, 0, 0, 0, 0, 0, 0);

    /// Length (L).
    pub const LENGTH: DimensionalFormula = DimensionalFormula::new(1, 0, 0, 0, 0, 0, 0);
    /// Mass (M).
    pub const MASS: DimensionalFormula = DimensionalFormula::new(0, 1, 0, 0, 0, 0, 0);
    /// Time (T).
    pub const TIME: DimensionalFormula = DimensionalFormula::new(0, 0, 1, 0, 0, 0, 0);
    /// Electric current (I).
    pub const CURRENT: DimensionalFormula = DimensionalFormula::new(0, 0, 0, 1, 0, 0, 0);
    /// Thermodynamic temperature (Θ).
    pub const TEMPERATURE: DimensionalFormula = DimensionalFormula::new(0, 0, 0, 0, 1, 0, 0);
    /// Amount of substance (N).
    pub const AMOUNT: DimensionalFormula = DimensionalFormula::new(0, 0, 0, 0, 0, 1, 0);
    /// Luminous intensity (J).
    pub const LUMINOSITY: DimensionalFormula = DimensionalFormula::new(0, 0, 0, 0, 0, 0, 1);

    /// Build a formula from all seven exponents, in SI order
    /// (L, M, T, I, Θ, N, J).
    pub const fn new(
        length: i32,
        mass: i32,
        time: i32,
        current: i32,
        temperature: i32,
        amount: i32,
        luminosity: i32,
    ) -> Self {
        Self {
            length,
            mass,
            time,
            current,
            temperature,
            amount,
            luminosity,
        }
    }

    pub const fn length(&self) -> i32 {
        self.length
    }

    pub const fn mass(&self) -> i32 {
        self.mass
    }

    pub const fn time(&self) -> i32 {
        self.time
    }

    pub const fn current(&self) -> i32 {
        self.current
    }

    pub const fn temperature(&self) -> i32 {
        self.temperature
    }

    pub const fn amount(&self) -> i32 {
        self.amount
    }

    pub const fn luminosity(&self) -> i32 {
        self.luminosity
    }

    /// Exponents paired with their conventional dimension symbols,
    /// in SI order.
    pub fn exponents(&self) -> [(char, i32); 7] {
        [
            ('L', self.length),
            ('M', self.mass),
            ('T', self.time),
            ('I', self.current),
            ('Θ', self.temperature),
            ('N', self.amount),
            ('J', self.luminosity),
        ]
    }

    /// Formula of a product: exponent-wise sum.
    pub const fn multiply(&self, other: &DimensionalFormula) -> DimensionalFormula {
        DimensionalFormula::new(
            self.length + other.length,
            self.mass + other.mass,
            self.time + other.time,
            self.current + other.current,
            self.temperature + other.temperature,
            self.amount + other.amount,
            self.luminosity + other.luminosity,
        )
    }

    /// Formula of a quotient: exponent-wise difference.
    pub const fn divide(&self, other: &DimensionalFormula) -> DimensionalFormula {
        DimensionalFormula::new(
            self.length - other.length,
            self.mass - other.mass,
            self.time - other.time,
            self.current - other.current,
            self.temperature - other.temperature,
            self.amount - other.amount,
            self.luminosity - other.luminosity,
        )
    }

    /// Formula of an integer power. `n` may be negative; zero yields the
    /// dimensionless formula.
    pub const fn power(&self, n: i32) -> DimensionalFormula {
        DimensionalFormula::new(
            self.length * n,
            self.mass * n,
            self.time * n,
            self.current * n,
            self.temperature * n,
            self.amount * n,
            self.luminosity * n,
        )
    }

    /// Formula of an n-th root: exponent-wise division.
    ///
    /// Fails if any exponent is not evenly divisible by `n`, naming the
    /// first offending dimension. A root of zero degree is rejected.
    pub fn root(&self, n: i32) -> Result<DimensionalFormula> {
        if n == 0 {
            return Err(CalcError::operation("cannot take a root of degree 0"));
        }
        for (symbol, exponent) in self.exponents() {
            if exponent % n != 0 {
                return Err(CalcError::operation(format!(
                    "cannot take root {n} of formula {self}: exponent {exponent} of {symbol} is not divisible by {n}"
                )));
            }
        }
        Ok(DimensionalFormula::new(
            self.length / n,
            self.mass / n,
            self.time / n,
            self.current / n,
            self.temperature / n,
            self.amount / n,
            self.luminosity / n,
        ))
    }

    /// True iff all seven exponents are zero.
    pub const fn is_dimensionless(&self) -> bool {
        self.length == 0
            && self.mass == 0
            && self.time == 0
            && self.current == 0
            && self.temperature == 0
            && self.amount == 0
            && self.luminosity == 0
    }

    /// Structural equality of all seven exponents: the sole criterion for
    /// whether two quantities may be added, subtracted, or compared.
    pub fn is_compatible_with(&self, other: &DimensionalFormula) -> bool {
        self == other
    }
}

impl fmt::Display for DimensionalFormula {
    /// Formats as e.g. `L^2 T^-1`; the dimensionless formula prints `1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let mut first = true;
        for (symbol, exponent) in self.exponents() {
            if exponent == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if exponent == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
        }
        Ok(())
    }
}

/// A named dimension: a human-readable label over a dimensional formula.
/// Error messages name dimensions, not raw exponent tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    name: String,
    formula: DimensionalFormula,
}

impl Dimension {
    pub fn new(name: impl Into<String>, formula: DimensionalFormula) -> Self {
        Self {
            name: name.into(),
            formula,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formula(&self) -> &DimensionalFormula {
        &self.formula
    }

    pub fn is_compatible_with(&self, other: &Dimension) -> bool {
        self.formula.is_compatible_with(&other.formula)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
