//! The application-facing calculation surface

use crate::convert::Converter;
use crate::defaults::DefaultHolder;
use crate::error::{CalcError, Result};
use crate::number::{Number, RoundingMode, DEFAULT_ROUNDING, DEFAULT_SCALE};
use crate::registry::{FormulaUnitRegistry, ResultQuantityRegistry, UnitRegistry};
use crate::types::{DimensionalFormula, Quantity, Unit};
use std::cmp::Ordering;
use std::sync::Arc;

static DEFAULT: DefaultHolder<Calculator> = DefaultHolder::new();

/// Working precision added on top of the requested scale for
/// intermediate base-unit arithmetic, so the final rounding decides.
const GUARD_SCALE: u32 = 2;

/// Dimension-checked arithmetic over quantities.
///
/// Pure orchestration: no state beyond the four injected collaborators,
/// and every operation returns a new quantity, leaving its inputs
/// untouched. Cross-unit operations route through SI base units; derived
/// results get their unit from the formula-unit registry and their
/// concrete type from the result-quantity registry.
#[derive(Debug)]
pub struct Calculator {
    converter: Arc<Converter>,
    units: Arc<UnitRegistry>,
    result_types: Arc<ResultQuantityRegistry>,
    formula_units: Arc<FormulaUnitRegistry>,
}

impl Calculator {
    pub fn new(
        converter: Arc<Converter>,
        units: Arc<UnitRegistry>,
        result_types: Arc<ResultQuantityRegistry>,
        formula_units: Arc<FormulaUnitRegistry>,
    ) -> Self {
        Self {
            converter,
            units,
            result_types,
            formula_units,
        }
    }

    /// Build a quantity of the type registered for `unit`.
    pub fn quantity(&self, value: Number, unit: &Unit) -> Result<Quantity> {
        self.units.make_quantity(value, unit)
    }

    fn check_compatible(&self, operation: &str, a: &Quantity, b: &Quantity) -> Result<()> {
        let lhs = a.unit().dimension();
        let rhs = b.unit().dimension();
        if !lhs.is_compatible_with(rhs) {
            return Err(CalcError::operation(format!(
                "cannot {operation} quantities of dimension {} and {}",
                lhs.name(),
                rhs.name()
            )));
        }
        Ok(())
    }

    /// `b`'s value expressed in `a`'s unit; same identity skips the
    /// registries entirely.
    fn aligned_value(&self, a: &Quantity, b: &Quantity) -> Result<Number> {
        if a.unit() == b.unit() {
            Ok(b.value().clone())
        } else {
            self.converter
                .convert(b.value(), b.unit(), a.unit(), DEFAULT_SCALE, DEFAULT_ROUNDING)
        }
    }

    /// Dimension-checked addition; the result keeps `a`'s unit and type.
    pub fn add(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        self.check_compatible("add", a, b)?;
        let value = a.value().add(&self.aligned_value(a, b)?)?;
        Ok(Quantity::new(value, a.unit().clone(), a.kind().clone()))
    }

    /// Dimension-checked subtraction; the result keeps `a`'s unit and
    /// type.
    pub fn subtract(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        self.check_compatible("subtract", a, b)?;
        let value = a.value().subtract(&self.aligned_value(a, b)?)?;
        Ok(Quantity::new(value, a.unit().clone(), a.kind().clone()))
    }

    /// Three-way comparison after aligning `b` into `a`'s unit.
    pub fn compare(&self, a: &Quantity, b: &Quantity) -> Result<Ordering> {
        self.check_compatible("compare", a, b)?;
        a.value().compare(&self.aligned_value(a, b)?)
    }

    /// Scale a quantity by a plain number; unit and type are unchanged.
    pub fn multiply_by_scalar(&self, q: &Quantity, scalar: &Number) -> Result<Quantity> {
        let value = q.value().multiply(scalar)?;
        Ok(Quantity::new(value, q.unit().clone(), q.kind().clone()))
    }

    pub fn divide_by_scalar(&self, q: &Quantity, scalar: &Number) -> Result<Quantity> {
        self.divide_by_scalar_with(q, scalar, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn divide_by_scalar_with(
        &self,
        q: &Quantity,
        scalar: &Number,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let value = q.value().divide(scalar, scale, mode)?;
        Ok(Quantity::new(value, q.unit().clone(), q.kind().clone()))
    }

    /// Cross-quantity product in the default result unit at default
    /// precision.
    pub fn multiply(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        self.multiply_with(a, b, None, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn multiply_with(
        &self,
        a: &Quantity,
        b: &Quantity,
        result_unit: Option<&Unit>,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let formula = a
            .unit()
            .dimension()
            .formula()
            .multiply(b.unit().dimension().formula());
        let base = self
            .converter
            .to_base_unit(a.value(), a.unit())?
            .multiply(&self.converter.to_base_unit(b.value(), b.unit())?)?;
        self.derived(a, formula, result_unit, base, scale, mode)
    }

    /// Cross-quantity quotient in the default result unit at default
    /// precision.
    pub fn divide(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        self.divide_with(a, b, None, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn divide_with(
        &self,
        a: &Quantity,
        b: &Quantity,
        result_unit: Option<&Unit>,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let formula = a
            .unit()
            .dimension()
            .formula()
            .divide(b.unit().dimension().formula());
        let base = self.converter.to_base_unit(a.value(), a.unit())?.divide(
            &self.converter.to_base_unit(b.value(), b.unit())?,
            scale + GUARD_SCALE,
            RoundingMode::HalfEven,
        )?;
        self.derived(a, formula, result_unit, base, scale, mode)
    }

    /// Integer power of a quantity; the dimensional formula is raised
    /// alongside the value.
    pub fn power(&self, q: &Quantity, exponent: i32) -> Result<Quantity> {
        self.power_with(q, exponent, None, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn power_with(
        &self,
        q: &Quantity,
        exponent: i32,
        result_unit: Option<&Unit>,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let formula = q.unit().dimension().formula().power(exponent);
        let base = self
            .converter
            .to_base_unit(q.value(), q.unit())?
            .powi(exponent as i64)?;
        self.derived(q, formula, result_unit, base, scale, mode)
    }

    /// Square root of a quantity. Fails with `InvalidOperation` when the
    /// dimensional formula has an odd exponent.
    pub fn sqrt(&self, q: &Quantity) -> Result<Quantity> {
        self.sqrt_with(q, None, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn sqrt_with(
        &self,
        q: &Quantity,
        result_unit: Option<&Unit>,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let formula = q.unit().dimension().formula().root(2)?;
        let base = self
            .converter
            .to_base_unit(q.value(), q.unit())?
            .sqrt(scale + GUARD_SCALE)?;
        self.derived(q, formula, result_unit, base, scale, mode)
    }

    /// Dimensionless ratio of two compatible quantities.
    pub fn ratio(&self, a: &Quantity, b: &Quantity) -> Result<Number> {
        self.ratio_with(a, b, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn ratio_with(
        &self,
        a: &Quantity,
        b: &Quantity,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Number> {
        self.check_compatible("take the ratio of", a, b)?;
        let a_base = self.converter.to_base_unit(a.value(), a.unit())?;
        let b_base = self.converter.to_base_unit(b.value(), b.unit())?;
        a_base.divide(&b_base, scale, mode)
    }

    /// Left fold of [`Calculator::add`]; the first quantity anchors the
    /// result unit. The mandatory `first` argument enforces "at least
    /// one" at the type level.
    pub fn sum(&self, first: &Quantity, rest: &[Quantity]) -> Result<Quantity> {
        rest.iter().try_fold(first.clone(), |acc, q| self.add(&acc, q))
    }

    pub fn average(&self, first: &Quantity, rest: &[Quantity]) -> Result<Quantity> {
        self.average_with(first, rest, DEFAULT_SCALE, DEFAULT_ROUNDING)
    }

    pub fn average_with(
        &self,
        first: &Quantity,
        rest: &[Quantity],
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let total = self.sum(first, rest)?;
        let count = Number::from(rest.len() as i64 + 1);
        self.divide_by_scalar_with(&total, &count, scale, mode)
    }

    pub fn abs(&self, q: &Quantity) -> Result<Quantity> {
        Ok(Quantity::new(
            q.value().abs()?,
            q.unit().clone(),
            q.kind().clone(),
        ))
    }

    pub fn negate(&self, q: &Quantity) -> Result<Quantity> {
        Ok(Quantity::new(
            q.value().negate()?,
            q.unit().clone(),
            q.kind().clone(),
        ))
    }

    /// Round the value to `precision` fractional digits; unit and type
    /// are unchanged.
    pub fn round(&self, q: &Quantity, precision: u32, mode: RoundingMode) -> Result<Quantity> {
        Ok(Quantity::new(
            q.value().round(precision, mode)?,
            q.unit().clone(),
            q.kind().clone(),
        ))
    }

    pub fn floor(&self, q: &Quantity, precision: u32) -> Result<Quantity> {
        self.round(q, precision, RoundingMode::Floor)
    }

    pub fn ceil(&self, q: &Quantity, precision: u32) -> Result<Quantity> {
        self.round(q, precision, RoundingMode::Ceiling)
    }

    /// Shared tail of the derived-quantity operations: resolve the
    /// result unit, validate its dimension against the computed formula,
    /// convert the base-unit result into it, and instantiate the
    /// concrete quantity type resolved from the source operand.
    fn derived(
        &self,
        source: &Quantity,
        formula: DimensionalFormula,
        result_unit: Option<&Unit>,
        base: Number,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let unit = match result_unit {
            Some(unit) => unit.clone(),
            None => self.resolve_result_unit(&formula, source)?,
        };
        if unit.dimension().formula() != &formula {
            return Err(CalcError::operation(format!(
                "result unit '{}' has dimension {} ({}) but the operation yields {}",
                unit.name(),
                unit.dimension().name(),
                unit.dimension().formula(),
                formula
            )));
        }
        let value = self.converter.from_base_unit(&base, &unit, scale, mode)?;
        let quantity_type = self.result_types.quantity_type(source.kind(), &formula)?;
        Ok(quantity_type.construct(value, unit))
    }

    /// Default unit for a formula. When the registry's general default
    /// sits in a different system than the source operand, prefer the
    /// source system's own default so imperial-in stays imperial-out.
    fn resolve_result_unit(&self, formula: &DimensionalFormula, source: &Quantity) -> Result<Unit> {
        let unit = self.formula_units.get_unit(formula)?;
        let source_system = source.unit().system();
        if unit.system() != source_system {
            if let Ok(matched) = self
                .formula_units
                .get_unit_for_system(formula, source_system)
            {
                return Ok(matched);
            }
        }
        Ok(unit)
    }

    /// Lazily-created process-wide default instance, wired to the
    /// default converter and registries.
    pub fn default_instance() -> Arc<Self> {
        DEFAULT.get_or_init(|| {
            Calculator::new(
                Converter::default_instance(),
                UnitRegistry::default_instance(),
                ResultQuantityRegistry::default_instance(),
                FormulaUnitRegistry::default_instance(),
            )
        })
    }

    pub fn set_default_instance(instance: Arc<Self>) {
        DEFAULT.replace(instance);
    }

    pub fn reset_default_instance() {
        DEFAULT.reset();
    }
}
