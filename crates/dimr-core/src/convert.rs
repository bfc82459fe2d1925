//! Value conversion between units of one dimension

use crate::defaults::DefaultHolder;
use crate::error::{CalcError, Result};
use crate::number::{Number, RoundingMode};
use crate::registry::{ConversionFactorRegistry, UnitRegistry};
use crate::types::{Quantity, Unit};
use std::sync::Arc;

static DEFAULT: DefaultHolder<Converter> = DefaultHolder::new();

/// Converts numbers between units by routing through the dimension's
/// base unit. Collaborators are injected; the process-wide default wires
/// the registries' default instances together.
#[derive(Debug)]
pub struct Converter {
    factors: Arc<ConversionFactorRegistry>,
    units: Arc<UnitRegistry>,
}

impl Converter {
    pub fn new(factors: Arc<ConversionFactorRegistry>, units: Arc<UnitRegistry>) -> Self {
        Self { factors, units }
    }

    pub fn factors(&self) -> &Arc<ConversionFactorRegistry> {
        &self.factors
    }

    pub fn units(&self) -> &Arc<UnitRegistry> {
        &self.units
    }

    /// Value expressed in the dimension's base unit. Exact; no rounding.
    pub fn to_base_unit(&self, value: &Number, unit: &Unit) -> Result<Number> {
        self.factors.rule_for(unit)?.to_base(value)
    }

    /// Base-unit value expressed in `unit`, rounded to `scale` under
    /// `mode`.
    pub fn from_base_unit(
        &self,
        base: &Number,
        unit: &Unit,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Number> {
        self.factors.rule_for(unit)?.from_base(base, scale, mode)
    }

    /// Convert between two units of the same dimension. Identical unit
    /// identities short-circuit without touching the registries.
    pub fn convert(
        &self,
        value: &Number,
        from: &Unit,
        to: &Unit,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Number> {
        if from == to {
            return Ok(value.clone());
        }
        if !from.dimension().is_compatible_with(to.dimension()) {
            return Err(CalcError::operation(format!(
                "cannot convert from {} ({}) to {} ({})",
                from.dimension().name(),
                from.dimension().formula(),
                to.dimension().name(),
                to.dimension().formula()
            )));
        }
        let base = self.to_base_unit(value, from)?;
        self.from_base_unit(&base, to, scale, mode)
    }

    /// Convert a quantity into another unit, re-packaging through the
    /// unit registry's quantity-type lookup.
    pub fn convert_quantity(
        &self,
        quantity: &Quantity,
        to: &Unit,
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let value = self.convert(quantity.value(), quantity.unit(), to, scale, mode)?;
        self.units.make_quantity(value, to)
    }

    /// Lazily-created process-wide default instance, wired to the
    /// default registries.
    pub fn default_instance() -> Arc<Self> {
        DEFAULT.get_or_init(|| {
            Converter::new(
                ConversionFactorRegistry::default_instance(),
                UnitRegistry::default_instance(),
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
