//! Conversion rules and the unit-to-base-factor registry

use crate::defaults::DefaultHolder;
use crate::error::{CalcError, Result};
use crate::number::{Number, RoundingMode};
use crate::types::Unit;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT: DefaultHolder<ConversionFactorRegistry> = DefaultHolder::new();

/// How a unit's values map to its dimension's base unit.
///
/// Most units are a plain multiplicative factor; affine units such as
/// Celsius carry an additional offset applied after scaling.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionRule {
    Linear { factor: Number },
    Affine { factor: Number, offset: Number },
}

impl ConversionRule {
    pub fn linear(factor: Number) -> Self {
        ConversionRule::Linear { factor }
    }

    pub fn affine(factor: Number, offset: Number) -> Self {
        ConversionRule::Affine { factor, offset }
    }

    /// The multiplicative factor to the base unit.
    pub fn factor(&self) -> &Number {
        match self {
            ConversionRule::Linear { factor } | ConversionRule::Affine { factor, .. } => factor,
        }
    }

    /// `base = value * factor (+ offset)`. Exact: no rounding happens on
    /// the way into base units.
    pub fn to_base(&self, value: &Number) -> Result<Number> {
        match self {
            ConversionRule::Linear { factor } => value.multiply(factor),
            ConversionRule::Affine { factor, offset } => value.multiply(factor)?.add(offset),
        }
    }

    /// `value = (base - offset) / factor`, rounded to `scale` under
    /// `mode`.
    pub fn from_base(&self, base: &Number, scale: u32, mode: RoundingMode) -> Result<Number> {
        match self {
            ConversionRule::Linear { factor } => base.divide(factor, scale, mode),
            ConversionRule::Affine { factor, offset } => {
                base.subtract(offset)?.divide(factor, scale, mode)
            }
        }
    }
}

/// Registry of conversion rules, keyed by unit identity.
#[derive(Debug, Default)]
pub struct ConversionFactorRegistry {
    rules: RwLock<HashMap<Unit, ConversionRule>>,
}

impl ConversionFactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Unit, ConversionRule>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Unit, ConversionRule>> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or replace) the rule for a unit. A zero factor is
    /// rejected: it could never be inverted on the way out of base
    /// units.
    pub fn register(&self, unit: Unit, rule: ConversionRule) -> Result<()> {
        if rule.factor().is_zero() {
            return Err(CalcError::argument(format!(
                "conversion factor for unit '{}' must be non-zero",
                unit.name()
            )));
        }
        self.write().insert(unit, rule);
        Ok(())
    }

    pub fn has(&self, unit: &Unit) -> bool {
        self.read().contains_key(unit)
    }

    pub fn unregister(&self, unit: &Unit) -> bool {
        self.write().remove(unit).is_some()
    }

    pub fn reset(&self) {
        self.write().clear();
    }

    /// The rule for a unit; `InvalidArgument` if the unit was never
    /// registered.
    pub fn rule_for(&self, unit: &Unit) -> Result<ConversionRule> {
        self.read().get(unit).cloned().ok_or_else(|| {
            CalcError::argument(format!(
                "unit '{}' has no registered conversion rule",
                unit.name()
            ))
        })
    }

    /// The multiplicative factor to the base unit.
    pub fn factor_to_base(&self, unit: &Unit) -> Result<Number> {
        Ok(self.rule_for(unit)?.factor().clone())
    }

    /// Lazily-created process-wide default instance.
    pub fn default_instance() -> Arc<Self> {
        DEFAULT.get_or_init(Self::new)
    }

    pub fn set_default_instance(instance: Arc<Self>) {
        DEFAULT.replace(instance);
    }

    pub fn reset_default_instance() {
        DEFAULT.reset();
    }
}
