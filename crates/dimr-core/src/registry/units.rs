//! Unit-to-quantity-type registry with filtering helpers

use crate::defaults::DefaultHolder;
use crate::error::{CalcError, Result};
use crate::number::Number;
use crate::types::{DimensionalFormula, Quantity, QuantityType, Unit, UnitSystem};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT: DefaultHolder<UnitRegistry> = DefaultHolder::new();

/// Knows, for each unit, which quantity type constructs values carrying
/// it, and answers filtered unit listings for the boundary layers.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    entries: RwLock<HashMap<Unit, QuantityType>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Unit, QuantityType>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Unit, QuantityType>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, unit: Unit, quantity_type: QuantityType) {
        self.write().insert(unit, quantity_type);
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

    /// The quantity type owning a unit; `InvalidArgument` for units
    /// never registered.
    pub fn quantity_type(&self, unit: &Unit) -> Result<QuantityType> {
        self.read().get(unit).cloned().ok_or_else(|| {
            CalcError::argument(format!("unit '{}' is not registered", unit.name()))
        })
    }

    /// Construct a quantity of the type registered for `unit`.
    pub fn make_quantity(&self, value: Number, unit: &Unit) -> Result<Quantity> {
        Ok(self.quantity_type(unit)?.construct(value, unit.clone()))
    }

    fn filtered(&self, keep: impl Fn(&Unit) -> bool) -> Vec<Unit> {
        let mut units: Vec<Unit> = self.read().keys().filter(|u| keep(u)).cloned().collect();
        units.sort_by(|a, b| a.name().cmp(b.name()));
        units
    }

    /// All registered units, sorted by name.
    pub fn units(&self) -> Vec<Unit> {
        self.filtered(|_| true)
    }

    pub fn units_for_dimension(&self, formula: &DimensionalFormula) -> Vec<Unit> {
        self.filtered(|u| u.dimension().formula() == formula)
    }

    pub fn units_for_system(&self, system: UnitSystem) -> Vec<Unit> {
        self.filtered(|u| u.system() == system)
    }

    pub fn metric_units(&self) -> Vec<Unit> {
        self.units_for_system(UnitSystem::Metric)
    }

    pub fn imperial_units(&self) -> Vec<Unit> {
        self.units_for_system(UnitSystem::Imperial)
    }

    pub fn si_units(&self) -> Vec<Unit> {
        self.units_for_system(UnitSystem::Si)
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
