//! Default result units, keyed by dimensional formula

use crate::defaults::DefaultHolder;
use crate::error::{CalcError, Result};
use crate::types::{DimensionalFormula, Unit, UnitSystem};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT: DefaultHolder<FormulaUnitRegistry> = DefaultHolder::new();

type FormulaMap = HashMap<DimensionalFormula, Unit>;
type SystemMap = HashMap<(DimensionalFormula, UnitSystem), Unit>;

/// Maps a dimensional formula to the unit a derived result should come
/// out in when the caller supplies none. A secondary per-system table
/// keeps derived results in the same unit system as their operands
/// (imperial in, imperial out).
#[derive(Debug, Default)]
pub struct FormulaUnitRegistry {
    defaults: RwLock<FormulaMap>,
    by_system: RwLock<SystemMap>,
}

impl FormulaUnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_defaults(&self) -> RwLockReadGuard<'_, FormulaMap> {
        self.defaults.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_defaults(&self) -> RwLockWriteGuard<'_, FormulaMap> {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_systems(&self) -> RwLockReadGuard<'_, SystemMap> {
        self.by_system.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_systems(&self) -> RwLockWriteGuard<'_, SystemMap> {
        self.by_system.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_dimension(formula: &DimensionalFormula, unit: &Unit) -> Result<()> {
        if unit.dimension().formula() != formula {
            return Err(CalcError::argument(format!(
                "unit '{}' has dimension {} ({}) and cannot be the default for formula {}",
                unit.name(),
                unit.dimension().name(),
                unit.dimension().formula(),
                formula
            )));
        }
        Ok(())
    }

    /// Register the general default unit for a formula. The unit also
    /// becomes the default for its own system.
    pub fn register(&self, formula: DimensionalFormula, unit: Unit) -> Result<()> {
        Self::check_dimension(&formula, &unit)?;
        self.write_systems()
            .insert((formula, unit.system()), unit.clone());
        self.write_defaults().insert(formula, unit);
        Ok(())
    }

    /// Register a per-system default without touching the general one.
    pub fn register_for_system(
        &self,
        formula: DimensionalFormula,
        system: UnitSystem,
        unit: Unit,
    ) -> Result<()> {
        Self::check_dimension(&formula, &unit)?;
        self.write_systems().insert((formula, system), unit);
        Ok(())
    }

    pub fn has(&self, formula: &DimensionalFormula) -> bool {
        self.read_defaults().contains_key(formula)
    }

    pub fn has_for_system(&self, formula: &DimensionalFormula, system: UnitSystem) -> bool {
        self.read_systems().contains_key(&(*formula, system))
    }

    /// Remove the general default and every per-system entry for the
    /// formula.
    pub fn unregister(&self, formula: &DimensionalFormula) -> bool {
        let removed = self.write_defaults().remove(formula).is_some();
        self.write_systems().retain(|(f, _), _| f != formula);
        removed
    }

    pub fn reset(&self) {
        self.write_defaults().clear();
        self.write_systems().clear();
    }

    /// The general default unit for a formula; `InvalidArgument` if none
    /// was registered.
    pub fn get_unit(&self, formula: &DimensionalFormula) -> Result<Unit> {
        self.read_defaults().get(formula).cloned().ok_or_else(|| {
            CalcError::argument(format!("no unit registered for formula {formula}"))
        })
    }

    /// The default unit for a formula within one unit system.
    pub fn get_unit_for_system(
        &self,
        formula: &DimensionalFormula,
        system: UnitSystem,
    ) -> Result<Unit> {
        self.read_systems()
            .get(&(*formula, system))
            .cloned()
            .ok_or_else(|| {
                CalcError::argument(format!(
                    "no {system} unit registered for formula {formula}"
                ))
            })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    const AREA: DimensionalFormula = DimensionalFormula::LENGTH.power(2);

    fn square_meter() -> Unit {
        Unit::new(
            "square meter",
            "m^2",
            Dimension::new("Area", AREA),
            UnitSystem::Si,
        )
    }

    fn square_foot() -> Unit {
        Unit::new(
            "square foot",
            "ft^2",
            Dimension::new("Area", AREA),
            UnitSystem::Imperial,
        )
    }

    #[test]
    fn test_lookup_failure_names_formula() {
        let registry = FormulaUnitRegistry::new();
        let err = registry.get_unit(&AREA).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: no unit registered for formula L^2"
        );
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = FormulaUnitRegistry::new();
        let sqm = square_meter();
        let sqft = square_foot();
        registry.register(AREA, sqm.clone()).unwrap();
        registry
            .register_for_system(AREA, UnitSystem::Imperial, sqft.clone())
            .unwrap();

        assert_eq!(registry.get_unit(&AREA).unwrap(), sqm);
        // Registering the general default also claims its own system slot.
        assert_eq!(
            registry.get_unit_for_system(&AREA, UnitSystem::Si).unwrap(),
            sqm
        );
        assert_eq!(
            registry
                .get_unit_for_system(&AREA, UnitSystem::Imperial)
                .unwrap(),
            sqft
        );
        assert!(registry
            .get_unit_for_system(&AREA, UnitSystem::Metric)
            .is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let registry = FormulaUnitRegistry::new();
        let result = registry.register(DimensionalFormula::LENGTH, square_meter());
        assert!(matches!(result, Err(CalcError::InvalidArgument(_))));
    }

    #[test]
    fn test_unregister_clears_system_entries() {
        let registry = FormulaUnitRegistry::new();
        registry.register(AREA, square_meter()).unwrap();
        registry
            .register_for_system(AREA, UnitSystem::Imperial, square_foot())
            .unwrap();
        assert!(registry.unregister(&AREA));
        assert!(!registry.has(&AREA));
        assert!(!registry.has_for_system(&AREA, UnitSystem::Imperial));
    }
}
