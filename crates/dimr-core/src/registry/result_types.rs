//! Result quantity-type resolution for derived results

use crate::defaults::DefaultHolder;
use crate::error::{CalcError, Result};
use crate::types::{DimensionalFormula, QuantityType, QuantityTypeId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT: DefaultHolder<ResultQuantityRegistry> = DefaultHolder::new();

type TypeMap = HashMap<QuantityTypeId, QuantityType>;
type SourceMap = HashMap<(QuantityTypeId, DimensionalFormula), QuantityTypeId>;
type GenericMap = HashMap<DimensionalFormula, QuantityTypeId>;

/// Decides which concrete quantity type a derived result becomes.
///
/// Resolution runs in three tiers: an exact (source type, formula)
/// entry; the same formula checked along the source type's declared
/// supertype chain; and finally a formula-only generic entry. Only if
/// all three miss does the lookup fail.
#[derive(Debug, Default)]
pub struct ResultQuantityRegistry {
    types: RwLock<TypeMap>,
    by_source: RwLock<SourceMap>,
    generic: RwLock<GenericMap>,
}

impl ResultQuantityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_types(&self) -> RwLockReadGuard<'_, TypeMap> {
        self.types.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_types(&self) -> RwLockWriteGuard<'_, TypeMap> {
        self.types.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_sources(&self) -> RwLockReadGuard<'_, SourceMap> {
        self.by_source.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_sources(&self) -> RwLockWriteGuard<'_, SourceMap> {
        self.by_source.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_generic(&self) -> RwLockReadGuard<'_, GenericMap> {
        self.generic.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_generic(&self) -> RwLockWriteGuard<'_, GenericMap> {
        self.generic.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make a quantity type known (and thereby constructible). Mapping
    /// entries may only reference types registered here first.
    pub fn register_type(&self, quantity_type: QuantityType) {
        self.write_types()
            .insert(quantity_type.id().clone(), quantity_type);
    }

    pub fn has_type(&self, id: &QuantityTypeId) -> bool {
        self.read_types().contains_key(id)
    }

    pub fn unregister_type(&self, id: &QuantityTypeId) -> bool {
        self.write_types().remove(id).is_some()
    }

    fn require_constructible(&self, id: &QuantityTypeId) -> Result<()> {
        if !self.has_type(id) {
            return Err(CalcError::argument(format!(
                "result type '{id}' has no registered constructor"
            )));
        }
        Ok(())
    }

    /// Register the result type for an exact (source type, formula)
    /// pair.
    pub fn register(
        &self,
        source: QuantityTypeId,
        formula: DimensionalFormula,
        result: QuantityTypeId,
    ) -> Result<()> {
        self.require_constructible(&result)?;
        self.write_sources().insert((source, formula), result);
        Ok(())
    }

    /// Register a formula-only fallback, independent of source type.
    pub fn register_generic(
        &self,
        formula: DimensionalFormula,
        result: QuantityTypeId,
    ) -> Result<()> {
        self.require_constructible(&result)?;
        self.write_generic().insert(formula, result);
        Ok(())
    }

    pub fn has(&self, source: &QuantityTypeId, formula: &DimensionalFormula) -> bool {
        self.read_sources()
            .contains_key(&(source.clone(), *formula))
    }

    pub fn has_generic(&self, formula: &DimensionalFormula) -> bool {
        self.read_generic().contains_key(formula)
    }

    pub fn unregister(&self, source: &QuantityTypeId, formula: &DimensionalFormula) -> bool {
        self.write_sources()
            .remove(&(source.clone(), *formula))
            .is_some()
    }

    pub fn unregister_generic(&self, formula: &DimensionalFormula) -> bool {
        self.write_generic().remove(formula).is_some()
    }

    pub fn reset(&self) {
        self.write_types().clear();
        self.write_sources().clear();
        self.write_generic().clear();
    }

    /// Resolve the concrete quantity type for a derived result.
    pub fn quantity_type(
        &self,
        source: &QuantityTypeId,
        formula: &DimensionalFormula,
    ) -> Result<QuantityType> {
        let resolved = self
            .resolve_exact(source, formula)
            .or_else(|| self.resolve_via_supertypes(source, formula))
            .or_else(|| self.read_generic().get(formula).cloned())
            .ok_or_else(|| {
                CalcError::argument(format!(
                    "no result quantity type registered for source '{source}' and formula {formula}"
                ))
            })?;
        self.read_types().get(&resolved).cloned().ok_or_else(|| {
            CalcError::argument(format!(
                "result type '{resolved}' has no registered constructor"
            ))
        })
    }

    fn resolve_exact(
        &self,
        source: &QuantityTypeId,
        formula: &DimensionalFormula,
    ) -> Option<QuantityTypeId> {
        self.read_sources()
            .get(&(source.clone(), *formula))
            .cloned()
    }

    /// Breadth-first walk of the declared supertype chain, nearest
    /// ancestors first. A visited set guards against declaration cycles.
    fn resolve_via_supertypes(
        &self,
        source: &QuantityTypeId,
        formula: &DimensionalFormula,
    ) -> Option<QuantityTypeId> {
        let types = self.read_types();
        let sources = self.read_sources();
        let mut visited: HashSet<QuantityTypeId> = HashSet::new();
        visited.insert(source.clone());
        let mut queue: VecDeque<QuantityTypeId> = types
            .get(source)
            .map(|t| t.supertypes().to_vec())
            .unwrap_or_default()
            .into();
        while let Some(ancestor) = queue.pop_front() {
            if !visited.insert(ancestor.clone()) {
                continue;
            }
            if let Some(result) = sources.get(&(ancestor.clone(), *formula)) {
                return Some(result.clone());
            }
            if let Some(declared) = types.get(&ancestor) {
                queue.extend(declared.supertypes().iter().cloned());
            }
        }
        None
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
