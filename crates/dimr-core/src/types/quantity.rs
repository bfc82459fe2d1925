//! Quantities and the quantity-type identity scheme

use crate::number::Number;
use crate::types::{Notation, Unit};
use std::fmt;
use std::sync::Arc;

/// Opaque identity token for a quantity type ("Length", "Area", ...).
///
/// Compared by content; no runtime type machinery is involved. The
/// fallback chain a type participates in is declared on its
/// [`QuantityType`] at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantityTypeId(Arc<str>);

impl QuantityTypeId {
    pub fn new(name: impl AsRef<str>) -> Self {
        QuantityTypeId(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuantityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Constructor closure producing a quantity of a concrete type.
pub type QuantityConstructor = Arc<dyn Fn(Number, Unit) -> Quantity + Send + Sync>;

/// A quantity type: identity token, declared fallback chain, and the
/// constructor the registries use to instantiate results.
#[derive(Clone)]
pub struct QuantityType {
    id: QuantityTypeId,
    supertypes: Vec<QuantityTypeId>,
    construct: QuantityConstructor,
}

impl QuantityType {
    pub fn new(
        id: QuantityTypeId,
        supertypes: Vec<QuantityTypeId>,
        construct: QuantityConstructor,
    ) -> Self {
        Self {
            id,
            supertypes,
            construct,
        }
    }

    /// A type whose constructor simply pairs value and unit under the
    /// type's own identity. Sufficient for every cataloged type; custom
    /// constructors exist for applications wrapping quantities further.
    pub fn simple(id: QuantityTypeId) -> Self {
        let tag = id.clone();
        QuantityType::new(
            id,
            Vec::new(),
            Arc::new(move |value, unit| Quantity::new(value, unit, tag.clone())),
        )
    }

    /// As [`QuantityType::simple`], with a declared fallback chain
    /// (nearest supertype first).
    pub fn with_supertypes(id: QuantityTypeId, supertypes: Vec<QuantityTypeId>) -> Self {
        let tag = id.clone();
        QuantityType::new(
            id,
            supertypes,
            Arc::new(move |value, unit| Quantity::new(value, unit, tag.clone())),
        )
    }

    pub fn id(&self) -> &QuantityTypeId {
        &self.id
    }

    /// Declared fallback chain, nearest first.
    pub fn supertypes(&self) -> &[QuantityTypeId] {
        &self.supertypes
    }

    pub fn construct(&self, value: Number, unit: Unit) -> Quantity {
        (self.construct)(value, unit)
    }
}

impl fmt::Debug for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantityType")
            .field("id", &self.id)
            .field("supertypes", &self.supertypes)
            .finish()
    }
}

/// An immutable (value, unit) pair tagged with its quantity type.
///
/// The unit is a shared identity; the quantity does not own it.
#[derive(Debug, Clone)]
pub struct Quantity {
    value: Number,
    unit: Unit,
    kind: QuantityTypeId,
}

impl Quantity {
    pub fn new(value: Number, unit: Unit, kind: QuantityTypeId) -> Self {
        Self { value, unit, kind }
    }

    pub fn value(&self) -> &Number {
        &self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn kind(&self) -> &QuantityTypeId {
        &self.kind
    }
}

/// Same numeric value in the same unit identity.
impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && self.value == other.value
    }
}

impl Eq for Quantity {}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol(Notation::Unicode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimension, DimensionalFormula, UnitSystem};

    fn meter() -> Unit {
        Unit::new(
            "meter",
            "m",
            Dimension::new("Length", DimensionalFormula::LENGTH),
            UnitSystem::Si,
        )
    }

    #[test]
    fn test_simple_type_constructs_tagged_quantity() {
        let length = QuantityType::simple(QuantityTypeId::new("Length"));
        let q = length.construct(Number::from(3), meter());
        assert_eq!(q.kind().as_str(), "Length");
        assert_eq!(q.value().value(), "3");
        assert_eq!(q.unit().name(), "meter");
    }

    #[test]
    fn test_quantity_equality_uses_unit_identity() {
        let m = meter();
        let a = Quantity::new(Number::from(5), m.clone(), QuantityTypeId::new("Length"));
        let b = Quantity::new(Number::from(5), m, QuantityTypeId::new("Length"));
        assert_eq!(a, b);

        let other_meter = meter(); // distinct identity
        let c = Quantity::new(
            Number::from(5),
            other_meter,
            QuantityTypeId::new("Length"),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let q = Quantity::new(
            Number::new("1.5").unwrap(),
            meter(),
            QuantityTypeId::new("Length"),
        );
        assert_eq!(q.to_string(), "1.5 m");
    }

    #[test]
    fn test_supertype_chain_declaration() {
        let height = QuantityType::with_supertypes(
            QuantityTypeId::new("Height"),
            vec![QuantityTypeId::new("Length")],
        );
        assert_eq!(height.supertypes().len(), 1);
        assert_eq!(height.supertypes()[0].as_str(), "Length");
    }
}
