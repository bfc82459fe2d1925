//! Units as shared, interned identities

use crate::types::Dimension;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The measurement system a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitSystem {
    Metric,
    Imperial,
    Si,
    /// Dimensionless or system-agnostic units.
    None,
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Si => "SI",
            UnitSystem::None => "none",
        };
        write!(f, "{name}")
    }
}

/// Which symbol alphabet a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Notation {
    #[default]
    Ascii,
    Unicode,
}

#[derive(Debug)]
struct UnitInner {
    name: String,
    symbol: String,
    unicode_symbol: Option<String>,
    dimension: Dimension,
    system: UnitSystem,
}

/// A unit of measure: an identity, not a value.
///
/// Units are interned — cloning shares the identity, and equality is
/// pointer equality. Two separately constructed units are distinct even
/// if every field matches, so a catalog (or application setup code)
/// should construct each unit exactly once and hand out clones.
#[derive(Debug, Clone)]
pub struct Unit(Arc<UnitInner>);

impl Unit {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        dimension: Dimension,
        system: UnitSystem,
    ) -> Unit {
        Unit(Arc::new(UnitInner {
            name: name.into(),
            symbol: symbol.into(),
            unicode_symbol: None,
            dimension,
            system,
        }))
    }

    /// As [`Unit::new`], with a distinct symbol for unicode notation
    /// (e.g. `m^2` vs `m²`).
    pub fn with_unicode_symbol(
        name: impl Into<String>,
        symbol: impl Into<String>,
        unicode_symbol: impl Into<String>,
        dimension: Dimension,
        system: UnitSystem,
    ) -> Unit {
        Unit(Arc::new(UnitInner {
            name: name.into(),
            symbol: symbol.into(),
            unicode_symbol: Some(unicode_symbol.into()),
            dimension,
            system,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Display symbol in the requested notation. Units without a
    /// dedicated unicode symbol fall back to the ascii one.
    pub fn symbol(&self, notation: Notation) -> &str {
        match notation {
            Notation::Ascii => &self.0.symbol,
            Notation::Unicode => self.0.unicode_symbol.as_deref().unwrap_or(&self.0.symbol),
        }
    }

    pub fn dimension(&self) -> &Dimension {
        &self.0.dimension
    }

    pub fn system(&self) -> UnitSystem {
        self.0.system
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol(Notation::Unicode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DimensionalFormula;

    fn length() -> Dimension {
        Dimension::new("Length", DimensionalFormula::LENGTH)
    }

    #[test]
    fn test_identity_semantics() {
        let meter = Unit::new("meter", "m", length(), UnitSystem::Si);
        let twin = Unit::new("meter", "m", length(), UnitSystem::Si);
        assert_eq!(meter, meter.clone());
        assert_ne!(meter, twin);
    }

    #[test]
    fn test_symbol_notation_fallback() {
        let area = Dimension::new("Area", DimensionalFormula::LENGTH.power(2));
        let sqm = Unit::with_unicode_symbol("square meter", "m^2", "m²", area, UnitSystem::Si);
        assert_eq!(sqm.symbol(Notation::Ascii), "m^2");
        assert_eq!(sqm.symbol(Notation::Unicode), "m²");
        assert_eq!(sqm.to_string(), "m²");

        let meter = Unit::new("meter", "m", length(), UnitSystem::Si);
        assert_eq!(meter.symbol(Notation::Unicode), "m");
    }

    #[test]
    fn test_accessors() {
        let meter = Unit::new("meter", "m", length(), UnitSystem::Si);
        assert_eq!(meter.name(), "meter");
        assert_eq!(meter.system(), UnitSystem::Si);
        assert_eq!(meter.dimension().name(), "Length");
        assert!(meter
            .dimension()
            .formula()
            .is_compatible_with(&DimensionalFormula::LENGTH));
    }
}
