//! Value and identity types for the quantity engine

mod dimension;
mod quantity;
mod unit;

pub use dimension::{Dimension, DimensionalFormula};
pub use quantity::{Quantity, QuantityConstructor, QuantityType, QuantityTypeId};
pub use unit::{Notation, Unit, UnitSystem};
