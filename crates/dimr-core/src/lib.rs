//! dimr-core: dimensionally-correct arithmetic on physical quantities
//!
//! This crate is the pure calculation engine behind dimr: quantities are
//! arbitrary-precision decimal values paired with interned units, and
//! every operation tracks the dimensional formula of its result. It has
//! no I/O and no UI dependencies; parsing and formatting layers sit on
//! top of it.
//!
//! # Example
//!
//! ```
//! use dimr_core::{catalog, Calculator, Number};
//!
//! catalog::install_defaults().unwrap();
//! let calc = Calculator::default_instance();
//!
//! // Cross-unit addition: the first operand anchors the result unit.
//! let distance = calc
//!     .quantity(Number::new("100").unwrap(), &catalog::meter())
//!     .unwrap();
//! let leg = calc
//!     .quantity(Number::new("1").unwrap(), &catalog::kilometer())
//!     .unwrap();
//! let total = calc.add(&distance, &leg).unwrap();
//! assert_eq!(total.to_string(), "1100 m");
//!
//! // Derived quantities: meter × meter resolves to square meters.
//! let side = calc
//!     .quantity(Number::new("3").unwrap(), &catalog::meter())
//!     .unwrap();
//! let area = calc.multiply(&side, &side).unwrap();
//! assert_eq!(area.to_string(), "9 m²");
//! assert_eq!(area.kind().as_str(), "Area");
//! ```

pub mod calculator;
pub mod catalog;
pub mod convert;
mod defaults;
pub mod error;
pub mod number;
pub mod registry;
pub mod types;

pub use calculator::Calculator;
pub use convert::Converter;
pub use error::{CalcError, Result};
pub use number::{
    ArithmeticBackend, DecimalBackend, ManualBackend, Number, RoundingMode, DEFAULT_ROUNDING,
    DEFAULT_SCALE,
};
pub use registry::{
    ConversionFactorRegistry, ConversionRule, FormulaUnitRegistry, ResultQuantityRegistry,
    UnitRegistry,
};
pub use types::{
    Dimension, DimensionalFormula, Notation, Quantity, QuantityConstructor, QuantityType,
    QuantityTypeId, Unit, UnitSystem,
};
