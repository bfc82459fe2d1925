//! Standard dimensions and units
//!
//! To add a new unit, add an accessor row to the `catalog_units!` table;
//! interning, conversion registration, and quantity-type wiring all pick
//! it up from there. `install` wires the catalog into an explicit set of
//! registries; `install_defaults` targets the process-wide defaults.

use crate::error::Result;
use crate::number::Number;
use crate::registry::{
    ConversionFactorRegistry, ConversionRule, FormulaUnitRegistry, ResultQuantityRegistry,
    UnitRegistry,
};
use crate::types::{DimensionalFormula, QuantityType, QuantityTypeId, Unit, UnitSystem};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Interned standard dimensions. Each accessor returns a clone of one
/// shared instance, so dimension values compare equal across the
/// catalog.
pub mod dimensions {
    use crate::types::{Dimension, DimensionalFormula};
    use std::sync::LazyLock;

    macro_rules! dimensions {
        ($($accessor:ident => $name:literal, $formula:expr;)*) => {
            $(
                #[doc = concat!("The `", $name, "` dimension.")]
                pub fn $accessor() -> Dimension {
                    static INSTANCE: LazyLock<Dimension> =
                        LazyLock::new(|| Dimension::new($name, $formula));
                    INSTANCE.clone()
                }
            )*
        };
    }

    dimensions! {
        length => "Length", DimensionalFormula::LENGTH;
        mass => "Mass", DimensionalFormula::MASS;
        time => "Time", DimensionalFormula::TIME;
        electric_current => "ElectricCurrent", DimensionalFormula::CURRENT;
        temperature => "Temperature", DimensionalFormula::TEMPERATURE;
        amount_of_substance => "AmountOfSubstance", DimensionalFormula::AMOUNT;
        luminous_intensity => "LuminousIntensity", DimensionalFormula::LUMINOSITY;
        area => "Area", DimensionalFormula::new(2, 0, 0, 0, 0, 0, 0);
        volume => "Volume", DimensionalFormula::new(3, 0, 0, 0, 0, 0, 0);
        speed => "Speed", DimensionalFormula::new(1, 0, -1, 0, 0, 0, 0);
        acceleration => "Acceleration", DimensionalFormula::new(1, 0, -2, 0, 0, 0, 0);
        force => "Force", DimensionalFormula::new(1, 1, -2, 0, 0, 0, 0);
        energy => "Energy", DimensionalFormula::new(2, 1, -2, 0, 0, 0, 0);
        frequency => "Frequency", DimensionalFormula::new(0, 0, -1, 0, 0, 0, 0);
    }
}

struct CatalogEntry {
    unit: Unit,
    factor: &'static str,
    offset: Option<&'static str>,
}

fn intern_unit(
    name: &'static str,
    symbol: &'static str,
    unicode: Option<&'static str>,
    dimension: crate::types::Dimension,
    system: UnitSystem,
) -> Unit {
    match unicode {
        Some(u) => Unit::with_unicode_symbol(name, symbol, u, dimension, system),
        None => Unit::new(name, symbol, dimension, system),
    }
}

macro_rules! opt_literal {
    (-) => {
        None
    };
    ($value:literal) => {
        Some($value)
    };
}

macro_rules! catalog_units {
    ($(
        $accessor:ident: $name:literal, $symbol:literal, $unicode:tt,
            $dimension:ident, $system:ident, $factor:literal, $offset:tt;
    )*) => {
        $(
            #[doc = concat!("The interned `", $name, "` unit.")]
            pub fn $accessor() -> Unit {
                static INSTANCE: LazyLock<Unit> = LazyLock::new(|| {
                    intern_unit(
                        $name,
                        $symbol,
                        opt_literal!($unicode),
                        dimensions::$dimension(),
                        UnitSystem::$system,
                    )
                });
                INSTANCE.clone()
            }
        )*

        fn entries() -> Vec<CatalogEntry> {
            vec![$(
                CatalogEntry {
                    unit: $accessor(),
                    factor: $factor,
                    offset: opt_literal!($offset),
                },
            )*]
        }
    };
}

// Factor is the multiplier to the dimension's base unit; affine units
// (temperatures) additionally carry an offset.
catalog_units! {
    // Length (base: meter)
    meter: "meter", "m", -, length, Si, "1", -;
    kilometer: "kilometer", "km", -, length, Metric, "1000", -;
    centimeter: "centimeter", "cm", -, length, Metric, "0.01", -;
    millimeter: "millimeter", "mm", -, length, Metric, "0.001", -;
    mile: "mile", "mi", -, length, Imperial, "1609.344", -;
    yard: "yard", "yd", -, length, Imperial, "0.9144", -;
    foot: "foot", "ft", -, length, Imperial, "0.3048", -;
    inch: "inch", "in", -, length, Imperial, "0.0254", -;
    // Mass (base: kilogram)
    kilogram: "kilogram", "kg", -, mass, Si, "1", -;
    gram: "gram", "g", -, mass, Metric, "0.001", -;
    tonne: "tonne", "t", -, mass, Metric, "1000", -;
    pound: "pound", "lb", -, mass, Imperial, "0.45359237", -;
    ounce: "ounce", "oz", -, mass, Imperial, "0.028349523125", -;
    // Time (base: second)
    second: "second", "s", -, time, Si, "1", -;
    minute: "minute", "min", -, time, None, "60", -;
    hour: "hour", "h", -, time, None, "3600", -;
    day: "day", "d", -, time, None, "86400", -;
    // Electric current (base: ampere)
    ampere: "ampere", "A", -, electric_current, Si, "1", -;
    // Temperature (base: kelvin)
    kelvin: "kelvin", "K", -, temperature, Si, "1", -;
    celsius: "degree Celsius", "degC", "°C", temperature, Metric, "1", "273.15";
    fahrenheit: "degree Fahrenheit", "degF", "°F", temperature, Imperial,
        "0.55555555555555555556", "255.37222222222222222222";
    // Amount of substance (base: mole)
    mole: "mole", "mol", -, amount_of_substance, Si, "1", -;
    // Luminous intensity (base: candela)
    candela: "candela", "cd", -, luminous_intensity, Si, "1", -;
    // Area (base: square meter)
    square_meter: "square meter", "m^2", "m²", area, Si, "1", -;
    square_kilometer: "square kilometer", "km^2", "km²", area, Metric, "1000000", -;
    square_foot: "square foot", "ft^2", "ft²", area, Imperial, "0.09290304", -;
    // Volume (base: cubic meter)
    cubic_meter: "cubic meter", "m^3", "m³", volume, Si, "1", -;
    liter: "liter", "L", -, volume, Metric, "0.001", -;
    // Speed (base: meter per second)
    meter_per_second: "meter per second", "m/s", -, speed, Si, "1", -;
    kilometer_per_hour: "kilometer per hour", "km/h", -, speed, Metric,
        "0.27777777777777777778", -;
    mile_per_hour: "mile per hour", "mph", -, speed, Imperial, "0.44704", -;
    // Acceleration (base: meter per second squared)
    meter_per_second_squared: "meter per second squared", "m/s^2", "m/s²",
        acceleration, Si, "1", -;
    // Force (base: newton)
    newton: "newton", "N", -, force, Si, "1", -;
    // Energy (base: joule)
    joule: "joule", "J", -, energy, Si, "1", -;
    // Frequency (base: hertz)
    hertz: "hertz", "Hz", -, frequency, Si, "1", -;
}

/// Default result units per formula (SI-first).
fn default_units() -> Vec<(DimensionalFormula, Unit)> {
    vec![
        (*dimensions::length().formula(), meter()),
        (*dimensions::mass().formula(), kilogram()),
        (*dimensions::time().formula(), second()),
        (*dimensions::electric_current().formula(), ampere()),
        (*dimensions::temperature().formula(), kelvin()),
        (*dimensions::amount_of_substance().formula(), mole()),
        (*dimensions::luminous_intensity().formula(), candela()),
        (*dimensions::area().formula(), square_meter()),
        (*dimensions::volume().formula(), cubic_meter()),
        (*dimensions::speed().formula(), meter_per_second()),
        (
            *dimensions::acceleration().formula(),
            meter_per_second_squared(),
        ),
        (*dimensions::force().formula(), newton()),
        (*dimensions::energy().formula(), joule()),
        (*dimensions::frequency().formula(), hertz()),
    ]
}

/// Per-system defaults keeping derived results in the operand's system.
fn system_defaults() -> Vec<(DimensionalFormula, UnitSystem, Unit)> {
    vec![
        (*dimensions::length().formula(), UnitSystem::Imperial, foot()),
        (*dimensions::area().formula(), UnitSystem::Imperial, square_foot()),
        (*dimensions::area().formula(), UnitSystem::Metric, square_kilometer()),
        (*dimensions::speed().formula(), UnitSystem::Imperial, mile_per_hour()),
        (*dimensions::speed().formula(), UnitSystem::Metric, kilometer_per_hour()),
    ]
}

/// Register the whole catalog into the supplied registries: conversion
/// rules, unit-to-type entries, per-formula default units, and generic
/// result-type fallbacks (one per dimension, plus `Scalar` for the
/// dimensionless formula).
pub fn install(
    conversions: &ConversionFactorRegistry,
    units: &UnitRegistry,
    formula_units: &FormulaUnitRegistry,
    result_types: &ResultQuantityRegistry,
) -> Result<()> {
    let mut types: HashMap<String, (QuantityType, DimensionalFormula)> = HashMap::new();
    for entry in entries() {
        let dimension = entry.unit.dimension().clone();
        let (quantity_type, _) = types
            .entry(dimension.name().to_string())
            .or_insert_with(|| {
                (
                    QuantityType::simple(QuantityTypeId::new(dimension.name())),
                    *dimension.formula(),
                )
            })
            .clone();
        result_types.register_type(quantity_type.clone());
        units.register(entry.unit.clone(), quantity_type);

        let factor = Number::new(entry.factor)?;
        let rule = match entry.offset {
            Some(offset) => ConversionRule::affine(factor, Number::new(offset)?),
            None => ConversionRule::linear(factor),
        };
        conversions.register(entry.unit, rule)?;
    }

    for (_, (quantity_type, formula)) in &types {
        result_types.register_generic(*formula, quantity_type.id().clone())?;
    }
    let scalar = QuantityType::simple(QuantityTypeId::new("Scalar"));
    result_types.register_type(scalar.clone());
    result_types.register_generic(DimensionalFormula::DIMENSIONLESS, scalar.id().clone())?;

    for (formula, unit) in default_units() {
        formula_units.register(formula, unit)?;
    }
    for (formula, system, unit) in system_defaults() {
        formula_units.register_for_system(formula, system, unit)?;
    }
    Ok(())
}

/// As [`install`], targeting the process-wide default registries.
pub fn install_defaults() -> Result<()> {
    install(
        &ConversionFactorRegistry::default_instance(),
        &UnitRegistry::default_instance(),
        &FormulaUnitRegistry::default_instance(),
        &ResultQuantityRegistry::default_instance(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::number::RoundingMode;
    use std::sync::Arc;

    fn n(s: &str) -> Number {
        Number::new(s).unwrap()
    }

    #[test]
    fn test_accessors_are_interned() {
        assert_eq!(meter(), meter());
        assert_ne!(meter(), kilometer());
        assert_eq!(dimensions::length(), dimensions::length());
    }

    #[test]
    fn test_install_registers_everything() {
        let conversions = Arc::new(ConversionFactorRegistry::new());
        let units = Arc::new(UnitRegistry::new());
        let formula_units = FormulaUnitRegistry::new();
        let result_types = ResultQuantityRegistry::new();
        install(&conversions, &units, &formula_units, &result_types).unwrap();

        assert!(conversions.has(&kilometer()));
        assert!(units.has(&fahrenheit()));
        assert_eq!(
            formula_units.get_unit(dimensions::area().formula()).unwrap(),
            square_meter()
        );
        assert!(result_types
            .quantity_type(&QuantityTypeId::new("Length"), dimensions::area().formula())
            .is_ok());
        assert_eq!(
            units.units_for_dimension(dimensions::length().formula()).len(),
            8
        );
    }

    #[test]
    fn test_metric_length_conversions() {
        let conversions = Arc::new(ConversionFactorRegistry::new());
        let units = Arc::new(UnitRegistry::new());
        install(
            &conversions,
            &units,
            &FormulaUnitRegistry::new(),
            &ResultQuantityRegistry::new(),
        )
        .unwrap();
        let converter = Converter::new(conversions, units);

        let meters = converter
            .convert(&n("2"), &kilometer(), &meter(), 10, RoundingMode::HalfUp)
            .unwrap();
        assert_eq!(meters.value(), "2000");

        let inches = converter
            .convert(&n("1"), &foot(), &inch(), 10, RoundingMode::HalfUp)
            .unwrap();
        assert_eq!(inches.value(), "12");
    }

    #[test]
    fn test_affine_temperature_conversions() {
        let conversions = Arc::new(ConversionFactorRegistry::new());
        let units = Arc::new(UnitRegistry::new());
        install(
            &conversions,
            &units,
            &FormulaUnitRegistry::new(),
            &ResultQuantityRegistry::new(),
        )
        .unwrap();
        let converter = Converter::new(conversions, units);

        let kelvins = converter
            .convert(&n("20"), &celsius(), &kelvin(), 10, RoundingMode::HalfUp)
            .unwrap();
        assert_eq!(kelvins.value(), "293.15");

        let freezing = converter
            .convert(&n("32"), &fahrenheit(), &celsius(), 10, RoundingMode::HalfUp)
            .unwrap();
        assert_eq!(freezing.value(), "0");

        let boiling = converter
            .convert(&n("100"), &celsius(), &fahrenheit(), 10, RoundingMode::HalfUp)
            .unwrap();
        assert_eq!(boiling.value(), "212");
    }
}
