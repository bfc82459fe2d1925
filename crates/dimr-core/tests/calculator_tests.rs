use dimr_core::{
    catalog, CalcError, Calculator, ConversionFactorRegistry, Converter, FormulaUnitRegistry,
    Number, Quantity, ResultQuantityRegistry, RoundingMode, Unit, UnitRegistry,
};
use pretty_assertions::assert_eq;
use std::cmp::Ordering;
use std::sync::Arc;

/// Calculator over an explicitly wired registry set, fully isolated from
/// the process-wide defaults.
fn calculator() -> Calculator {
    let conversions = Arc::new(ConversionFactorRegistry::new());
    let units = Arc::new(UnitRegistry::new());
    let formula_units = Arc::new(FormulaUnitRegistry::new());
    let result_types = Arc::new(ResultQuantityRegistry::new());
    catalog::install(&conversions, &units, &formula_units, &result_types).unwrap();
    let converter = Arc::new(Converter::new(conversions, Arc::clone(&units)));
    Calculator::new(converter, units, result_types, formula_units)
}

fn q(calc: &Calculator, value: &str, unit: &Unit) -> Quantity {
    calc.quantity(Number::new(value).unwrap(), unit).unwrap()
}

#[test]
fn test_length_addition_across_units() {
    let calc = calculator();
    let a = q(&calc, "100", &catalog::meter());
    let b = q(&calc, "1", &catalog::kilometer());

    let total = calc.add(&a, &b).unwrap();
    assert_eq!(total.value().value(), "1100");
    assert_eq!(total.unit(), &catalog::meter());
    assert_eq!(total.kind().as_str(), "Length");

    // Inputs are untouched.
    assert_eq!(a.value().value(), "100");
    assert_eq!(b.value().value(), "1");
}

#[test]
fn test_addition_requires_compatible_dimensions() {
    let calc = calculator();
    let length = q(&calc, "1", &catalog::meter());
    let mass = q(&calc, "1", &catalog::kilogram());
    let err = calc.add(&length, &mass).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid operation: cannot add quantities of dimension Length and Mass"
    );
}

#[test]
fn test_subtraction_keeps_first_operand_unit() {
    let calc = calculator();
    let a = q(&calc, "2", &catalog::kilometer());
    let b = q(&calc, "500", &catalog::meter());
    let difference = calc.subtract(&a, &b).unwrap();
    assert_eq!(difference.value().value(), "1.5");
    assert_eq!(difference.unit(), &catalog::kilometer());
}

#[test]
fn test_derived_multiply_produces_area() {
    let calc = calculator();
    let side = q(&calc, "3", &catalog::meter());
    let area = calc.multiply(&side, &side).unwrap();

    assert_eq!(area.value().value(), "9");
    assert_eq!(area.unit(), &catalog::square_meter());
    assert_eq!(area.kind().as_str(), "Area");
    assert_eq!(
        area.unit().dimension().formula(),
        &dimr_core::DimensionalFormula::LENGTH.power(2)
    );
}

#[test]
fn test_metric_in_metric_out() {
    let calc = calculator();
    let a = q(&calc, "2", &catalog::kilometer());
    let b = q(&calc, "3", &catalog::kilometer());
    let area = calc.multiply(&a, &b).unwrap();
    assert_eq!(area.unit(), &catalog::square_kilometer());
    assert_eq!(area.value().value(), "6");
}

#[test]
fn test_imperial_in_imperial_out() {
    let calc = calculator();
    let a = q(&calc, "2", &catalog::mile());
    let b = q(&calc, "1", &catalog::mile());
    let area = calc.multiply(&a, &b).unwrap();
    assert_eq!(area.unit(), &catalog::square_foot());
    // 1 square mile is exactly 5280^2 square feet.
    assert_eq!(area.value().value(), "55756800");
}

#[test]
fn test_explicit_result_unit() {
    let calc = calculator();
    let a = q(&calc, "1000", &catalog::meter());
    let area = calc
        .multiply_with(
            &a,
            &a,
            Some(&catalog::square_kilometer()),
            10,
            RoundingMode::HalfUp,
        )
        .unwrap();
    assert_eq!(area.value().value(), "1");
    assert_eq!(area.unit(), &catalog::square_kilometer());
}

#[test]
fn test_result_unit_dimension_is_validated() {
    let calc = calculator();
    let a = q(&calc, "2", &catalog::meter());
    let err = calc
        .multiply_with(&a, &a, Some(&catalog::meter()), 10, RoundingMode::HalfUp)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid operation: result unit 'meter' has dimension Length (L) but the operation yields L^2"
    );
}

#[test]
fn test_divide_produces_speed() {
    let calc = calculator();
    let distance = q(&calc, "6", &catalog::meter());
    let time = q(&calc, "2", &catalog::second());
    let speed = calc.divide(&distance, &time).unwrap();
    assert_eq!(speed.value().value(), "3");
    assert_eq!(speed.unit(), &catalog::meter_per_second());
    assert_eq!(speed.kind().as_str(), "Speed");
}

#[test]
fn test_divide_metric_source_keeps_metric_speed_unit() {
    let calc = calculator();
    let distance = q(&calc, "100", &catalog::kilometer());
    let time = q(&calc, "2", &catalog::hour());
    let speed = calc.divide(&distance, &time).unwrap();
    assert_eq!(speed.unit(), &catalog::kilometer_per_hour());
    assert_eq!(speed.value().value(), "50");
}

#[test]
fn test_divide_by_zero_quantity() {
    let calc = calculator();
    let distance = q(&calc, "6", &catalog::meter());
    let zero_time = q(&calc, "0", &catalog::second());
    let err = calc.divide(&distance, &zero_time).unwrap_err();
    assert_eq!(err.to_string(), "invalid operation: division by zero");
}

#[test]
fn test_power_raises_formula_and_value() {
    let calc = calculator();
    let side = q(&calc, "2", &catalog::meter());
    let volume = calc.power(&side, 3).unwrap();
    assert_eq!(volume.value().value(), "8");
    assert_eq!(volume.unit(), &catalog::cubic_meter());
    assert_eq!(volume.kind().as_str(), "Volume");
}

#[test]
fn test_negative_power_inverts_dimension() {
    let calc = calculator();
    let period = q(&calc, "2", &catalog::second());
    let rate = calc.power(&period, -1).unwrap();
    assert_eq!(rate.value().value(), "0.5");
    assert_eq!(rate.unit(), &catalog::hertz());
    assert_eq!(rate.kind().as_str(), "Frequency");
}

#[test]
fn test_sqrt_of_area_is_length() {
    let calc = calculator();
    let area = q(&calc, "9", &catalog::square_meter());
    let side = calc.sqrt(&area).unwrap();
    assert_eq!(side.value().value(), "3");
    assert_eq!(side.unit(), &catalog::meter());
    assert_eq!(side.kind().as_str(), "Length");
}

#[test]
fn test_sqrt_of_odd_exponent_fails() {
    let calc = calculator();
    let length = q(&calc, "9", &catalog::meter());
    let err = calc.sqrt(&length).unwrap_err();
    assert!(matches!(err, CalcError::InvalidOperation(_)));
    assert!(err.to_string().contains("not divisible by 2"), "{err}");
}

#[test]
fn test_ratio_is_dimensionless() {
    let calc = calculator();
    let a = q(&calc, "2", &catalog::kilometer());
    let b = q(&calc, "500", &catalog::meter());
    let ratio = calc.ratio(&a, &b).unwrap();
    assert_eq!(ratio.value(), "4");
}

#[test]
fn test_ratio_requires_compatible_dimensions() {
    let calc = calculator();
    let a = q(&calc, "2", &catalog::kilometer());
    let b = q(&calc, "500", &catalog::kilogram());
    let err = calc.ratio(&a, &b).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid operation: cannot take the ratio of quantities of dimension Length and Mass"
    );
}

#[test]
fn test_scalar_multiply_and_divide() {
    let calc = calculator();
    let distance = q(&calc, "2.5", &catalog::meter());
    let scaled = calc
        .multiply_by_scalar(&distance, &Number::from(4))
        .unwrap();
    assert_eq!(scaled.value().value(), "10");
    assert_eq!(scaled.unit(), &catalog::meter());

    let third = calc
        .divide_by_scalar_with(&distance, &Number::from(3), 4, RoundingMode::HalfUp)
        .unwrap();
    assert_eq!(third.value().value(), "0.8333");

    let err = calc
        .divide_by_scalar(&distance, &Number::from(0))
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid operation: division by zero");
}

#[test]
fn test_sum_and_average() {
    let calc = calculator();
    let first = q(&calc, "1", &catalog::meter());
    let rest = vec![
        q(&calc, "2", &catalog::meter()),
        q(&calc, "0.001", &catalog::kilometer()),
    ];
    let total = calc.sum(&first, &rest).unwrap();
    assert_eq!(total.value().value(), "4");
    assert_eq!(total.unit(), &catalog::meter());

    let mean = calc.average(&first, &rest).unwrap();
    assert_eq!(mean.value().value(), "1.3333333333");
    assert_eq!(mean.unit(), &catalog::meter());
}

#[test]
fn test_unit_preserving_utilities() {
    let calc = calculator();
    let reading = q(&calc, "-2.345", &catalog::meter());

    assert_eq!(calc.abs(&reading).unwrap().value().value(), "2.345");
    assert_eq!(calc.negate(&reading).unwrap().value().value(), "2.345");
    assert_eq!(
        calc.round(&reading, 2, RoundingMode::HalfUp)
            .unwrap()
            .value()
            .value(),
        "-2.35"
    );

    let positive = q(&calc, "2.5", &catalog::meter());
    assert_eq!(calc.floor(&positive, 0).unwrap().value().value(), "2");
    assert_eq!(calc.ceil(&positive, 0).unwrap().value().value(), "3");

    let negative = q(&calc, "-2.5", &catalog::meter());
    assert_eq!(calc.floor(&negative, 0).unwrap().value().value(), "-3");
    assert_eq!(calc.ceil(&negative, 0).unwrap().value().value(), "-2");
}

#[test]
fn test_compare_across_units() {
    let calc = calculator();
    let km = q(&calc, "1", &catalog::kilometer());
    let m = q(&calc, "1000", &catalog::meter());
    assert_eq!(calc.compare(&km, &m).unwrap(), Ordering::Equal);
    assert_eq!(
        calc.compare(&q(&calc, "5", &catalog::meter()), &km).unwrap(),
        Ordering::Less
    );

    let mass = q(&calc, "1", &catalog::kilogram());
    assert!(calc.compare(&km, &mass).is_err());
}

#[test]
fn test_unregistered_unit_surfaces_invalid_argument() {
    let calc = calculator();
    let furlong = Unit::new(
        "furlong",
        "fur",
        catalog::dimensions::length(),
        dimr_core::UnitSystem::Imperial,
    );
    let err = calc
        .quantity(Number::from(1), &furlong)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid argument: unit 'furlong' is not registered"
    );
}
