//! Pure monetary arithmetic for invoice lines.
//!
//! All functions are total for any `Decimal` input; negative quantities and
//! prices are mathematically valid here; business rules are checked in
//! [`crate::core::validation`].

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Net amount of a line: `quantity × unit_price`. Unrounded.
pub fn line_subtotal(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity * unit_price
}

/// Tax amount of a line: subtotal × rate/100. Unrounded.
pub fn line_tax(quantity: Decimal, unit_price: Decimal, tax_rate: Decimal) -> Decimal {
    line_subtotal(quantity, unit_price) * tax_rate / dec!(100)
}

/// Gross amount of a line: subtotal + tax. Unrounded.
pub fn line_total(quantity: Decimal, unit_price: Decimal, tax_rate: Decimal) -> Decimal {
    line_subtotal(quantity, unit_price) + line_tax(quantity, unit_price, tax_rate)
}

/// Round to 2 decimal places, half away from zero (commercial rounding).
/// Matches `round(value * 100) / 100` for both signs.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtotal_is_quantity_times_price() {
        assert_eq!(line_subtotal(dec!(4), dec!(50)), dec!(200));
        assert_eq!(line_subtotal(dec!(1.5), dec!(10)), dec!(15.0));
    }

    #[test]
    fn tax_applies_rate_percentage() {
        assert_eq!(line_tax(dec!(1), dec!(100), dec!(22)), dec!(22));
        assert_eq!(line_tax(dec!(2), dec!(50), dec!(10)), dec!(10));
        assert_eq!(line_tax(dec!(1), dec!(100), dec!(0)), dec!(0));
    }

    #[test]
    fn total_is_subtotal_plus_tax() {
        assert_eq!(line_total(dec!(1), dec!(800), dec!(22)), dec!(976));
        assert_eq!(
            line_total(dec!(3), dec!(19.99), dec!(22)),
            line_subtotal(dec!(3), dec!(19.99)) + line_tax(dec!(3), dec!(19.99), dec!(22))
        );
    }

    #[test]
    fn negative_inputs_are_valid_arithmetic() {
        assert_eq!(line_subtotal(dec!(-1), dec!(100)), dec!(-100));
        assert_eq!(line_tax(dec!(-1), dec!(100), dec!(22)), dec!(-22));
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
        assert_eq!(round2(dec!(10)), dec!(10));
    }
}
