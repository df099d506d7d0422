//! Invoice-level totals from the line items.

use rust_decimal::Decimal;

use super::money::{self, round2};
use super::types::InvoiceItem;

/// Invoice totals: subtotal, tax, and their sum, each rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Compute invoice totals over the given line items.
///
/// Sums are taken at full precision and rounded once at the invoice level,
/// so `total == round2(subtotal_raw + tax_raw)`.
pub fn compute_totals(items: &[InvoiceItem]) -> InvoiceTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|i| money::line_subtotal(i.quantity, i.unit_price))
        .sum();
    let tax_amount: Decimal = items
        .iter()
        .map(|i| money::line_tax(i.quantity, i.unit_price, i.tax_rate))
        .sum();

    InvoiceTotals {
        subtotal: round2(subtotal),
        tax_amount: round2(tax_amount),
        total: round2(subtotal + tax_amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ItemSource;
    use rust_decimal_macros::dec;

    fn item(description: &str, quantity: Decimal, unit_price: Decimal, rate: Decimal) -> InvoiceItem {
        InvoiceItem {
            id: String::new(),
            source: ItemSource::Custom,
            description: description.into(),
            quantity,
            unit_price,
            tax_rate: rate,
            unit: None,
            total: round2(money::line_total(quantity, unit_price, rate)),
        }
    }

    #[test]
    fn two_item_invoice_totals() {
        let items = vec![
            item("Sviluppo Web", dec!(1), dec!(800), dec!(22)),
            item("Consulenza", dec!(4), dec!(50), dec!(22)),
        ];
        let totals = compute_totals(&items);
        assert_eq!(totals.subtotal, dec!(1000.00));
        assert_eq!(totals.tax_amount, dec!(220.00));
        assert_eq!(totals.total, dec!(1220.00));
    }

    #[test]
    fn mixed_rates() {
        let items = vec![
            item("a", dec!(1), dec!(100), dec!(22)),
            item("b", dec!(1), dec!(200), dec!(10)),
        ];
        let totals = compute_totals(&items);
        assert_eq!(totals.subtotal, dec!(300.00));
        assert_eq!(totals.tax_amount, dec!(42.00));
        assert_eq!(totals.total, dec!(342.00));
    }

    #[test]
    fn empty_invoice_is_zero() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.subtotal, dec!(0));
        assert_eq!(totals.tax_amount, dec!(0));
        assert_eq!(totals.total, dec!(0));
    }

    #[test]
    fn invariant_total_is_subtotal_plus_tax() {
        let items = vec![
            item("a", dec!(3), dec!(19.99), dec!(22)),
            item("b", dec!(7), dec!(0.33), dec!(4)),
        ];
        let totals = compute_totals(&items);
        // Rounded once each; the 0.01 tolerance of the validator covers the
        // residual between round2(a)+round2(b) and round2(a+b).
        assert!((totals.subtotal + totals.tax_amount - totals.total).abs() <= dec!(0.01));
    }
}
