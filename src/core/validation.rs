//! Invoice consistency checks.
//!
//! Recomputes totals from the line items and reports every discrepancy
//! against the stored figures. Nothing here mutates or auto-corrects;
//! the caller decides whether to fix and re-save.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::totals::compute_totals;
use super::types::Invoice;

/// Monetary comparisons tolerate one cent of rounding drift.
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Validate an invoice against its own line items.
/// Returns all discrepancies found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.customer_id.trim().is_empty() && invoice.customer.is_none() {
        errors.push(ValidationError::new("customer", "cliente mancante"));
    }

    if invoice.items.is_empty() {
        errors.push(ValidationError::new("items", "la fattura non ha righe"));
    }

    for (i, item) in invoice.items.iter().enumerate() {
        validate_item(item, i, &mut errors);
    }

    let computed = compute_totals(&invoice.items);

    if !within_tolerance(invoice.subtotal, computed.subtotal) {
        errors.push(ValidationError::new(
            "totals.subtotal",
            format!(
                "imponibile registrato {} non corrisponde al ricalcolato {}",
                invoice.subtotal, computed.subtotal
            ),
        ));
    }
    if !within_tolerance(invoice.tax_amount, computed.tax_amount) {
        errors.push(ValidationError::new(
            "totals.tax_amount",
            format!(
                "imposta registrata {} non corrisponde alla ricalcolata {}",
                invoice.tax_amount, computed.tax_amount
            ),
        ));
    }
    if !within_tolerance(invoice.total, computed.total) {
        errors.push(ValidationError::new(
            "totals.total",
            format!(
                "totale registrato {} non corrisponde al totale ricalcolato {}",
                invoice.total, computed.total
            ),
        ));
    }

    errors
}

fn validate_item(item: &super::types::InvoiceItem, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("items[{index}]");

    if item.description.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.description"),
            "descrizione obbligatoria",
        ));
    }
    if item.quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "la quantità deve essere maggiore di zero",
        ));
    }
    if item.unit_price < Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.unit_price"),
            "il prezzo unitario non può essere negativo",
        ));
    }
    if item.tax_rate < Decimal::ZERO || item.tax_rate > dec!(100) {
        errors.push(ValidationError::new(
            format!("{prefix}.tax_rate"),
            "aliquota IVA fuori dall'intervallo 0–100",
        ));
    }

    let expected = super::money::round2(super::money::line_total(
        item.quantity,
        item.unit_price,
        item.tax_rate,
    ));
    if !within_tolerance(item.total, expected) {
        errors.push(ValidationError::new(
            format!("{prefix}.total"),
            format!("importo riga {} non corrisponde al ricalcolato {}", item.total, expected),
        ));
    }
}

fn within_tolerance(stored: Decimal, computed: Decimal) -> bool {
    (stored - computed).abs() <= AMOUNT_TOLERANCE
}
