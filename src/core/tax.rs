//! Per-tax-rate aggregation of invoice lines.
//!
//! Feeds the invoice totals sanity check and the FatturaPA `DatiRiepilogo`
//! summary blocks.

use rust_decimal::Decimal;

use super::money;
use super::types::InvoiceItem;

/// Aggregated amounts for one distinct tax rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxBucket {
    /// The exact rate value as it appears on the lines (no bucketing).
    pub rate: Decimal,
    /// Sum of line net amounts at this rate, rounded to cents.
    pub taxable_base: Decimal,
    /// Sum of line tax amounts at this rate, rounded to cents.
    pub tax_amount: Decimal,
}

/// Group line items by their exact tax rate.
///
/// Bucket order is the insertion order of each rate's first occurrence, so
/// the summary follows the visual order of the lines and is deterministic
/// for identical input.
pub fn summarize_by_rate(items: &[InvoiceItem]) -> Vec<TaxBucket> {
    let mut buckets: Vec<TaxBucket> = Vec::new();

    for item in items {
        let subtotal = money::line_subtotal(item.quantity, item.unit_price);
        let tax = money::line_tax(item.quantity, item.unit_price, item.tax_rate);

        match buckets.iter_mut().find(|b| b.rate == item.tax_rate) {
            Some(bucket) => {
                bucket.taxable_base += subtotal;
                bucket.tax_amount += tax;
            }
            None => buckets.push(TaxBucket {
                rate: item.tax_rate,
                taxable_base: subtotal,
                tax_amount: tax,
            }),
        }
    }

    for bucket in &mut buckets {
        bucket.taxable_base = money::round2(bucket.taxable_base);
        bucket.tax_amount = money::round2(bucket.tax_amount);
    }

    buckets
}
