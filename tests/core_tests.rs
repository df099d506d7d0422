//! Core invoice arithmetic, validation, and numbering tests.

use chrono::NaiveDate;
use fattura::core::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn customer() -> Customer {
    CustomerBuilder::new("Rossi SRL")
        .email("amministrazione@rossi.it")
        .vat_number("01234567890")
        .tax_code("RSSMRA80A01H501U")
        .address("Via Dante 4, Torino")
        .build()
}

fn two_item_invoice() -> Invoice {
    InvoiceBuilder::new("INV-2025-000001", date(2025, 3, 10))
        .customer(customer())
        .due_date(date(2025, 4, 10))
        .add_item(
            InvoiceItemBuilder::new("Sviluppo Web", dec!(1), dec!(800))
                .tax_rate(dec!(22))
                .build(),
        )
        .add_item(
            InvoiceItemBuilder::new("Consulenza", dec!(4), dec!(50))
                .tax_rate(dec!(22))
                .build(),
        )
        .build()
        .expect("valid invoice")
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[test]
fn two_item_invoice_totals() {
    let invoice = two_item_invoice();
    assert_eq!(invoice.subtotal, dec!(1000.00));
    assert_eq!(invoice.tax_amount, dec!(220.00));
    assert_eq!(invoice.total, dec!(1220.00));
}

#[test]
fn line_totals_match_contract() {
    let item = InvoiceItemBuilder::new("Licenza", dec!(3), dec!(19.99))
        .tax_rate(dec!(22))
        .build();
    // total == round2(q * p * (1 + r/100))
    assert_eq!(item.total, money::round2(dec!(3) * dec!(19.99) * dec!(1.22)));
}

#[test]
fn totals_with_mixed_rates() {
    let items = vec![
        InvoiceItemBuilder::new("a", dec!(1), dec!(100)).tax_rate(dec!(22)).build(),
        InvoiceItemBuilder::new("b", dec!(2), dec!(50)).tax_rate(dec!(22)).build(),
        InvoiceItemBuilder::new("c", dec!(1), dec!(200)).tax_rate(dec!(10)).build(),
    ];
    let totals = compute_totals(&items);
    assert_eq!(totals.subtotal, dec!(400.00));
    assert_eq!(totals.tax_amount, dec!(64.00));
    assert_eq!(totals.total, dec!(464.00));
}

// ---------------------------------------------------------------------------
// Tax-rate aggregation
// ---------------------------------------------------------------------------

#[test]
fn aggregator_fixture() {
    let items = vec![
        InvoiceItemBuilder::new("a", dec!(1), dec!(100)).tax_rate(dec!(22)).build(),
        InvoiceItemBuilder::new("b", dec!(2), dec!(50)).tax_rate(dec!(22)).build(),
        InvoiceItemBuilder::new("c", dec!(1), dec!(200)).tax_rate(dec!(10)).build(),
    ];
    let buckets = summarize_by_rate(&items);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].rate, dec!(22));
    assert_eq!(buckets[0].taxable_base, dec!(200.00));
    assert_eq!(buckets[0].tax_amount, dec!(44.00));
    assert_eq!(buckets[1].rate, dec!(10));
    assert_eq!(buckets[1].taxable_base, dec!(200.00));
    assert_eq!(buckets[1].tax_amount, dec!(20.00));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn stored_total_mismatch_reports_totale_once() {
    let mut invoice = two_item_invoice();
    invoice.total = dec!(1200.00);

    let errors = validate_invoice(&invoice);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("totale"));
}

#[test]
fn all_three_totals_flagged_independently() {
    let mut invoice = two_item_invoice();
    invoice.subtotal = dec!(1.00);
    invoice.tax_amount = dec!(2.00);
    invoice.total = dec!(3.00);

    let errors = validate_invoice(&invoice);
    assert_eq!(errors.len(), 3);
}

#[test]
fn validation_reports_missing_customer_and_items() {
    let invoice = InvoiceBuilder::new("INV-2025-000009", date(2025, 1, 1))
        .build_unchecked()
        .unwrap();

    let errors = validate_invoice(&invoice);
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"customer"));
    assert!(fields.contains(&"items"));
}

// ---------------------------------------------------------------------------
// Status derivation
// ---------------------------------------------------------------------------

#[test]
fn overdue_is_derived_not_stored() {
    let mut invoice = two_item_invoice();
    invoice.status = InvoiceStatus::Sent;

    assert_eq!(invoice.status, InvoiceStatus::Sent);
    assert_eq!(invoice.effective_status(date(2025, 5, 1)), InvoiceStatus::Overdue);
    assert_eq!(invoice.effective_status(date(2025, 3, 15)), InvoiceStatus::Sent);
}

// ---------------------------------------------------------------------------
// Numbering
// ---------------------------------------------------------------------------

#[test]
fn numbering_format() {
    let mut seq = InvoiceNumberSequence::new(2025);
    assert_eq!(seq.next_number(), "INV-2025-000001");
    assert_eq!(seq.next_number(), "INV-2025-000002");
}

#[test]
fn numbering_resumes_after_store_listing() {
    let stored = vec![
        "INV-2025-000001".to_string(),
        "INV-2025-000005".to_string(),
        "INV-2024-000400".to_string(),
    ];
    let seq = InvoiceNumberSequence::resume_from(stored.iter().map(String::as_str), 2025);
    assert_eq!(seq.peek(), "INV-2025-000006");
}
