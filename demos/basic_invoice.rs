use chrono::NaiveDate;
use fattura::core::*;
use rust_decimal_macros::dec;

fn main() {
    // Create a standard Italian domestic invoice
    let customer = CustomerBuilder::new("Rossi SRL")
        .email("amministrazione@rossi.it")
        .vat_number("01234567890")
        .address("Via Dante 4, Torino")
        .build();

    let invoice = InvoiceBuilder::new(
        "INV-2025-000001",
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    )
    .customer(customer)
    .due_date(NaiveDate::from_ymd_opt(2025, 4, 10).unwrap())
    .notes("Progetto sito web")
    .add_item(
        InvoiceItemBuilder::new("Sviluppo Web", dec!(1), dec!(800))
            .tax_rate(dec!(22))
            .unit("ore")
            .build(),
    )
    .add_item(
        InvoiceItemBuilder::new("Consulenza", dec!(4), dec!(50))
            .tax_rate(dec!(22))
            .build(),
    )
    .add_item(
        InvoiceItemBuilder::new("Materiale didattico", dec!(1), dec!(200))
            .tax_rate(dec!(10))
            .build(),
    )
    .build()
    .expect("invoice should be valid");

    println!("Fattura: {}", invoice.number);
    println!("Data:    {}", invoice.issue_date);
    println!(
        "Cliente: {}",
        invoice.customer.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    );
    println!("---");
    for item in &invoice.items {
        println!(
            "  {} x {} @ {} = {} (IVA {}%)",
            item.quantity, item.description, item.unit_price, item.total, item.tax_rate
        );
    }
    println!("---");
    for bucket in summarize_by_rate(&invoice.items) {
        println!(
            "  IVA {:>5}%: imponibile {} imposta {}",
            bucket.rate, bucket.taxable_base, bucket.tax_amount
        );
    }
    println!("---");
    println!("Imponibile: {} EUR", invoice.subtotal);
    println!("IVA:        {} EUR", invoice.tax_amount);
    println!("Totale:     {} EUR", invoice.total);
}
