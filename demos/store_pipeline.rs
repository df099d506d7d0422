use std::sync::Arc;

use chrono::NaiveDate;
use fattura::core::*;
use fattura::store::{CustomerRepository, InvoiceRepository, MemoryStore};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store);

    let customer = customers
        .create(
            &CustomerBuilder::new("Rossi SRL")
                .vat_number("01234567890")
                .build(),
        )
        .await
        .expect("customer insert");
    println!("Cliente creato con id {}", customer.id);

    let draft = InvoiceBuilder::new(
        "INV-2025-000001",
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    )
    .customer_id(&customer.id)
    .add_item(
        InvoiceItemBuilder::new("Sviluppo Web", dec!(1), dec!(800))
            .tax_rate(dec!(22))
            .build(),
    )
    .build()
    .expect("valid invoice");

    // Create pipeline: header first, then line items.
    let created = invoices.create(&draft).await.expect("create pipeline");
    println!(
        "Fattura {} creata ({} righe, totale {} EUR)",
        created.number,
        created.items.len(),
        created.total
    );

    // Update pipeline: new item set replaces the old one.
    let mut updated = InvoiceBuilder::new(
        "INV-2025-000001",
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    )
    .customer_id(&customer.id)
    .status(InvoiceStatus::Sent)
    .add_item(
        InvoiceItemBuilder::new("Sviluppo Web", dec!(1), dec!(800))
            .tax_rate(dec!(22))
            .build(),
    )
    .add_item(
        InvoiceItemBuilder::new("Manutenzione", dec!(2), dec!(150))
            .tax_rate(dec!(22))
            .build(),
    )
    .build()
    .expect("valid invoice");
    updated.id = created.id.clone();

    let saved = invoices.update(&updated).await.expect("update pipeline");
    println!(
        "Fattura aggiornata: {} righe, totale {} EUR",
        saved.items.len(),
        saved.total
    );

    for invoice in invoices.list().await.expect("list") {
        println!(
            "  {} {} {} EUR [{}]",
            invoice.number,
            invoice.issue_date,
            invoice.total,
            invoice.status.as_str()
        );
    }
}
