use chrono::NaiveDate;
use fattura::core::*;
use fattura::fatturapa::{self, SupplierConfig};
use rust_decimal_macros::dec;

fn main() {
    let customer = CustomerBuilder::new("Bianchi SRL")
        .vat_number("09876543210")
        .tax_code("BNCFNC75B02F205X")
        .address("Corso Buenos Aires 5, Milano")
        .build();

    let invoice = InvoiceBuilder::new(
        "INV-2025-000042",
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
        InvoiceItemBuilder::new("Materiale didattico", dec!(1), dec!(200))
            .tax_rate(dec!(10))
            .build(),
    )
    .build()
    .expect("invoice should be valid");

    let config = SupplierConfig {
        company_name: "Studio Verdi".into(),
        vat_number: "11122233344".into(),
        address: "Via Garibaldi 8".into(),
        city: "Bologna".into(),
        postal_code: "40121".into(),
        province: "BO".into(),
        ..SupplierConfig::default()
    };

    let xml = fatturapa::to_fatturapa_xml(&invoice, &config).expect("serialization should succeed");

    println!("File: {}", fatturapa::xml_file_name(&invoice.number, &config));
    println!();
    println!("{xml}");
}
