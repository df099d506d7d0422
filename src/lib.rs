//! # fattura
//!
//! Italian e-invoicing core: invoice domain types and monetary arithmetic,
//! FatturaPA (FPR12) XML generation, and an orchestrated persistence pipeline
//! over an abstract row store.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Rounding is commercial (half away from zero) on the cents boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fattura::core::*;
//! use rust_decimal_macros::dec;
//!
//! let customer = CustomerBuilder::new("Rossi SRL")
//!     .vat_number("01234567890")
//!     .build();
//!
//! let invoice = InvoiceBuilder::new("INV-2025-000001", NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
//!     .customer(customer)
//!     .due_date(NaiveDate::from_ymd_opt(2025, 4, 10).unwrap())
//!     .add_item(InvoiceItemBuilder::new("Sviluppo Web", dec!(1), dec!(800)).tax_rate(dec!(22)).build())
//!     .add_item(InvoiceItemBuilder::new("Consulenza", dec!(4), dec!(50)).tax_rate(dec!(22)).build())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(invoice.subtotal, dec!(1000.00));
//! assert_eq!(invoice.tax_amount, dec!(220.00));
//! assert_eq!(invoice.total, dec!(1220.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, totals, validation, numbering |
//! | `fatturapa` | FatturaPA FPR12 XML generation and export naming |
//! | `store` | Abstract row store, repositories, persistence pipeline |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "fatturapa")]
pub mod fatturapa;

#[cfg(feature = "store")]
pub mod store;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
