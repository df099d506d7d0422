//! Core invoice types, arithmetic, validation, and numbering.
//!
//! Monetary arithmetic lives in [`money`], per-rate aggregation in [`tax`],
//! and invoice-level totals in [`totals`]. Validation never mutates; it
//! reports discrepancies for the caller to act on.

mod builder;
mod error;
pub mod money;
mod numbering;
pub mod tax;
pub mod totals;
mod types;
mod validation;

pub use builder::*;
pub use error::*;
pub use numbering::*;
pub use tax::{TaxBucket, summarize_by_rate};
pub use totals::{InvoiceTotals, compute_totals};
pub use types::*;
pub use validation::*;
