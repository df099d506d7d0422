use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer (CessionarioCommittente on the e-invoice).
///
/// Customers are soft-deleted (`is_active = false`) once any invoice
/// references them; a hard delete is only allowed while unreferenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identifier; empty until persisted.
    #[serde(default)]
    pub id: String,
    /// Display name (required).
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Codice fiscale, the 16-character alphanumeric tax code.
    pub tax_code: Option<String>,
    /// Partita IVA, the 11-digit VAT number.
    pub vat_number: Option<String>,
    /// Soft-delete marker.
    pub is_active: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivation_reason: Option<String>,
}

/// A catalogue product, usable as the source of an invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier; empty until persisted.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Net unit price (non-negative).
    pub unit_price: Decimal,
    /// VAT rate percentage, 0–100.
    pub tax_rate: Decimal,
    /// Unit of measure (e.g. "pz", "ore").
    pub unit: Option<String>,
    /// Soft-delete marker.
    pub is_active: bool,
}

/// Invoice status lifecycle: draft → sent → paid.
///
/// `Overdue` can be stored, but is primarily *derived* from the due date;
/// see [`Invoice::effective_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

/// Where an invoice line comes from: a catalogue product or free text.
///
/// The product snapshot, when loaded, carries the catalogue data as it was
/// joined at read time; the line's own description/price/rate are always
/// authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSource {
    ProductBased {
        product_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        product: Option<Product>,
    },
    Custom,
}

impl ItemSource {
    /// Product reference, if this is a product-based line.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            Self::ProductBased { product_id, .. } => Some(product_id),
            Self::Custom => None,
        }
    }
}

/// One invoice line. Owned exclusively by its invoice; line items have no
/// independent lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Store-assigned identifier; empty until persisted.
    #[serde(default)]
    pub id: String,
    pub source: ItemSource,
    /// Line description (required, non-empty).
    pub description: String,
    /// Invoiced quantity (> 0 under business rules).
    pub quantity: Decimal,
    /// Net unit price (≥ 0 under business rules).
    pub unit_price: Decimal,
    /// VAT rate percentage, 0–100.
    pub tax_rate: Decimal,
    /// Unit of measure; the serializer falls back to a default literal.
    pub unit: Option<String>,
    /// Gross line total: quantity × unit_price × (1 + tax_rate/100),
    /// rounded to cents.
    pub total: Decimal,
}

impl InvoiceItem {
    /// Net amount of this line (before tax), unrounded.
    pub fn subtotal(&self) -> Decimal {
        super::money::line_subtotal(self.quantity, self.unit_price)
    }

    /// Tax amount of this line, unrounded.
    pub fn tax(&self) -> Decimal {
        super::money::line_tax(self.quantity, self.unit_price, self.tax_rate)
    }
}

/// The invoice aggregate: header fields plus its owned line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Store-assigned identifier; empty until persisted.
    #[serde(default)]
    pub id: String,
    /// Unique invoice number, format `INV-YYYY-NNNNNN`.
    pub number: String,
    /// Reference to the customer row.
    pub customer_id: String,
    /// Joined customer, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    /// Sum of line net amounts, rounded to cents.
    pub subtotal: Decimal,
    /// Sum of line tax amounts, rounded to cents.
    pub tax_amount: Decimal,
    /// subtotal + tax_amount, rounded to cents.
    pub total: Decimal,
    pub notes: Option<String>,
    /// Ordered line items.
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Status with overdue derivation applied: a sent invoice past its due
    /// date reads as overdue. Paid and draft invoices never do.
    pub fn effective_status(&self, today: NaiveDate) -> InvoiceStatus {
        match (self.status, self.due_date) {
            (InvoiceStatus::Sent, Some(due)) if due < today => InvoiceStatus::Overdue,
            (status, _) => status,
        }
    }
}
