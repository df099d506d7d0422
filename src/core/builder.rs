use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::FatturaError;
use super::money;
use super::totals::compute_totals;
use super::types::*;
use super::validation;

/// Builder for constructing consistent invoices.
///
/// ```
/// use fattura::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-2025-000001", NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
///     .customer(CustomerBuilder::new("Rossi SRL").vat_number("01234567890").build())
///     .add_item(InvoiceItemBuilder::new("Consulenza", dec!(4), dec!(50)).tax_rate(dec!(22)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.total, dec!(244.00));
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    status: InvoiceStatus,
    customer_id: Option<String>,
    customer: Option<Customer>,
    notes: Option<String>,
    items: Vec<InvoiceItem>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            due_date: None,
            status: InvoiceStatus::Draft,
            customer_id: None,
            customer: None,
            notes: None,
            items: Vec::new(),
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Reference a customer by store id without attaching the row.
    pub fn customer_id(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    /// Attach a customer; its id (possibly empty for unsaved customers)
    /// becomes the invoice's customer reference.
    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer_id = Some(customer.id.clone());
        self.customer = Some(customer);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn add_item(mut self, item: InvoiceItem) -> Self {
        self.items.push(item);
        self
    }

    /// Build the invoice, computing totals and running validation.
    /// Returns all validation errors joined (not just the first).
    pub fn build(self) -> Result<Invoice, FatturaError> {
        let invoice = self.assemble()?;

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            let msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FatturaError::Validation(msg));
        }

        Ok(invoice)
    }

    /// Build without validation, useful for tests or importing rows that
    /// are known to be inconsistent.
    pub fn build_unchecked(self) -> Result<Invoice, FatturaError> {
        self.assemble()
    }

    fn assemble(self) -> Result<Invoice, FatturaError> {
        if self.number.trim().is_empty() {
            return Err(FatturaError::Builder("invoice number is required".into()));
        }
        if self.items.len() > 10_000 {
            return Err(FatturaError::Builder(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }

        let customer_id = match (&self.customer_id, &self.customer) {
            (Some(id), _) => id.clone(),
            (None, Some(c)) => c.id.clone(),
            (None, None) => String::new(),
        };

        let totals = compute_totals(&self.items);

        Ok(Invoice {
            id: String::new(),
            number: self.number,
            customer_id,
            customer: self.customer,
            issue_date: self.issue_date,
            due_date: self.due_date,
            status: self.status,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total: totals.total,
            notes: self.notes,
            items: self.items,
        })
    }
}

/// Builder for invoice lines. Lines are custom (free text) unless a product
/// source is attached.
pub struct InvoiceItemBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
    unit: Option<String>,
    source: ItemSource,
}

impl InvoiceItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tax_rate: dec!(22),
            unit: None,
            source: ItemSource::Custom,
        }
    }

    /// Start a line from a catalogue product: description, price, rate, and
    /// unit are snapshotted from the product at build time.
    pub fn from_product(product: Product, quantity: Decimal) -> Self {
        Self {
            description: product.name.clone(),
            quantity,
            unit_price: product.unit_price,
            tax_rate: product.tax_rate,
            unit: product.unit.clone(),
            source: ItemSource::ProductBased {
                product_id: product.id.clone(),
                product: Some(product),
            },
        }
    }

    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn build(self) -> InvoiceItem {
        let total = money::round2(money::line_total(self.quantity, self.unit_price, self.tax_rate));
        InvoiceItem {
            id: String::new(),
            source: self.source,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_rate: self.tax_rate,
            unit: self.unit,
            total,
        }
    }
}

/// Builder for Customer.
pub struct CustomerBuilder {
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    tax_code: Option<String>,
    vat_number: Option<String>,
}

impl CustomerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            tax_code: None,
            vat_number: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn tax_code(mut self, code: impl Into<String>) -> Self {
        self.tax_code = Some(code.into());
        self
    }

    pub fn vat_number(mut self, vat: impl Into<String>) -> Self {
        self.vat_number = Some(vat.into());
        self
    }

    pub fn build(self) -> Customer {
        Customer {
            id: String::new(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            tax_code: self.tax_code,
            vat_number: self.vat_number,
            is_active: true,
            deactivated_at: None,
            deactivation_reason: None,
        }
    }
}
