//! Invoice persistence pipeline.
//!
//! The store only offers independent per-table calls, so writing an invoice
//! with its line items is a fixed sequence of single-table steps:
//!
//! - create: insert header → insert items
//! - update: update header → delete old items → insert new items
//! - delete: delete items → delete header (children first, no store cascade)
//!
//! Each step waits for the previous one; a failure halts the pipeline and is
//! tagged with the step that failed. There is no rollback; the partial
//! state is surfaced so the caller can retry the remaining steps, and
//! [`InvoiceRepository::replace_items`] re-runs the item replacement alone.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    Filter, ListCache, Order, Store, StoreError, Table, from_row, single_row, to_row,
};
use crate::core::{
    Customer, Invoice, InvoiceItem, InvoiceStatus, ItemSource, validate_invoice,
};

/// Steps of the invoice pipelines. Recovery differs per step, so failures
/// carry the step they happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    InsertHeader,
    UpdateHeader,
    DeleteOldItems,
    InsertItems,
    DeleteItems,
    DeleteHeader,
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InsertHeader => "inserting invoice header",
            Self::UpdateHeader => "updating invoice header",
            Self::DeleteOldItems => "deleting old line items",
            Self::InsertItems => "inserting line items",
            Self::DeleteItems => "deleting line items",
            Self::DeleteHeader => "deleting invoice header",
        };
        f.write_str(s)
    }
}

/// Failure of an invoice pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The invoice failed validation before any write was issued.
    #[error("invoice failed validation: {0}")]
    Validation(String),

    /// A pipeline step failed; earlier steps have already been applied.
    #[error("{step} failed: {source}")]
    Step {
        step: PipelineStep,
        source: StoreError,
    },
}

impl PipelineError {
    /// The step that failed, if this is a step failure.
    pub fn step(&self) -> Option<PipelineStep> {
        match self {
            Self::Step { step, .. } => Some(*step),
            Self::Validation(_) => None,
        }
    }
}

fn step_err(step: PipelineStep) -> impl FnOnce(StoreError) -> PipelineError {
    move |source| {
        tracing::debug!(%step, error = %source, "invoice pipeline step failed");
        PipelineError::Step { step, source }
    }
}

/// Invoice header columns as stored in the `invoices` table.
#[derive(Debug, Serialize, Deserialize)]
struct InvoiceHeaderRow {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    number: String,
    customer_id: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    status: InvoiceStatus,
    subtotal: Decimal,
    tax_amount: Decimal,
    total: Decimal,
    notes: Option<String>,
}

impl InvoiceHeaderRow {
    fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.clone(),
            number: invoice.number.clone(),
            customer_id: invoice.customer_id.clone(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            status: invoice.status,
            subtotal: invoice.subtotal,
            tax_amount: invoice.tax_amount,
            total: invoice.total,
            notes: invoice.notes.clone(),
        }
    }

    fn into_invoice(self, customer: Option<Customer>, items: Vec<InvoiceItem>) -> Invoice {
        Invoice {
            id: self.id,
            number: self.number,
            customer_id: self.customer_id,
            customer,
            issue_date: self.issue_date,
            due_date: self.due_date,
            status: self.status,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total: self.total,
            notes: self.notes,
            items,
        }
    }
}

/// Line item columns as stored in the `invoice_items` table. The product
/// reference is a nullable column; custom lines store null.
#[derive(Debug, Serialize, Deserialize)]
struct InvoiceItemRow {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    invoice_id: String,
    product_id: Option<String>,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
    unit: Option<String>,
    total: Decimal,
}

impl InvoiceItemRow {
    fn from_item(invoice_id: &str, item: &InvoiceItem) -> Self {
        Self {
            id: String::new(),
            invoice_id: invoice_id.to_string(),
            product_id: item.source.product_id().map(str::to_string),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            tax_rate: item.tax_rate,
            unit: item.unit.clone(),
            total: item.total,
        }
    }

    fn into_item(self) -> InvoiceItem {
        let source = match self.product_id {
            Some(product_id) => ItemSource::ProductBased {
                product_id,
                product: None,
            },
            None => ItemSource::Custom,
        };
        InvoiceItem {
            id: self.id,
            source,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_rate: self.tax_rate,
            unit: self.unit,
            total: self.total,
        }
    }
}

/// Invoice access: reads with joined customers and items, and the
/// sequential write pipelines.
pub struct InvoiceRepository {
    store: Arc<dyn Store>,
    cache: ListCache<Invoice>,
}

impl InvoiceRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cache: ListCache::new(),
        }
    }

    /// Cached invoice list, newest first. Loads on first use.
    pub async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }
        self.refresh().await
    }

    /// Reload the list from the store, overwriting the snapshot.
    pub async fn refresh(&self) -> Result<Vec<Invoice>, StoreError> {
        let headers = self
            .store
            .select(Table::Invoices, Filter::new(), Some(Order::desc("issue_date")))
            .await?;
        let item_rows = self
            .store
            .select(Table::InvoiceItems, Filter::new(), None)
            .await?;
        let customer_rows = self
            .store
            .select(Table::Customers, Filter::new(), None)
            .await?;

        let customers: Vec<Customer> = customer_rows
            .into_iter()
            .map(from_row)
            .collect::<Result<_, _>>()?;
        let mut items: Vec<InvoiceItemRow> = item_rows
            .into_iter()
            .map(from_row)
            .collect::<Result<_, _>>()?;

        let mut invoices = Vec::with_capacity(headers.len());
        for header_row in headers {
            let header: InvoiceHeaderRow = from_row(header_row)?;
            let customer = customers.iter().find(|c| c.id == header.customer_id).cloned();
            let own_items = take_items_for(&mut items, &header.id);
            invoices.push(header.into_invoice(customer, own_items));
        }

        self.cache.store(invoices.clone());
        Ok(invoices)
    }

    /// Single invoice with its customer and items; `None` when absent.
    pub async fn get(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        let Some(header_row) = single_row(
            self.store
                .select(Table::Invoices, Filter::new().eq("id", id), None)
                .await,
        )?
        else {
            return Ok(None);
        };
        let header: InvoiceHeaderRow = from_row(header_row)?;

        let items = self.load_items(&header.id).await?;
        let customer = match single_row(
            self.store
                .select(
                    Table::Customers,
                    Filter::new().eq("id", header.customer_id.as_str()),
                    None,
                )
                .await,
        )? {
            Some(row) => Some(from_row(row)?),
            None => None,
        };

        Ok(Some(header.into_invoice(customer, items)))
    }

    async fn load_items(&self, invoice_id: &str) -> Result<Vec<InvoiceItem>, StoreError> {
        let rows = self
            .store
            .select(
                Table::InvoiceItems,
                Filter::new().eq("invoice_id", invoice_id),
                None,
            )
            .await?;
        rows.into_iter()
            .map(|row| from_row::<InvoiceItemRow>(row).map(InvoiceItemRow::into_item))
            .collect()
    }

    /// Create pipeline: insert header, then insert items.
    pub async fn create(&self, invoice: &Invoice) -> Result<Invoice, PipelineError> {
        self.validate(invoice)?;

        let header_row = to_row(&InvoiceHeaderRow::from_invoice(invoice))
            .map_err(step_err(PipelineStep::InsertHeader))?;
        let inserted = self
            .store
            .insert(Table::Invoices, vec![header_row])
            .await
            .map_err(step_err(PipelineStep::InsertHeader))?;
        let header: InvoiceHeaderRow = from_row(
            inserted
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::message("insert into invoices returned no rows"))
                .map_err(step_err(PipelineStep::InsertHeader))?,
        )
        .map_err(step_err(PipelineStep::InsertHeader))?;

        let items = self.insert_items(&header.id, &invoice.items).await?;

        tracing::info!(invoice = %header.number, "invoice created");
        self.refresh_after_write().await;
        Ok(header.into_invoice(invoice.customer.clone(), items))
    }

    /// Update pipeline: update header, delete old items, insert new items.
    ///
    /// A step-2 or step-3 failure leaves the documented intermediate state;
    /// [`Self::replace_items`] retries those steps without re-running step 1.
    pub async fn update(&self, invoice: &Invoice) -> Result<Invoice, PipelineError> {
        if invoice.id.trim().is_empty() {
            return Err(PipelineError::Validation(
                "invoice has no store id; use create".into(),
            ));
        }
        self.validate(invoice)?;

        let header_row = to_row(&InvoiceHeaderRow::from_invoice(invoice))
            .map_err(step_err(PipelineStep::UpdateHeader))?;
        self.store
            .update(
                Table::Invoices,
                header_row,
                Filter::new().eq("id", invoice.id.as_str()),
            )
            .await
            .map_err(step_err(PipelineStep::UpdateHeader))?;

        let items = self.replace_items(&invoice.id, &invoice.items).await?;

        tracing::info!(invoice = %invoice.number, "invoice updated");
        self.refresh_after_write().await;

        let mut updated = invoice.clone();
        updated.items = items;
        Ok(updated)
    }

    /// Steps 2+3 of the update pipeline: delete the old item set, insert the
    /// new one. Public so a step-2/3 failure can be retried alone.
    pub async fn replace_items(
        &self,
        invoice_id: &str,
        items: &[InvoiceItem],
    ) -> Result<Vec<InvoiceItem>, PipelineError> {
        self.store
            .delete(
                Table::InvoiceItems,
                Filter::new().eq("invoice_id", invoice_id),
            )
            .await
            .map_err(step_err(PipelineStep::DeleteOldItems))?;

        self.insert_items(invoice_id, items).await
    }

    async fn insert_items(
        &self,
        invoice_id: &str,
        items: &[InvoiceItem],
    ) -> Result<Vec<InvoiceItem>, PipelineError> {
        let rows = items
            .iter()
            .map(|item| to_row(&InvoiceItemRow::from_item(invoice_id, item)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(step_err(PipelineStep::InsertItems))?;

        let inserted = self
            .store
            .insert(Table::InvoiceItems, rows)
            .await
            .map_err(step_err(PipelineStep::InsertItems))?;

        inserted
            .into_iter()
            .map(|row| from_row::<InvoiceItemRow>(row).map(InvoiceItemRow::into_item))
            .collect::<Result<_, _>>()
            .map_err(step_err(PipelineStep::InsertItems))
    }

    /// Delete pipeline: items first, then the header.
    pub async fn delete(&self, id: &str) -> Result<(), PipelineError> {
        self.store
            .delete(Table::InvoiceItems, Filter::new().eq("invoice_id", id))
            .await
            .map_err(step_err(PipelineStep::DeleteItems))?;
        self.store
            .delete(Table::Invoices, Filter::new().eq("id", id))
            .await
            .map_err(step_err(PipelineStep::DeleteHeader))?;

        tracing::info!(invoice_id = id, "invoice deleted");
        self.refresh_after_write().await;
        Ok(())
    }

    /// Single-row status write, outside the pipeline. `None` when the
    /// invoice does not exist.
    pub async fn set_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Option<Invoice>, StoreError> {
        let mut patch = super::Row::new();
        patch.insert(
            "status".into(),
            serde_json::Value::String(status.as_str().into()),
        );
        match self
            .store
            .update(Table::Invoices, patch, Filter::new().eq("id", id))
            .await
        {
            Ok(_) => {
                self.cache.invalidate();
                self.get(id).await
            }
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn validate(&self, invoice: &Invoice) -> Result<(), PipelineError> {
        let errors = validate_invoice(invoice);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Validation(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ))
        }
    }

    /// Read-through refresh after a successful pipeline. The write already
    /// succeeded, so a refresh failure degrades to cache invalidation.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "invoice list refresh failed after write");
            self.cache.invalidate();
        }
    }
}

/// Split the rows belonging to `invoice_id` out of `rows` as items,
/// preserving order.
fn take_items_for(rows: &mut Vec<InvoiceItemRow>, invoice_id: &str) -> Vec<InvoiceItem> {
    let mut own = Vec::new();
    let mut rest = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        if row.invoice_id == invoice_id {
            own.push(row.into_item());
        } else {
            rest.push(row);
        }
    }
    *rows = rest;
    own
}
