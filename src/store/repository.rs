//! Customer, product, and help-article access over the row store.
//!
//! Customers and products share the same delete semantics: a two-phase
//! operation that first checks for referencing invoice data, then performs
//! exactly one of a soft delete (flag flip) or a hard delete (row removal),
//! reporting which branch ran.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Filter, ListCache, Order, Row, Store, StoreError, Table, from_row, single_row, to_row};
use crate::core::{Customer, Product};

/// Which branch a delete took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Referenced by invoice data: row kept, `is_active` flipped off.
    SoftDeleted,
    /// Unreferenced: row removed.
    HardDeleted,
}

fn row_without_empty_id(value: &impl Serialize) -> Result<Row, StoreError> {
    let mut row = to_row(value)?;
    if matches!(row.get("id"), Some(Value::String(s)) if s.is_empty()) {
        row.remove("id");
    }
    Ok(row)
}

/// Customer access with a read-through list cache.
pub struct CustomerRepository {
    store: Arc<dyn Store>,
    cache: ListCache<Customer>,
}

impl CustomerRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cache: ListCache::new(),
        }
    }

    /// Cached list of customers, ordered by name. Loads on first use.
    pub async fn list(&self) -> Result<Vec<Customer>, StoreError> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }
        self.refresh().await
    }

    /// Reload from the store, overwriting the snapshot.
    pub async fn refresh(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = self
            .store
            .select(Table::Customers, Filter::new(), Some(Order::asc("name")))
            .await?;
        let customers: Vec<Customer> = rows.into_iter().map(from_row).collect::<Result<_, _>>()?;
        self.cache.store(customers.clone());
        Ok(customers)
    }

    /// Single-row lookup; no match is `None`, never an error.
    pub async fn get(&self, id: &str) -> Result<Option<Customer>, StoreError> {
        let row = single_row(
            self.store
                .select(Table::Customers, Filter::new().eq("id", id), None)
                .await,
        )?;
        row.map(from_row).transpose()
    }

    pub async fn create(&self, customer: &Customer) -> Result<Customer, StoreError> {
        let rows = self
            .store
            .insert(Table::Customers, vec![row_without_empty_id(customer)?])
            .await?;
        self.cache.invalidate();
        from_row(rows.into_iter().next().ok_or_else(|| {
            StoreError::message("insert into customers returned no rows")
        })?)
    }

    pub async fn update(&self, customer: &Customer) -> Result<Customer, StoreError> {
        let updated = self
            .store
            .update(
                Table::Customers,
                to_row(customer)?,
                Filter::new().eq("id", customer.id.as_str()),
            )
            .await?;
        self.cache.invalidate();
        from_row(updated)
    }

    /// Two-phase delete: soft when any invoice references the customer,
    /// hard otherwise.
    pub async fn delete(
        &self,
        id: &str,
        reason: Option<String>,
    ) -> Result<DeleteOutcome, StoreError> {
        let referencing = self
            .store
            .select(Table::Invoices, Filter::new().eq("customer_id", id), None)
            .await?;

        let outcome = if referencing.is_empty() {
            self.store
                .delete(Table::Customers, Filter::new().eq("id", id))
                .await?;
            DeleteOutcome::HardDeleted
        } else {
            let mut patch = Row::new();
            patch.insert("is_active".into(), Value::Bool(false));
            patch.insert(
                "deactivated_at".into(),
                serde_json::to_value(Utc::now())
                    .map_err(|e| StoreError::message(e.to_string()))?,
            );
            patch.insert(
                "deactivation_reason".into(),
                reason.map(Value::String).unwrap_or(Value::Null),
            );
            self.store
                .update(Table::Customers, patch, Filter::new().eq("id", id))
                .await?;
            DeleteOutcome::SoftDeleted
        };

        tracing::debug!(customer_id = id, ?outcome, "customer delete");
        self.cache.invalidate();
        Ok(outcome)
    }
}

/// Product access with a read-through list cache.
pub struct ProductRepository {
    store: Arc<dyn Store>,
    cache: ListCache<Product>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cache: ListCache::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, StoreError> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .store
            .select(Table::Products, Filter::new(), Some(Order::asc("name")))
            .await?;
        let products: Vec<Product> = rows.into_iter().map(from_row).collect::<Result<_, _>>()?;
        self.cache.store(products.clone());
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let row = single_row(
            self.store
                .select(Table::Products, Filter::new().eq("id", id), None)
                .await,
        )?;
        row.map(from_row).transpose()
    }

    pub async fn create(&self, product: &Product) -> Result<Product, StoreError> {
        let rows = self
            .store
            .insert(Table::Products, vec![row_without_empty_id(product)?])
            .await?;
        self.cache.invalidate();
        from_row(rows.into_iter().next().ok_or_else(|| {
            StoreError::message("insert into products returned no rows")
        })?)
    }

    pub async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        let updated = self
            .store
            .update(
                Table::Products,
                to_row(product)?,
                Filter::new().eq("id", product.id.as_str()),
            )
            .await?;
        self.cache.invalidate();
        from_row(updated)
    }

    /// Two-phase delete: soft when any invoice line references the product,
    /// hard otherwise.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, StoreError> {
        let referencing = self
            .store
            .select(Table::InvoiceItems, Filter::new().eq("product_id", id), None)
            .await?;

        let outcome = if referencing.is_empty() {
            self.store
                .delete(Table::Products, Filter::new().eq("id", id))
                .await?;
            DeleteOutcome::HardDeleted
        } else {
            let mut patch = Row::new();
            patch.insert("is_active".into(), Value::Bool(false));
            self.store
                .update(Table::Products, patch, Filter::new().eq("id", id))
                .await?;
            DeleteOutcome::SoftDeleted
        };

        tracing::debug!(product_id = id, ?outcome, "product delete");
        self.cache.invalidate();
        Ok(outcome)
    }
}

/// A help/documentation article shown in the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpArticle {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

/// Read-only access to help content.
pub struct HelpArticleRepository {
    store: Arc<dyn Store>,
}

impl HelpArticleRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<HelpArticle>, StoreError> {
        let rows = self
            .store
            .select(Table::HelpArticles, Filter::new(), Some(Order::asc("title")))
            .await?;
        rows.into_iter().map(from_row).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<HelpArticle>, StoreError> {
        let row = single_row(
            self.store
                .select(Table::HelpArticles, Filter::new().eq("id", id), None)
                .await,
        )?;
        row.map(from_row).transpose()
    }
}
