//! Abstract row store and the persistence components built on it.
//!
//! The store collaborator exposes independent per-table CRUD calls; no
//! multi-table transaction primitive is assumed. Rows travel as JSON object
//! maps, the shape a hosted PostgREST-style backend serves.
//!
//! [`orchestrator::InvoiceRepository`] sequences the multi-step invoice
//! writes; [`repository`] holds the customer/product/help-article access
//! with soft/hard delete; [`memory::MemoryStore`] is an in-process
//! implementation for tests and demos.

mod cache;
pub mod memory;
pub mod orchestrator;
pub mod repository;

pub use cache::ListCache;
pub use memory::MemoryStore;
pub use orchestrator::{InvoiceRepository, PipelineError, PipelineStep};
pub use repository::{
    CustomerRepository, DeleteOutcome, HelpArticle, HelpArticleRepository, ProductRepository,
};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A stored row: column name → JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Tables the application consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Customers,
    Products,
    Invoices,
    InvoiceItems,
    HelpArticles,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Invoices => "invoices",
            Self::InvoiceItems => "invoice_items",
            Self::HelpArticles => "help_articles",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code a PostgREST-style backend uses for "no rows returned".
/// Single-row lookups map it to `None` instead of failing.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Failure from the external store: optional backend code plus message.
#[derive(Debug, Clone, Error)]
#[error("store error{}: {message}", .code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default())]
pub struct StoreError {
    pub code: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn no_rows(table: Table) -> Self {
        Self::new(NO_ROWS_CODE, format!("no rows returned from {table}"))
    }

    pub fn is_no_rows(&self) -> bool {
        self.code.as_deref() == Some(NO_ROWS_CODE)
    }
}

/// Conjunction of column equality conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter(Vec<(String, serde_json::Value)>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column = value` condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.0.iter().all(|(column, value)| {
            row.get(column).unwrap_or(&serde_json::Value::Null) == value
        })
    }
}

/// Sort directive for `select`.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// The external store collaborator. Every call is independent and may fail
/// with a [`StoreError`]; single-row writes are assumed atomic per row.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn select(
        &self,
        table: Table,
        filter: Filter,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Insert rows, returning them with store-assigned columns (ids) filled.
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Patch the single row matching `filter`, returning the updated row.
    /// Fails with the no-rows code when nothing matches.
    async fn update(&self, table: Table, patch: Row, filter: Filter) -> Result<Row, StoreError>;

    async fn delete(&self, table: Table, filter: Filter) -> Result<(), StoreError>;
}

/// Serialize an entity into a row map.
pub(crate) fn to_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::message(format!(
            "expected object row, got {other}"
        ))),
        Err(e) => Err(StoreError::message(format!("row serialization failed: {e}"))),
    }
}

/// Deserialize a row map into an entity.
pub(crate) fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| StoreError::message(format!("row deserialization failed: {e}")))
}

/// Normalize a single-row lookup: no-rows errors and empty result sets both
/// become `None`; real failures propagate.
pub(crate) fn single_row(
    result: Result<Vec<Row>, StoreError>,
) -> Result<Option<Row>, StoreError> {
    match result {
        Ok(mut rows) => {
            if rows.is_empty() {
                Ok(None)
            } else {
                Ok(Some(rows.swap_remove(0)))
            }
        }
        Err(e) if e.is_no_rows() => Ok(None),
        Err(e) => Err(e),
    }
}
