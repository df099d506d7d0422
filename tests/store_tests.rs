#![cfg(feature = "store")]

//! Repository and persistence pipeline tests against the in-memory store.
//!
//! Run with: `cargo test --features all --test store_tests`

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use fattura::core::*;
use fattura::store::{
    CustomerRepository, DeleteOutcome, Filter, InvoiceRepository, MemoryStore, Order,
    PipelineStep, ProductRepository, Row, Store, StoreError, Table,
};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn customer() -> Customer {
    CustomerBuilder::new("Rossi SRL")
        .vat_number("01234567890")
        .build()
}

fn product() -> Product {
    Product {
        id: String::new(),
        name: "Hosting annuale".into(),
        description: None,
        category: Some("servizi".into()),
        unit_price: dec!(120),
        tax_rate: dec!(22),
        unit: Some("pz".into()),
        is_active: true,
    }
}

fn draft_invoice(customer_id: &str, number: &str) -> Invoice {
    InvoiceBuilder::new(number, date(2025, 3, 10))
        .customer_id(customer_id)
        .due_date(date(2025, 4, 10))
        .add_item(
            InvoiceItemBuilder::new("Sviluppo Web", dec!(1), dec!(800))
                .tax_rate(dec!(22))
                .build(),
        )
        .add_item(
            InvoiceItemBuilder::new("Consulenza", dec!(4), dec!(50))
                .tax_rate(dec!(22))
                .build(),
        )
        .build()
        .expect("valid invoice")
}

// ---------------------------------------------------------------------------
// Customer repository: soft vs hard delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreferenced_customer_is_hard_deleted() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());

    let saved = customers.create(&customer()).await.unwrap();
    assert!(!saved.id.is_empty());

    let outcome = customers.delete(&saved.id, None).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::HardDeleted);
    assert_eq!(store.row_count(Table::Customers), 0);
    assert!(customers.get(&saved.id).await.unwrap().is_none());
}

#[tokio::test]
async fn referenced_customer_is_soft_deleted() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let saved = customers.create(&customer()).await.unwrap();
    invoices
        .create(&draft_invoice(&saved.id, "INV-2025-000001"))
        .await
        .unwrap();

    let outcome = customers
        .delete(&saved.id, Some("cessata attività".into()))
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::SoftDeleted);

    let kept = customers.get(&saved.id).await.unwrap().expect("row kept");
    assert!(!kept.is_active);
    assert!(kept.deactivated_at.is_some());
    assert_eq!(kept.deactivation_reason.as_deref(), Some("cessata attività"));
}

// ---------------------------------------------------------------------------
// Product repository
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_delete_branches_on_references() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let products = ProductRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let free = products.create(&product()).await.unwrap();
    let used = products.create(&product()).await.unwrap();

    let c = customers.create(&customer()).await.unwrap();
    let invoice = InvoiceBuilder::new("INV-2025-000002", date(2025, 3, 12))
        .customer_id(&c.id)
        .add_item(InvoiceItemBuilder::from_product(used.clone(), dec!(1)).build())
        .build()
        .unwrap();
    invoices.create(&invoice).await.unwrap();

    assert_eq!(
        products.delete(&free.id).await.unwrap(),
        DeleteOutcome::HardDeleted
    );
    assert_eq!(
        products.delete(&used.id).await.unwrap(),
        DeleteOutcome::SoftDeleted
    );
    let kept = products.get(&used.id).await.unwrap().expect("row kept");
    assert!(!kept.is_active);
}

// ---------------------------------------------------------------------------
// Invoice pipeline: create / read / update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_inserts_header_and_items() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let c = customers.create(&customer()).await.unwrap();
    let created = invoices
        .create(&draft_invoice(&c.id, "INV-2025-000003"))
        .await
        .unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.items.len(), 2);
    assert!(created.items.iter().all(|i| !i.id.is_empty()));
    assert_eq!(store.row_count(Table::InvoiceItems), 2);

    let loaded = invoices.get(&created.id).await.unwrap().expect("exists");
    assert_eq!(loaded.total, dec!(1220.00));
    assert_eq!(loaded.customer.as_ref().map(|c| c.name.as_str()), Some("Rossi SRL"));
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.items[0].description, "Sviluppo Web");
}

#[tokio::test]
async fn create_rejects_inconsistent_invoice() {
    let store = Arc::new(MemoryStore::new());
    let invoices = InvoiceRepository::new(store.clone());

    let mut invoice = draft_invoice("1", "INV-2025-000004");
    invoice.total = dec!(9.99);

    let err = invoices.create(&invoice).await.unwrap_err();
    assert!(err.step().is_none());
    assert!(err.to_string().contains("totale"));
    assert_eq!(store.row_count(Table::Invoices), 0);
}

#[tokio::test]
async fn update_replaces_item_set() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let c = customers.create(&customer()).await.unwrap();
    let created = invoices
        .create(&draft_invoice(&c.id, "INV-2025-000005"))
        .await
        .unwrap();

    let mut updated = InvoiceBuilder::new("INV-2025-000005", date(2025, 3, 10))
        .customer_id(&c.id)
        .add_item(
            InvoiceItemBuilder::new("Manutenzione", dec!(2), dec!(150))
                .tax_rate(dec!(22))
                .build(),
        )
        .build()
        .unwrap();
    updated.id = created.id.clone();

    let saved = invoices.update(&updated).await.unwrap();
    assert_eq!(saved.items.len(), 1);
    assert_eq!(store.row_count(Table::InvoiceItems), 1);

    let loaded = invoices.get(&created.id).await.unwrap().expect("exists");
    assert_eq!(loaded.items[0].description, "Manutenzione");
    assert_eq!(loaded.total, dec!(366.00));
}

#[tokio::test]
async fn delete_removes_items_then_header() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let c = customers.create(&customer()).await.unwrap();
    let created = invoices
        .create(&draft_invoice(&c.id, "INV-2025-000006"))
        .await
        .unwrap();

    invoices.delete(&created.id).await.unwrap();
    assert_eq!(store.row_count(Table::Invoices), 0);
    assert_eq!(store.row_count(Table::InvoiceItems), 0);
    assert!(invoices.get(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn get_missing_invoice_is_none_not_error() {
    let store = Arc::new(MemoryStore::new());
    let invoices = InvoiceRepository::new(store);
    assert!(invoices.get("999").await.unwrap().is_none());
}

#[tokio::test]
async fn set_status_single_row_write() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let c = customers.create(&customer()).await.unwrap();
    let created = invoices
        .create(&draft_invoice(&c.id, "INV-2025-000007"))
        .await
        .unwrap();

    let updated = invoices
        .set_status(&created.id, InvoiceStatus::Sent)
        .await
        .unwrap()
        .expect("exists");
    assert_eq!(updated.status, InvoiceStatus::Sent);

    assert!(invoices.set_status("999", InvoiceStatus::Paid).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Step failure and differentiated retry
// ---------------------------------------------------------------------------

/// Store wrapper that fails the next N `delete` calls on `invoice_items`.
struct FailingDeleteStore {
    inner: MemoryStore,
    remaining_failures: AtomicUsize,
}

impl FailingDeleteStore {
    fn new(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait::async_trait]
impl Store for FailingDeleteStore {
    async fn select(
        &self,
        table: Table,
        filter: Filter,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError> {
        self.inner.select(table, filter, order).await
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        self.inner.insert(table, rows).await
    }

    async fn update(&self, table: Table, patch: Row, filter: Filter) -> Result<Row, StoreError> {
        self.inner.update(table, patch, filter).await
    }

    async fn delete(&self, table: Table, filter: Filter) -> Result<(), StoreError> {
        if table == Table::InvoiceItems {
            let remaining = self.remaining_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::message("connection reset"));
            }
        }
        self.inner.delete(table, filter).await
    }
}

#[tokio::test]
async fn step_two_failure_is_tagged_and_retryable() {
    let store = Arc::new(FailingDeleteStore::new(1));
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let c = customers.create(&customer()).await.unwrap();
    let created = invoices
        .create(&draft_invoice(&c.id, "INV-2025-000008"))
        .await
        .unwrap();

    let mut updated = InvoiceBuilder::new("INV-2025-000008", date(2025, 3, 10))
        .customer_id(&c.id)
        .add_item(
            InvoiceItemBuilder::new("Manutenzione", dec!(2), dec!(150))
                .tax_rate(dec!(22))
                .build(),
        )
        .build()
        .unwrap();
    updated.id = created.id.clone();

    // Step 2 fails: the error names the step, the header is already updated,
    // and the old items are still in place.
    let err = invoices.update(&updated).await.unwrap_err();
    assert_eq!(err.step(), Some(PipelineStep::DeleteOldItems));
    assert_eq!(store.inner.row_count(Table::InvoiceItems), 2);

    let intermediate = invoices.get(&created.id).await.unwrap().expect("exists");
    assert_eq!(intermediate.total, dec!(366.00), "header already carries new totals");
    assert_eq!(intermediate.items.len(), 2, "old items still present");

    // Retrying steps 2+3 alone converges to the clean-run result.
    let items = invoices
        .replace_items(&created.id, &updated.items)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);

    let final_state = invoices.get(&created.id).await.unwrap().expect("exists");
    assert_eq!(final_state.items.len(), 1);
    assert_eq!(final_state.items[0].description, "Manutenzione");
    assert_eq!(final_state.total, dec!(366.00));
    assert!(validate_invoice(&final_state).is_empty());
}

// ---------------------------------------------------------------------------
// List cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_cached_until_refresh() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());

    customers.create(&customer()).await.unwrap();
    let first = customers.list().await.unwrap();
    assert_eq!(first.len(), 1);

    // Write behind the repository's back: the cached snapshot is stale
    // until an explicit refresh.
    let mut row = Row::new();
    row.insert("name".into(), serde_json::Value::String("Verdi SPA".into()));
    row.insert("is_active".into(), serde_json::Value::Bool(true));
    store.insert(Table::Customers, vec![row]).await.unwrap();

    assert_eq!(customers.list().await.unwrap().len(), 1);
    assert_eq!(customers.refresh().await.unwrap().len(), 2);
    assert_eq!(customers.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn invoice_list_newest_first_with_items_attached() {
    let store = Arc::new(MemoryStore::new());
    let customers = CustomerRepository::new(store.clone());
    let invoices = InvoiceRepository::new(store.clone());

    let c = customers.create(&customer()).await.unwrap();
    let mut old = draft_invoice(&c.id, "INV-2025-000010");
    old.issue_date = date(2025, 1, 5);
    invoices.create(&old).await.unwrap();
    invoices
        .create(&draft_invoice(&c.id, "INV-2025-000011"))
        .await
        .unwrap();

    let list = invoices.list().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].number, "INV-2025-000011");
    assert_eq!(list[1].number, "INV-2025-000010");
    assert!(list.iter().all(|i| i.items.len() == 2));
    assert!(list.iter().all(|i| i.customer.is_some()));
}
