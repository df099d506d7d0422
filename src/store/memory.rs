//! In-process [`Store`] implementation.
//!
//! Backs tests and demos. Ids are store-assigned sequential strings, the
//! way a hosted backend assigns row identifiers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use super::{Filter, Order, Row, Store, StoreError, Table};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Row>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn assign_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Number of rows currently in `table`. Test helper.
    pub fn row_count(&self, table: Table) -> usize {
        self.tables
            .lock()
            .expect("memory store lock")
            .get(&table)
            .map_or(0, Vec::len)
    }
}

fn sort_rows(rows: &mut [Row], order: &Order) {
    rows.sort_by(|a, b| {
        let left = a.get(&order.column).unwrap_or(&Value::Null);
        let right = b.get(&order.column).unwrap_or(&Value::Null);
        let cmp = compare_values(left, right);
        if order.ascending { cmp } else { cmp.reverse() }
    });
}

fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Equal,
        (Value::Null, _) => Less,
        (_, Value::Null) => Greater,
        _ => Equal,
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn select(
        &self,
        table: Table,
        filter: Filter,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock().expect("memory store lock");
        let mut rows: Vec<Row> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = order {
            sort_rows(&mut rows, &order);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            let needs_id = !matches!(row.get("id"), Some(Value::String(s)) if !s.is_empty());
            if needs_id {
                row.insert("id".into(), Value::String(self.assign_id()));
            }
            inserted.push(row);
        }

        let mut tables = self.tables.lock().expect("memory store lock");
        tables
            .entry(table)
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn update(&self, table: Table, patch: Row, filter: Filter) -> Result<Row, StoreError> {
        let mut tables = self.tables.lock().expect("memory store lock");
        let rows = tables.entry(table).or_default();

        match rows.iter_mut().find(|r| filter.matches(r)) {
            Some(row) => {
                for (column, value) in patch {
                    row.insert(column, value);
                }
                Ok(row.clone())
            }
            None => Err(StoreError::no_rows(table)),
        }
    }

    async fn delete(&self, table: Table, filter: Filter) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("memory store lock");
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|r| !filter.matches(r));
        }
        Ok(())
    }
}
