//! Read-through list cache.
//!
//! Each repository owns one cache for its "current list" snapshot. Reloads
//! simply overwrite the snapshot (last write wins); there is no merge or
//! conflict detection, and consumers refresh explicitly after writes.

use std::sync::Mutex;

/// Cached list snapshot with an explicit invalidate/refresh contract.
#[derive(Debug, Default)]
pub struct ListCache<T> {
    entries: Mutex<Option<Vec<T>>>,
}

impl<T: Clone> ListCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(None),
        }
    }

    /// Current snapshot, if one is loaded.
    pub fn get(&self) -> Option<Vec<T>> {
        self.entries.lock().expect("cache lock").clone()
    }

    /// Replace the snapshot.
    pub fn store(&self, entries: Vec<T>) {
        *self.entries.lock().expect("cache lock") = Some(entries);
    }

    /// Drop the snapshot; the next read loads from the store.
    pub fn invalidate(&self) {
        *self.entries.lock().expect("cache lock") = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.lock().expect("cache lock").is_some()
    }
}
