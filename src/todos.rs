//! To-do list management.
//!
//! Same shape as the timer repository but over plain records: no derived
//! state, no lifecycle beyond create, update, delete and reorder.

use log::{debug, info, warn};

use crate::{generate_id, Config, Result, StorageBackend, TickError, TodoRecord, TODOS_KEY};

/// Manages the storage and ordering of to-do items.
pub struct TodoRepository<S: StorageBackend> {
    store: S,
    id_length: usize,
}

impl<S: StorageBackend> TodoRepository<S> {
    pub fn new(store: S, config: &Config) -> Self {
        TodoRepository {
            store,
            id_length: config.id_length,
        }
    }

    /// Returns all items in stored order.
    pub fn list(&self) -> Result<Vec<TodoRecord>> {
        self.load_records()
    }

    /// Appends a new item and returns the updated collection. When no
    /// content is given, a placeholder based on the current count is used.
    pub fn create(&mut self, content: Option<&str>) -> Result<Vec<TodoRecord>> {
        let mut records = self.load_records()?;

        let id = generate_id(self.id_length);
        let content = match content {
            Some(text) => text.to_string(),
            None => format!("TODO {}", records.len() + 1),
        };
        info!("Creating to-do item {}", id);

        records.push(TodoRecord { id, content });
        self.save_records(&records)?;
        Ok(records)
    }

    /// Removes the item with the given id; unknown ids are tolerated.
    pub fn delete(&mut self, id: &str) -> Result<Vec<TodoRecord>> {
        let mut records = self.load_records()?;
        let before = records.len();

        records.retain(|record| record.id != id);
        if records.len() < before {
            info!("Deleted to-do item {}", id);
        } else {
            debug!("Delete targeted unknown to-do item {}", id);
        }

        self.save_records(&records)?;
        Ok(records)
    }

    /// Replaces the item's text verbatim.
    pub fn update_content(&mut self, id: &str, content: &str) -> Result<Vec<TodoRecord>> {
        let mut records = self.load_records()?;

        match records.iter_mut().find(|record| record.id == id) {
            Some(record) => record.content = content.to_string(),
            None => {
                debug!("To-do item not found: {}", id);
                return Err(TickError::TodoNotFound { id: id.to_string() });
            }
        }

        self.save_records(&records)?;
        Ok(records)
    }

    /// Reorders the collection to match the supplied id list. The list
    /// must contain exactly the stored ids, each once; anything else is
    /// rejected without touching the stored order.
    pub fn reorder(&mut self, ids: &[String]) -> Result<Vec<TodoRecord>> {
        let records = self.load_records()?;

        if ids.len() != records.len() {
            warn!(
                "Reorder rejected: got {} ids for {} items",
                ids.len(),
                records.len()
            );
            return Err(TickError::ReorderMismatch {
                message: format!("expected {} ids, got {}", records.len(), ids.len()),
            });
        }

        let mut remaining = records;
        let mut reordered = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(position) = remaining.iter().position(|record| &record.id == id) else {
                warn!("Reorder rejected: unknown or duplicate id {}", id);
                return Err(TickError::ReorderMismatch {
                    message: format!("unknown or duplicate id {}", id),
                });
            };
            reordered.push(remaining.swap_remove(position));
        }

        self.save_records(&reordered)?;
        Ok(reordered)
    }

    fn load_records(&self) -> Result<Vec<TodoRecord>> {
        let Some(blob) = self.store.get(TODOS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&blob) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Malformed to-do collection, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save_records(&mut self, records: &[TodoRecord]) -> Result<()> {
        let blob = serde_json::to_string(records)?;
        self.store.set(TODOS_KEY, &blob)
    }
}
