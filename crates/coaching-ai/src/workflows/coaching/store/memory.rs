use std::sync::Mutex;

use super::{SheetStore, StoreError};

/// In-process sheet used by the demo command and tests.
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    headers: Vec<String>,
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemorySheetStore {
    pub fn new(headers: Vec<String>) -> Self {
        Self::with_rows(headers, Vec::new())
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows: Mutex::new(rows),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Snapshot of the data rows.
    pub fn rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.read_all_rows()
    }
}

impl SheetStore for MemorySheetStore {
    fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("memory sheet poisoned".to_string()))?
            .push(row);
        Ok(())
    }

    fn read_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .map_err(|_| StoreError::Unavailable("memory sheet poisoned".to_string()))
    }

    fn replace_rows(&self, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("memory sheet poisoned".to_string()))?;
        *guard = rows;
        Ok(())
    }
}
