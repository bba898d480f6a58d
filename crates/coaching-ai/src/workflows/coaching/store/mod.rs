//! Spreadsheet-backed persistence: a minimal row store plus the versioned
//! submission schema and ledger layered on top of it.

mod csv_store;
mod ledger;
mod memory;
mod schema;

pub use csv_store::CsvSheetStore;
pub use ledger::{RecordFilter, StoredCategory, StoredSubmission, SubmissionLedger};
pub use memory::MemorySheetStore;
pub use schema::{Column, RowSchema, SCHEMA_VERSION, SUBMITTED_STATUS};

/// Row-oriented sheet. The first row (headers) is owned by the store and is
/// never returned by `read_all_rows`.
pub trait SheetStore: Send + Sync {
    fn append_row(&self, row: Vec<String>) -> Result<(), StoreError>;
    fn read_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError>;
    /// Replaces every data row, keeping the header.
    fn replace_rows(&self, rows: Vec<Vec<String>>) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sheet io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("sheet is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error(
        "sheet header does not match the expected layout ({} columns expected, {} found)",
        .expected.len(),
        .found.len()
    )]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("sheet store unavailable: {0}")]
    Unavailable(String),
}
