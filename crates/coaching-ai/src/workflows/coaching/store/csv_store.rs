use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{SheetStore, StoreError};

/// CSV file acting as a single spreadsheet tab.
///
/// Writers within the process are serialized through a mutex; the file itself
/// assumes a single writing process.
#[derive(Debug)]
pub struct CsvSheetStore {
    path: PathBuf,
    headers: Vec<String>,
    lock: Mutex<()>,
}

impl CsvSheetStore {
    /// Opens the sheet, creating it with a header row when absent or empty.
    ///
    /// An existing sheet must carry exactly `headers`; any other layout is a
    /// `StoreError::SchemaMismatch` so rows are never read through the wrong columns.
    pub fn open(path: impl Into<PathBuf>, headers: Vec<String>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self::unchecked(path, headers);
        match store.read_header()? {
            Some(found) => store.check_header(found)?,
            None => store.write_sheet(&store.path, &[])?,
        }

        Ok(store)
    }

    /// Opens a sheet only if it already exists, without creating anything.
    ///
    /// Returns `None` for a missing or empty file.
    pub fn open_existing(
        path: impl Into<PathBuf>,
        headers: Vec<String>,
    ) -> Result<Option<Self>, StoreError> {
        let store = Self::unchecked(path.into(), headers);
        match store.read_header()? {
            Some(found) => {
                store.check_header(found)?;
                Ok(Some(store))
            }
            None => Ok(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unchecked(path: PathBuf, headers: Vec<String>) -> Self {
        Self {
            path,
            headers,
            lock: Mutex::new(()),
        }
    }

    fn read_header(&self) -> Result<Option<Vec<String>>, StoreError> {
        match fs::metadata(&self.path) {
            Ok(metadata) if metadata.len() == 0 => return Ok(None),
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        match reader.records().next() {
            Some(record) => Ok(Some(
                record?.iter().map(|cell| cell.trim().to_string()).collect(),
            )),
            None => Ok(None),
        }
    }

    fn check_header(&self, found: Vec<String>) -> Result<(), StoreError> {
        if found == self.headers {
            Ok(())
        } else {
            Err(StoreError::SchemaMismatch {
                expected: self.headers.clone(),
                found,
            })
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Unavailable("sheet lock poisoned".to_string()))
    }

    fn write_sheet(&self, target: &Path, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(target)?;
        writer.write_record(&self.headers)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl SheetStore for CsvSheetStore {
    fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }

    fn read_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let _guard = self.guard()?;
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn replace_rows(&self, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let staging = self.path.with_extension("csv.tmp");
        self.write_sheet(&staging, &rows)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
