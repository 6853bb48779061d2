use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::io::replace_file;
use crate::state::data_model::{Field, FieldValue, Row, RowId, SupplierStatus};
use crate::state::source::{BulkOutcome, SourceError, SupplierSource};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSON root is not an array")]
    NotAnArray,
}

pub fn load_rows(path: &Path) -> Result<Vec<Row>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let value: Value = serde_json::from_str(&content)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(StoreError::from))
            .collect(),
        _ => Err(StoreError::NotAnArray),
    }
}

pub fn save_rows(path: &Path, rows: &[Row]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(rows)?;
    replace_file(path, json.as_bytes())?;
    Ok(())
}

/// Supplier store backed by one JSON array file. Every call re-reads the
/// file, so edits made by other processes show up on the next fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update_many<F>(&self, row_ids: &[RowId], mut apply: F) -> Result<BulkOutcome, SourceError>
    where
        F: FnMut(&mut Vec<Row>, &RowId) -> bool,
    {
        let mut rows = load_rows(&self.path)?;
        let mut outcome = BulkOutcome::default();
        for row_id in row_ids {
            if apply(&mut rows, row_id) {
                outcome.succeeded.push(row_id.clone());
            } else {
                outcome.failed.push(row_id.clone());
            }
        }

        if !outcome.succeeded.is_empty() {
            save_rows(&self.path, &rows)?;
        }
        Ok(outcome)
    }
}

impl SupplierSource for JsonFileSource {
    async fn fetch_rows(&self) -> Result<Vec<Row>, SourceError> {
        Ok(load_rows(&self.path)?)
    }

    async fn save_field(
        &self,
        row_id: &RowId,
        field: Field,
        value: &FieldValue,
    ) -> Result<Row, SourceError> {
        value.validate_for(field)?;

        let mut rows = load_rows(&self.path)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == row_id)
            .ok_or_else(|| SourceError::NotFound(row_id.clone()))?;
        if !row.set(field, value.clone()) {
            return Err(SourceError::Rejected(format!(
                "{} cannot hold {}",
                field.label(),
                value.display()
            )));
        }
        let updated = row.clone();

        save_rows(&self.path, &rows)?;
        debug!(row = %row_id, field = field.key(), path = %self.path.display(), "field saved");
        Ok(updated)
    }

    async fn bulk_delete(&self, row_ids: &[RowId]) -> Result<BulkOutcome, SourceError> {
        self.update_many(row_ids, |rows, row_id| {
            let before = rows.len();
            rows.retain(|row| &row.id != row_id);
            rows.len() != before
        })
    }

    async fn bulk_archive(&self, row_ids: &[RowId]) -> Result<BulkOutcome, SourceError> {
        self.update_many(row_ids, |rows, row_id| {
            match rows.iter_mut().find(|row| &row.id == row_id) {
                Some(row) => {
                    row.status = SupplierStatus::Archived;
                    true
                }
                None => false,
            }
        })
    }
}
