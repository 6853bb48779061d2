use thiserror::Error;

use crate::io::json_store::StoreError;
use crate::state::data_model::{Field, FieldValue, Row, RowId, ValidationError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("supplier {0} no longer exists")]
    NotFound(RowId),
    #[error("save rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("supplier store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: Vec<RowId>,
    pub failed: Vec<RowId>,
}

impl BulkOutcome {
    pub fn count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Backend that owns the supplier records. The grid reads snapshots from it
/// and writes one field at a time.
///
/// Implementations run on the UI thread; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait SupplierSource {
    /// Authoritative, already filtered and sorted rows. Safe to call while
    /// edits are pending.
    async fn fetch_rows(&self) -> Result<Vec<Row>, SourceError>;

    /// Persists one field and returns the updated row. Retrying with the same
    /// arguments must be harmless.
    async fn save_field(
        &self,
        row_id: &RowId,
        field: Field,
        value: &FieldValue,
    ) -> Result<Row, SourceError>;

    async fn bulk_delete(&self, row_ids: &[RowId]) -> Result<BulkOutcome, SourceError>;

    async fn bulk_archive(&self, row_ids: &[RowId]) -> Result<BulkOutcome, SourceError>;
}
