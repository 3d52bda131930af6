//! Error types for the sync layer.

use lexisync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a sync call. Any of them leaves the store untouched.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Storage error; the batch transaction was rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record in the batch is missing a required field.
    #[error("invalid record at index {index} (id {id}): {source}")]
    InvalidRecord {
        index: usize,
        id: String,
        #[source]
        source: lexisync_types::Error,
    },

    /// The batch exceeds the configured size limit.
    #[error("batch of {size} records exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
}
