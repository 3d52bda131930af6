//! Core type definitions for lexisync.
//!
//! This crate defines the record shapes shared by the storage layer, the
//! reconciliation engine and the HTTP surface:
//! - Record identifiers (client-supplied or UUID v7)
//! - Lenient ISO-8601 timestamps used for last-write-wins arbitration
//! - Vocabulary records and the single-record create/update payloads
//! - Reading-progress records
//!
//! Wire names are camelCase; the snake_case storage names are accepted as
//! aliases on every typed input.

mod ids;
mod progress;
mod record;
mod timestamp;

pub use ids::RecordId;
pub use progress::{ProgressRecord, ProgressUpdate};
pub use record::{NewVocabulary, VocabularyPatch, VocabularyRecord, DEFAULT_STATUS};
pub use timestamp::SyncTimestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or validating records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// Treats empty strings the same as absent values.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
