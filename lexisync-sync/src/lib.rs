//! Vocabulary reconciliation engine for lexisync.
//!
//! Clients edit their vocabulary offline and periodically push everything they
//! have. The engine decides, record by record, whether each pushed record
//! supersedes what the server holds, then answers with the complete record
//! set so the client can replace its cache.
//!
//! # Architecture
//!
//! The engine applies one fixed policy (last-write-wins on `updated_at`) over
//! one fixed record shape. It is not a general merge framework.
//!
//! ## Components
//!
//! - **Normalizer**: resolves camelCase/snake_case aliases and fills in ids,
//!   timestamps and the default status
//! - **Reconciler**: decides whether an incoming record beats the stored one
//! - **Applicator**: upserts winning records
//! - **Snapshot**: reads back the full record set
//! - **Engine**: runs a batch through all of the above in one transaction
//!
//! ## Sync Process
//!
//! 1. **Normalize**: every raw record becomes a canonical record
//! 2. **Validate**: a record missing `book_id` or `word` rejects the batch
//! 3. **Reconcile**: each record is compared against the store, in input order
//! 4. **Apply**: accepted records replace the stored ones wholesale
//! 5. **Snapshot**: the full set is read back and the transaction commits
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lexisync_storage::Store;
//! use lexisync_sync::{SyncConfig, SyncEngine, SyncRequest};
//!
//! let store = Arc::new(Store::open_in_memory().unwrap());
//! let engine = SyncEngine::new(store, SyncConfig::default());
//!
//! let request: SyncRequest = serde_json::from_str(
//!     r#"{"vocabulary": [{"id": "v1", "bookId": "b1", "word": "猫",
//!                         "updatedAt": "2024-01-01T00:00:00Z"}]}"#,
//! ).unwrap();
//! let outcome = engine.sync(request).unwrap();
//! assert_eq!(outcome.snapshot.vocabulary.len(), 1);
//! ```

pub mod applicator;
mod engine;
mod error;
pub mod normalizer;
pub mod reconciler;
pub mod snapshot;

pub use applicator::apply_record;
pub use engine::{SyncConfig, SyncEngine, SyncOutcome, SyncRequest, SyncStats};
pub use error::{SyncError, SyncResult};
pub use normalizer::{
    normalize, normalize_at, CreatedAtSource, NormalizedRecord, PreparedRecord, RawRecord,
    FIELD_ALIASES,
};
pub use reconciler::{reconcile, Decision};
pub use snapshot::Snapshot;
