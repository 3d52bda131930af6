//! SQLite storage layer for lexisync.
//!
//! Provides persistent storage for vocabulary records and reading progress
//! using rusqlite.
//!
//! # Architecture
//!
//! - [`Store`] owns the single shared connection and hands out transaction
//!   scopes via [`Store::with_transaction`]
//! - [`vocabulary`] and [`progress`] hold the per-table queries; they take a
//!   `&Connection` so callers can compose them inside one transaction
//! - Structured blobs (`context`, `analysis`) are stored as JSON text
//! - The schema is created, and older databases migrated, on open

mod error;
mod schema;
mod store;

pub mod progress;
pub mod vocabulary;

pub use error::{StorageError, StorageResult};
pub use rusqlite::{Connection, Transaction};
pub use store::Store;
