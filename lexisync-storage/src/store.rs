//! The shared store handle and its transaction scope.

use lexisync_types::{ProgressRecord, RecordId, SyncTimestamp, VocabularyPatch, VocabularyRecord};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::{progress, schema, vocabulary};

/// How long a writer waits on another process's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent store for vocabulary and reading progress, backed by SQLite.
///
/// One connection is shared process-wide behind a mutex, so at most one
/// transaction is open at a time.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Opened store at {} (journal_mode={})", path.display(), mode);
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Runs `f` inside one write transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`. On any error, or if
    /// `f` panics, the transaction is dropped and everything it wrote is
    /// rolled back.
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }

    /// Runs a read against the shared connection.
    pub fn read<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    // ── Vocabulary ───────────────────────────────────────────────

    /// Lists all vocabulary, most recently updated first.
    pub fn list_vocabulary(&self) -> StorageResult<Vec<VocabularyRecord>> {
        self.read(vocabulary::list)
    }

    /// Loads one vocabulary record.
    pub fn get_vocabulary(&self, id: &RecordId) -> StorageResult<Option<VocabularyRecord>> {
        self.read(|conn| vocabulary::get(conn, id))
    }

    /// Stores a newly created record.
    pub fn create_vocabulary(&self, record: &VocabularyRecord) -> StorageResult<()> {
        self.with_transaction(|tx| vocabulary::insert(tx, record))
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// This path is not arbitrated: the patch always lands.
    pub fn update_vocabulary(
        &self,
        id: &RecordId,
        patch: VocabularyPatch,
        now: SyncTimestamp,
    ) -> StorageResult<VocabularyRecord> {
        self.with_transaction(|tx| {
            let mut record = vocabulary::get(tx, id)?
                .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
            patch.apply_to(&mut record, now);
            vocabulary::update(tx, &record)?;
            Ok(record)
        })
    }

    /// Deletes a record. Deleting a missing id is not an error.
    pub fn delete_vocabulary(&self, id: &RecordId) -> StorageResult<bool> {
        self.with_transaction(|tx| vocabulary::delete(tx, id))
    }

    // ── Progress ─────────────────────────────────────────────────

    /// Loads reading progress for a book.
    pub fn get_progress(&self, book_id: &str) -> StorageResult<Option<ProgressRecord>> {
        self.read(|conn| progress::get(conn, book_id))
    }

    /// Overwrites reading progress for a book.
    pub fn put_progress(&self, record: &ProgressRecord) -> StorageResult<()> {
        self.with_transaction(|tx| progress::put(tx, record))
    }
}
