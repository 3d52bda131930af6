//! Schema creation and lightweight migrations.

use rusqlite::Connection;
use tracing::info;

use crate::error::{StorageError, StorageResult};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS vocabulary (
        id TEXT PRIMARY KEY,
        book_id TEXT NOT NULL,
        word TEXT NOT NULL,
        status TEXT NOT NULL,
        context_json TEXT,
        analysis_json TEXT,
        display_word TEXT,
        source_chapter_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_vocab_book_id ON vocabulary(book_id);
    CREATE INDEX IF NOT EXISTS idx_vocab_status ON vocabulary(status);
    CREATE INDEX IF NOT EXISTS idx_vocab_updated_at ON vocabulary(updated_at);

    CREATE TABLE IF NOT EXISTS progress (
        book_id TEXT PRIMARY KEY,
        chapter_id TEXT,
        page_number INTEGER NOT NULL,
        scroll_position INTEGER NOT NULL,
        char_offset INTEGER NOT NULL DEFAULT 0,
        chapter_text_hash TEXT,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_progress_updated_at ON progress(updated_at);
";

/// Columns added to `progress` after the first release, with their DDL.
const PROGRESS_MIGRATIONS: &[(&str, &str)] = &[
    (
        "char_offset",
        "ALTER TABLE progress ADD COLUMN char_offset INTEGER NOT NULL DEFAULT 0",
    ),
    (
        "chapter_text_hash",
        "ALTER TABLE progress ADD COLUMN chapter_text_hash TEXT",
    ),
];

/// Creates all tables and indexes, then brings older tables up to date.
pub(crate) fn init_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| StorageError::Migration(format!("failed to init schema: {e}")))?;
    migrate_progress(conn)
}

fn migrate_progress(conn: &Connection) -> StorageResult<()> {
    let columns = table_columns(conn, "progress")?;
    for (column, ddl) in PROGRESS_MIGRATIONS {
        if !columns.iter().any(|c| c == column) {
            info!("Adding progress.{} column", column);
            conn.execute_batch(ddl).map_err(|e| {
                StorageError::Migration(format!("failed to add progress.{column}: {e}"))
            })?;
        }
    }
    Ok(())
}

/// Returns the column names of `table`.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> StorageResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
