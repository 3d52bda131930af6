//! Queries against the `vocabulary` table.
//!
//! Every function takes a plain `&Connection` so it can run either on the
//! shared connection or inside a [`rusqlite::Transaction`], which derefs to one.

use lexisync_types::{RecordId, VocabularyRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::cmp::Reverse;

use crate::error::{StorageError, StorageResult};

const SELECT_COLUMNS: &str = "SELECT id, book_id, word, status, context_json, analysis_json, \
     display_word, source_chapter_id, created_at, updated_at FROM vocabulary";

/// A row as SQLite returns it, before the JSON columns are decoded.
struct VocabularyRow {
    id: String,
    book_id: String,
    word: String,
    status: String,
    context_json: Option<String>,
    analysis_json: Option<String>,
    display_word: Option<String>,
    source_chapter_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl VocabularyRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            book_id: row.get(1)?,
            word: row.get(2)?,
            status: row.get(3)?,
            context_json: row.get(4)?,
            analysis_json: row.get(5)?,
            display_word: row.get(6)?,
            source_chapter_id: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_record(self) -> StorageResult<VocabularyRecord> {
        let id = RecordId::parse(&self.id)
            .map_err(|e| StorageError::InvalidData(format!("vocabulary row: {e}")))?;
        Ok(VocabularyRecord {
            id,
            book_id: self.book_id,
            word: self.word,
            status: self.status,
            context: decode_json(self.context_json)?,
            analysis: decode_json(self.analysis_json)?,
            display_word: self.display_word,
            source_chapter_id: self.source_chapter_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode_json(column: Option<String>) -> StorageResult<Option<Value>> {
    match column {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

fn encode_json(value: Option<&Value>) -> StorageResult<Option<String>> {
    match value {
        Some(Value::Null) | None => Ok(None),
        Some(v) => Ok(Some(serde_json::to_string(v)?)),
    }
}

/// Loads one record by id.
pub fn get(conn: &Connection, id: &RecordId) -> StorageResult<Option<VocabularyRecord>> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id.as_str()],
            VocabularyRow::from_row,
        )
        .optional()?;
    row.map(VocabularyRow::into_record).transpose()
}

/// Loads only the stored `updated_at` for an id, if the record exists.
pub fn updated_at(conn: &Connection, id: &RecordId) -> StorageResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT updated_at FROM vocabulary WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Inserts a record, or replaces every column of the existing row with the same id.
///
/// A single `INSERT ... ON CONFLICT` statement, so two writers can never
/// create duplicate ids. Re-applying the same record leaves the row unchanged.
pub fn upsert(conn: &Connection, record: &VocabularyRecord) -> StorageResult<()> {
    write_upsert(conn, record, "excluded.created_at")
}

/// Like [`upsert`], but an existing row keeps its `created_at`.
pub fn upsert_keeping_created_at(conn: &Connection, record: &VocabularyRecord) -> StorageResult<()> {
    write_upsert(conn, record, "vocabulary.created_at")
}

fn write_upsert(conn: &Connection, record: &VocabularyRecord, created_at: &str) -> StorageResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO vocabulary (
                id, book_id, word, status, context_json, analysis_json,
                display_word, source_chapter_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                book_id = excluded.book_id,
                word = excluded.word,
                status = excluded.status,
                context_json = excluded.context_json,
                analysis_json = excluded.analysis_json,
                display_word = excluded.display_word,
                source_chapter_id = excluded.source_chapter_id,
                created_at = {created_at},
                updated_at = excluded.updated_at"
        ),
        params![
            record.id.as_str(),
            record.book_id,
            record.word,
            record.status,
            encode_json(record.context.as_ref())?,
            encode_json(record.analysis.as_ref())?,
            record.display_word,
            record.source_chapter_id,
            record.created_at,
            record.updated_at,
        ],
    )?;
    Ok(())
}

/// Inserts a new record. Fails if the id already exists.
pub fn insert(conn: &Connection, record: &VocabularyRecord) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO vocabulary (
            id, book_id, word, status, context_json, analysis_json,
            display_word, source_chapter_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id.as_str(),
            record.book_id,
            record.word,
            record.status,
            encode_json(record.context.as_ref())?,
            encode_json(record.analysis.as_ref())?,
            record.display_word,
            record.source_chapter_id,
            record.created_at,
            record.updated_at,
        ],
    )?;
    Ok(())
}

/// Rewrites the mutable columns of an existing record.
///
/// `book_id`, `word` and `created_at` are left alone. Returns false if no row
/// has this id.
pub fn update(conn: &Connection, record: &VocabularyRecord) -> StorageResult<bool> {
    let changed = conn.execute(
        "UPDATE vocabulary
         SET status = ?1, context_json = ?2, analysis_json = ?3,
             display_word = ?4, source_chapter_id = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            record.status,
            encode_json(record.context.as_ref())?,
            encode_json(record.analysis.as_ref())?,
            record.display_word,
            record.source_chapter_id,
            record.updated_at,
            record.id.as_str(),
        ],
    )?;
    Ok(changed > 0)
}

/// Deletes a record. Returns true if a row was removed.
pub fn delete(conn: &Connection, id: &RecordId) -> StorageResult<bool> {
    let removed = conn.execute("DELETE FROM vocabulary WHERE id = ?1", params![id.as_str()])?;
    Ok(removed > 0)
}

/// Loads every record, most recently updated first.
///
/// Timestamps are compared as instants rather than strings, so mixed offsets
/// and precisions order correctly. Equal instants fall back to id order.
pub fn list(conn: &Connection) -> StorageResult<Vec<VocabularyRecord>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
    let rows = stmt
        .query_map([], VocabularyRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = rows
        .into_iter()
        .map(VocabularyRow::into_record)
        .collect::<StorageResult<Vec<_>>>()?;
    records.sort_by_cached_key(|r| (Reverse(r.updated_timestamp()), r.id.clone()));
    Ok(records)
}
