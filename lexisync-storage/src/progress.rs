//! Queries against the `progress` table.

use lexisync_types::ProgressRecord;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageResult;

/// Loads the progress row for a book.
pub fn get(conn: &Connection, book_id: &str) -> StorageResult<Option<ProgressRecord>> {
    let record = conn
        .query_row(
            "SELECT book_id, chapter_id, page_number, scroll_position, char_offset,
                    chapter_text_hash, updated_at
             FROM progress WHERE book_id = ?1",
            params![book_id],
            |row| {
                Ok(ProgressRecord {
                    book_id: row.get(0)?,
                    chapter_id: row.get(1)?,
                    page_number: row.get(2)?,
                    scroll_position: row.get(3)?,
                    char_offset: row.get(4)?,
                    chapter_text_hash: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

/// Writes the progress row for a book, overwriting whatever was there.
pub fn put(conn: &Connection, record: &ProgressRecord) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO progress (
            book_id, chapter_id, page_number, scroll_position, char_offset,
            chapter_text_hash, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(book_id) DO UPDATE SET
            chapter_id = excluded.chapter_id,
            page_number = excluded.page_number,
            scroll_position = excluded.scroll_position,
            char_offset = excluded.char_offset,
            chapter_text_hash = excluded.chapter_text_hash,
            updated_at = excluded.updated_at",
        params![
            record.book_id,
            record.chapter_id,
            record.page_number,
            record.scroll_position,
            record.char_offset,
            record.chapter_text_hash,
            record.updated_at,
        ],
    )?;
    Ok(())
}
