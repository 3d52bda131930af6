//! Reading progress.
//!
//! One row per book. Writes always overwrite; there is no conflict policy.

use serde::{Deserialize, Serialize};

use crate::{non_empty, SyncTimestamp};

/// Last-read position within a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(alias = "book_id")]
    pub book_id: String,
    #[serde(default, alias = "chapter_id")]
    pub chapter_id: Option<String>,
    #[serde(default, alias = "page_number")]
    pub page_number: i64,
    #[serde(default, alias = "scroll_position")]
    pub scroll_position: i64,
    /// Character offset of the first visible character in the chapter.
    #[serde(default, alias = "char_offset")]
    pub char_offset: i64,
    /// Hash of the chapter text the offset was measured against.
    #[serde(default, alias = "chapter_text_hash")]
    pub chapter_text_hash: Option<String>,
    #[serde(alias = "updated_at")]
    pub updated_at: String,
}

/// Body of a progress write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(default, alias = "chapter_id")]
    pub chapter_id: Option<String>,
    #[serde(default, alias = "page_number")]
    pub page_number: i64,
    #[serde(default, alias = "scroll_position")]
    pub scroll_position: i64,
    #[serde(default, alias = "char_offset")]
    pub char_offset: i64,
    #[serde(default, alias = "chapter_text_hash")]
    pub chapter_text_hash: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl ProgressUpdate {
    /// Builds the row to store for `book_id`. `updated_at` defaults to `now`.
    #[must_use]
    pub fn into_record(self, book_id: impl Into<String>, now: SyncTimestamp) -> ProgressRecord {
        ProgressRecord {
            book_id: book_id.into(),
            chapter_id: self.chapter_id,
            page_number: self.page_number,
            scroll_position: self.scroll_position,
            char_offset: self.char_offset,
            chapter_text_hash: self.chapter_text_hash,
            updated_at: non_empty(self.updated_at).unwrap_or_else(|| now.to_iso8601()),
        }
    }
}
