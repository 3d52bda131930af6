//! Vocabulary records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{non_empty, Error, RecordId, Result, SyncTimestamp};

/// Learning status given to records that arrive without one.
pub const DEFAULT_STATUS: &str = "learning";

/// A looked-up word with its analysis and learning state.
///
/// This is the canonical shape: every record that reaches the store, and every
/// record returned to clients, has exactly these fields. Timestamps are kept
/// as the strings the writer supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyRecord {
    pub id: RecordId,
    #[serde(alias = "book_id")]
    pub book_id: String,
    pub word: String,
    pub status: String,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default, alias = "display_word")]
    pub display_word: Option<String>,
    #[serde(default, alias = "source_chapter_id")]
    pub source_chapter_id: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: String,
    #[serde(alias = "updated_at")]
    pub updated_at: String,
}

impl VocabularyRecord {
    /// Returns the status to store, substituting [`DEFAULT_STATUS`] when unset.
    #[must_use]
    pub fn status_or_default(status: Option<String>) -> String {
        non_empty(status).unwrap_or_else(|| DEFAULT_STATUS.to_string())
    }

    /// The timestamp that arbitrates conflicts for this record.
    #[must_use]
    pub fn updated_timestamp(&self) -> SyncTimestamp {
        SyncTimestamp::parse_lenient(&self.updated_at)
    }

    /// Checks the fields the store requires to be present.
    pub fn validate(&self) -> Result<()> {
        if self.book_id.is_empty() {
            return Err(Error::MissingField("book_id"));
        }
        if self.word.is_empty() {
            return Err(Error::MissingField("word"));
        }
        if self.created_at.is_empty() {
            return Err(Error::MissingField("created_at"));
        }
        if self.updated_at.is_empty() {
            return Err(Error::MissingField("updated_at"));
        }
        Ok(())
    }
}

/// Payload for creating a single record outside of a sync batch.
///
/// The server always mints the id; any id the client sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVocabulary {
    #[serde(alias = "book_id")]
    pub book_id: String,
    pub word: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default, alias = "display_word")]
    pub display_word: Option<String>,
    #[serde(default, alias = "source_chapter_id")]
    pub source_chapter_id: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl NewVocabulary {
    /// Builds the stored record.
    ///
    /// `created_at` defaults to `updated_at`, then to `now`. `updated_at`
    /// defaults to `created_at`.
    pub fn into_record(self, id: RecordId, now: SyncTimestamp) -> Result<VocabularyRecord> {
        let updated_at = non_empty(self.updated_at);
        let created_at = non_empty(self.created_at)
            .or_else(|| updated_at.clone())
            .unwrap_or_else(|| now.to_iso8601());
        let updated_at = updated_at.unwrap_or_else(|| created_at.clone());

        let record = VocabularyRecord {
            id,
            book_id: self.book_id,
            word: self.word,
            status: VocabularyRecord::status_or_default(self.status),
            context: self.context.filter(|v| !v.is_null()),
            analysis: self.analysis.filter(|v| !v.is_null()),
            display_word: self.display_word,
            source_chapter_id: self.source_chapter_id,
            created_at,
            updated_at,
        };
        record.validate()?;
        Ok(record)
    }
}

/// Partial update of a single record.
///
/// Fields left as `None` keep their stored value. `book_id`, `word` and
/// `created_at` cannot be changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyPatch {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default, alias = "display_word")]
    pub display_word: Option<String>,
    #[serde(default, alias = "source_chapter_id")]
    pub source_chapter_id: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl VocabularyPatch {
    /// Applies the patch in place. `updated_at` becomes the supplied value or `now`.
    pub fn apply_to(self, record: &mut VocabularyRecord, now: SyncTimestamp) {
        if let Some(status) = non_empty(self.status) {
            record.status = status;
        }
        if let Some(context) = self.context.filter(|v| !v.is_null()) {
            record.context = Some(context);
        }
        if let Some(analysis) = self.analysis.filter(|v| !v.is_null()) {
            record.analysis = Some(analysis);
        }
        if let Some(display_word) = self.display_word {
            record.display_word = Some(display_word);
        }
        if let Some(source_chapter_id) = self.source_chapter_id {
            record.source_chapter_id = Some(source_chapter_id);
        }
        record.updated_at = non_empty(self.updated_at).unwrap_or_else(|| now.to_iso8601());
    }
}
