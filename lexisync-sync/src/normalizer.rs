//! Field normalizer - turns loosely-shaped client records into canonical ones.
//!
//! Clients send records either with camelCase names (the shape they keep
//! locally) or with the snake_case storage names. Both are resolved here,
//! once, and nothing past this point sees an untyped map.

use lexisync_types::{RecordId, SyncTimestamp, VocabularyRecord};
use serde_json::{Map, Value};

/// A record exactly as a client sent it.
pub type RawRecord = Map<String, Value>;

/// External (camelCase) name → canonical (snake_case) name.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("bookId", "book_id"),
    ("displayWord", "display_word"),
    ("sourceChapterId", "source_chapter_id"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

/// Where an incoming record's `created_at` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedAtSource {
    /// The client sent it.
    Client,
    /// Filled in from `updated_at` or the current time.
    Derived,
}

/// A validated record ready to be reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub record: VocabularyRecord,
    pub created_at_source: CreatedAtSource,
}

/// An incoming record after alias resolution and defaulting.
///
/// Identity, timestamps and status are always filled in. `book_id` and `word`
/// are passed through as found; [`NormalizedRecord::into_record`] checks them.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub id: RecordId,
    pub book_id: Option<String>,
    pub word: Option<String>,
    pub status: String,
    pub context: Option<Value>,
    pub analysis: Option<Value>,
    pub display_word: Option<String>,
    pub source_chapter_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub created_at_source: CreatedAtSource,
}

impl NormalizedRecord {
    /// Validates the record and keeps track of where `created_at` came from.
    pub fn prepare(self) -> lexisync_types::Result<PreparedRecord> {
        let created_at_source = self.created_at_source;
        Ok(PreparedRecord {
            record: self.into_record()?,
            created_at_source,
        })
    }

    /// Converts into a storable record, failing if a required field is absent.
    pub fn into_record(self) -> lexisync_types::Result<VocabularyRecord> {
        let record = VocabularyRecord {
            id: self.id,
            book_id: self
                .book_id
                .ok_or(lexisync_types::Error::MissingField("book_id"))?,
            word: self.word.ok_or(lexisync_types::Error::MissingField("word"))?,
            status: self.status,
            context: self.context,
            analysis: self.analysis,
            display_word: self.display_word,
            source_chapter_id: self.source_chapter_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        record.validate()?;
        Ok(record)
    }
}

/// Normalizes a record using the current time for missing timestamps.
#[must_use]
pub fn normalize(raw: &RawRecord) -> NormalizedRecord {
    normalize_at(raw, SyncTimestamp::now())
}

/// Normalizes a record, using `now` when both timestamps are missing.
///
/// - A canonical key wins over its external alias whenever it is present.
/// - A missing or empty `id` gets a freshly minted one.
/// - A missing or empty `created_at` becomes `updated_at`, or `now` if that
///   is missing too.
/// - A missing or empty `updated_at` becomes `created_at`.
/// - A missing or empty `status` becomes the default status.
#[must_use]
pub fn normalize_at(raw: &RawRecord, now: SyncTimestamp) -> NormalizedRecord {
    let id = text(field(raw, "id"))
        .and_then(|s| RecordId::parse(&s).ok())
        .unwrap_or_default();
    let supplied_created = non_empty(text(field(raw, "created_at")));
    let supplied_updated = non_empty(text(field(raw, "updated_at")));
    let created_at_source = if supplied_created.is_some() {
        CreatedAtSource::Client
    } else {
        CreatedAtSource::Derived
    };
    let created_at = supplied_created
        .or_else(|| supplied_updated.clone())
        .unwrap_or_else(|| now.to_iso8601());
    let updated_at = supplied_updated.unwrap_or_else(|| created_at.clone());

    NormalizedRecord {
        id,
        book_id: text(field(raw, "book_id")),
        word: text(field(raw, "word")),
        status: VocabularyRecord::status_or_default(text(field(raw, "status"))),
        context: blob(field(raw, "context")),
        analysis: blob(field(raw, "analysis")),
        display_word: text(field(raw, "display_word")),
        source_chapter_id: text(field(raw, "source_chapter_id")),
        created_at,
        updated_at,
        created_at_source,
    }
}

/// Looks up a canonical field, falling back to its external alias.
fn field<'a>(raw: &'a RawRecord, canonical: &str) -> Option<&'a Value> {
    raw.get(canonical).or_else(|| {
        FIELD_ALIASES
            .iter()
            .find(|(_, c)| *c == canonical)
            .and_then(|(external, _)| raw.get(*external))
    })
}

/// Reads a scalar as text. Objects, arrays and null read as absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn blob(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
