//! Record reconciler - last-write-wins arbitration between an incoming record
//! and the stored one with the same id.
//!
//! Acceptance replaces the stored record wholesale; fields are never merged.

use lexisync_types::{SyncTimestamp, VocabularyRecord};

/// Outcome of reconciling one incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing stored under this id; the record is written as is.
    Create,
    /// The incoming record is strictly newer and replaces the stored one.
    Supersede,
    /// The stored record is as new or newer; nothing is written.
    KeepStored,
}

impl Decision {
    /// Returns true if the incoming record should be written.
    #[must_use]
    pub fn is_accept(self) -> bool {
        matches!(self, Self::Create | Self::Supersede)
    }
}

/// Decides whether `incoming` should replace the record stored under its id.
///
/// `stored_updated_at` is the stored record's `updated_at`, or `None` if the
/// id is unknown. A first write is always accepted. Otherwise the incoming
/// record must be strictly later; ties keep the stored record. Timestamps
/// that fail to parse count as the earliest instant, so they lose every
/// comparison against a parseable one and never raise.
#[must_use]
pub fn reconcile(incoming: &VocabularyRecord, stored_updated_at: Option<&str>) -> Decision {
    let Some(stored) = stored_updated_at else {
        return Decision::Create;
    };

    let incoming_ts = incoming.updated_timestamp();
    let stored_ts = SyncTimestamp::parse_lenient(stored);

    if incoming_ts.is_after(&stored_ts) {
        Decision::Supersede
    } else {
        Decision::KeepStored
    }
}
