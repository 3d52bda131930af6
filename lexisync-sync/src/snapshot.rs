//! Snapshot responder.
//!
//! Clients replace their whole local cache with the snapshot, so it always
//! carries every stored record, not just the ones a batch touched.

use lexisync_storage::{vocabulary, Connection};
use lexisync_types::{SyncTimestamp, VocabularyRecord};
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// The full record set after a sync, most recently updated first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub vocabulary: Vec<VocabularyRecord>,
    pub synced_at: String,
}

impl Snapshot {
    /// Reads every record through `conn` and stamps the snapshot with the current time.
    pub fn capture(conn: &Connection) -> SyncResult<Self> {
        let vocabulary = vocabulary::list(conn)?;
        Ok(Self {
            vocabulary,
            synced_at: SyncTimestamp::now().to_iso8601(),
        })
    }
}
