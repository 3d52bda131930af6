//! Record applicator - reconciles one record against the store and writes it
//! if it wins.

use lexisync_storage::{vocabulary, Connection};
use tracing::{debug, warn};

use crate::error::SyncResult;
use crate::normalizer::{CreatedAtSource, PreparedRecord};
use crate::reconciler::{reconcile, Decision};

/// Applies a single prepared record against the current store state.
///
/// The stored `updated_at` is read through `conn`, so inside a transaction
/// this sees earlier writes of the same batch. Accepted records replace the
/// stored row wholesale, except that a derived `created_at` never replaces a
/// stored one. Rejected records leave the row untouched.
pub fn apply_record(conn: &Connection, prepared: &PreparedRecord) -> SyncResult<Decision> {
    let record = &prepared.record;
    if record.updated_timestamp().is_earliest() {
        warn!(
            "Record {} has unparseable updated_at {:?}; it only wins as a first write",
            record.id, record.updated_at
        );
    }

    let stored = vocabulary::updated_at(conn, &record.id)?;
    let decision = reconcile(record, stored.as_deref());

    match decision {
        Decision::Create | Decision::Supersede => {
            match prepared.created_at_source {
                CreatedAtSource::Client => vocabulary::upsert(conn, record)?,
                CreatedAtSource::Derived => vocabulary::upsert_keeping_created_at(conn, record)?,
            }
            debug!(
                "{:?} {} (updated_at={}, stored={:?})",
                decision, record.id, record.updated_at, stored
            );
        }
        Decision::KeepStored => {
            debug!(
                "Kept stored {} (incoming={}, stored={:?})",
                record.id, record.updated_at, stored
            );
        }
    }

    Ok(decision)
}
