//! Route handlers. Store access is blocking and runs on the blocking pool.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use lexisync_storage::Store;
use lexisync_sync::{Snapshot, SyncRequest};
use lexisync_types::{
    NewVocabulary, ProgressUpdate, RecordId, SyncTimestamp, VocabularyPatch, VocabularyRecord,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Runs blocking store work off the async runtime.
async fn blocking<T, F>(store: Arc<Store>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> ApiResult<T> + Send + 'static,
{
    task::spawn_blocking(move || f(&store)).await?
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// ── Vocabulary ───────────────────────────────────────────────────

pub async fn list_vocabulary(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VocabularyRecord>>> {
    let records = blocking(state.store, |store| Ok(store.list_vocabulary()?)).await?;
    Ok(Json(records))
}

pub async fn create_vocabulary(
    State(state): State<AppState>,
    body: Result<Json<NewVocabulary>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<VocabularyRecord>)> {
    let Json(new) = body?;
    let record = new.into_record(RecordId::new(), SyncTimestamp::now())?;
    let record = blocking(state.store, move |store| {
        store.create_vocabulary(&record)?;
        Ok(record)
    })
    .await?;
    debug!("Created {} ({})", record.id, record.word);
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<VocabularyPatch>, JsonRejection>,
) -> ApiResult<Json<VocabularyRecord>> {
    let Json(patch) = body?;
    let id = RecordId::parse(&id)?;
    let record = blocking(state.store, move |store| {
        Ok(store.update_vocabulary(&id, patch, SyncTimestamp::now())?)
    })
    .await?;
    Ok(Json(record))
}

pub async fn delete_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = RecordId::parse(&id)?;
    let removed = blocking(state.store, move |store| Ok(store.delete_vocabulary(&id)?)).await?;
    debug!("Delete removed a row: {}", removed);
    Ok(StatusCode::NO_CONTENT)
}

// ── Progress ─────────────────────────────────────────────────────

pub async fn get_progress(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let progress = blocking(state.store, move |store| Ok(store.get_progress(&book_id)?)).await?;
    let body = match progress {
        Some(record) => serde_json::to_value(record).map_err(lexisync_storage::StorageError::from)?,
        None => json!({}),
    };
    Ok(Json(body))
}

pub async fn put_progress(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    body: Result<Json<ProgressUpdate>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(update) = body?;
    let record = update.into_record(book_id, SyncTimestamp::now());
    let updated_at = blocking(state.store, move |store| {
        store.put_progress(&record)?;
        Ok(record.updated_at)
    })
    .await?;
    Ok(Json(json!({ "ok": true, "updatedAt": updated_at })))
}

// ── Sync ─────────────────────────────────────────────────────────

pub async fn sync(
    State(state): State<AppState>,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResult<Json<Snapshot>> {
    let Json(request) = body?;
    let engine = state.engine;
    let outcome = task::spawn_blocking(move || engine.sync(request)).await??;
    info!(
        "Sync call applied {} of {} records",
        outcome.stats.applied(),
        outcome.stats.received
    );
    Ok(Json(outcome.snapshot))
}
