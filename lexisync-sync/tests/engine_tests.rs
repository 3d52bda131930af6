use std::sync::Arc;

use lexisync_storage::Store;
use lexisync_sync::{SyncConfig, SyncEngine, SyncError, SyncRequest};
use lexisync_types::{RecordId, VocabularyRecord};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn make_engine() -> SyncEngine {
    let store = Arc::new(Store::open_in_memory().unwrap());
    SyncEngine::new(store, SyncConfig::default())
}

fn request(vocabulary: Value) -> SyncRequest {
    serde_json::from_value(json!({ "vocabulary": vocabulary })).unwrap()
}

fn cat(status: &str, updated_at: &str) -> Value {
    json!({
        "id": "v1",
        "bookId": "b1",
        "word": "猫",
        "status": status,
        "updatedAt": updated_at
    })
}

fn find<'a>(records: &'a [VocabularyRecord], id: &str) -> &'a VocabularyRecord {
    records
        .iter()
        .find(|r| r.id.as_str() == id)
        .unwrap_or_else(|| panic!("record {id} missing from snapshot"))
}

// ── Last-write-wins ──────────────────────────────────────────────

#[test]
fn older_resubmission_is_ignored_newer_one_wins() {
    let engine = make_engine();

    let first = engine
        .sync(request(json!([cat("learning", "2024-01-01T00:00:00Z")])))
        .unwrap();
    assert_eq!(first.snapshot.vocabulary.len(), 1);
    assert_eq!(first.stats.created, 1);
    let v1 = find(&first.snapshot.vocabulary, "v1");
    assert_eq!(v1.created_at, "2024-01-01T00:00:00Z");
    assert_eq!(v1.updated_at, "2024-01-01T00:00:00Z");

    let older = engine
        .sync(request(json!([cat("known", "2023-01-01T00:00:00Z")])))
        .unwrap();
    let v1 = find(&older.snapshot.vocabulary, "v1");
    assert_eq!(v1.status, "learning");
    assert_eq!(v1.created_at, "2024-01-01T00:00:00Z");
    assert_eq!(v1.updated_at, "2024-01-01T00:00:00Z");
    assert_eq!(older.stats.kept, 1);

    let newer = engine
        .sync(request(json!([cat("known", "2025-01-01T00:00:00Z")])))
        .unwrap();
    let v1 = find(&newer.snapshot.vocabulary, "v1");
    assert_eq!(v1.status, "known");
    assert_eq!(v1.created_at, "2024-01-01T00:00:00Z");
    assert_eq!(v1.updated_at, "2025-01-01T00:00:00Z");
    assert_eq!(newer.stats.superseded, 1);
}

#[test]
fn stored_created_at_survives_supersede_without_one() {
    let engine = make_engine();
    engine
        .sync(request(json!([{
            "id": "v1", "bookId": "b1", "word": "猫",
            "createdAt": "2023-06-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        }])))
        .unwrap();

    let outcome = engine
        .sync(request(json!([cat("known", "2025-01-01T00:00:00Z")])))
        .unwrap();

    let v1 = find(&outcome.snapshot.vocabulary, "v1");
    assert_eq!(v1.status, "known");
    assert_eq!(v1.created_at, "2023-06-01T00:00:00Z");
}

#[test]
fn supplied_created_at_is_part_of_the_overwrite() {
    let engine = make_engine();
    engine
        .sync(request(json!([cat("learning", "2024-01-01T00:00:00Z")])))
        .unwrap();

    let outcome = engine
        .sync(request(json!([{
            "id": "v1", "bookId": "b1", "word": "猫",
            "createdAt": "2022-02-02T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z"
        }])))
        .unwrap();

    assert_eq!(outcome.snapshot.vocabulary[0].created_at, "2022-02-02T00:00:00Z");
}

#[test]
fn same_input_gives_same_state_on_separate_stores() {
    let batch = json!([
        cat("learning", "2024-01-01T00:00:00Z"),
        {"id": "v2", "bookId": "b1", "word": "犬", "updatedAt": "2024-02-01T00:00:00Z"}
    ]);

    let a = make_engine().sync(request(batch.clone())).unwrap();
    let b = make_engine().sync(request(batch)).unwrap();

    assert_eq!(a.snapshot.vocabulary, b.snapshot.vocabulary);
}

#[test]
fn resubmitting_the_same_batch_is_idempotent() {
    let engine = make_engine();
    let batch = json!([
        cat("learning", "2024-01-01T00:00:00Z"),
        {"id": "v2", "bookId": "b1", "word": "犬", "updatedAt": "2024-02-01T00:00:00Z"}
    ]);

    let first = engine.sync(request(batch.clone())).unwrap();
    let second = engine.sync(request(batch)).unwrap();

    assert_eq!(first.snapshot.vocabulary, second.snapshot.vocabulary);
    assert_eq!(second.stats.applied(), 0);
    assert_eq!(second.stats.kept, 2);
}

#[test]
fn duplicate_ids_in_one_batch_resolve_by_timestamp() {
    let engine = make_engine();
    let outcome = engine
        .sync(request(json!([
            cat("learning", "2024-01-01T00:00:00Z"),
            cat("known", "2025-01-01T00:00:00Z"),
            cat("ignored", "2024-06-01T00:00:00Z")
        ])))
        .unwrap();

    assert_eq!(outcome.snapshot.vocabulary.len(), 1);
    assert_eq!(outcome.snapshot.vocabulary[0].status, "known");
    assert_eq!(outcome.stats.created, 1);
    assert_eq!(outcome.stats.superseded, 1);
    assert_eq!(outcome.stats.kept, 1);
}

#[test]
fn equal_timestamps_in_one_batch_keep_the_first() {
    let engine = make_engine();
    let outcome = engine
        .sync(request(json!([
            cat("learning", "2024-01-01T00:00:00Z"),
            cat("known", "2024-01-01T00:00:00Z")
        ])))
        .unwrap();

    assert_eq!(outcome.snapshot.vocabulary[0].status, "learning");
}

// ── Field shapes ─────────────────────────────────────────────────

#[test]
fn snake_case_and_camel_case_batches_are_equivalent() {
    let camel = make_engine();
    let snake = make_engine();

    let a = camel
        .sync(request(json!([{
            "id": "v1", "bookId": "b1", "word": "猫", "displayWord": "ねこ",
            "sourceChapterId": "c3", "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }])))
        .unwrap();
    let b = snake
        .sync(request(json!([{
            "id": "v1", "book_id": "b1", "word": "猫", "display_word": "ねこ",
            "source_chapter_id": "c3", "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }])))
        .unwrap();

    assert_eq!(a.snapshot.vocabulary, b.snapshot.vocabulary);
}

#[test]
fn structured_blobs_round_trip() {
    let engine = make_engine();
    let context = json!({"sentence": "猫が好き", "offsets": [0, 1], "nested": {"k": null}});
    let analysis = json!({"reading": "ねこ", "pos": ["noun"], "jlpt": 5});

    let outcome = engine
        .sync(request(json!([{
            "id": "v1", "bookId": "b1", "word": "猫",
            "context": context, "analysis": analysis,
            "updatedAt": "2024-01-01T00:00:00Z"
        }])))
        .unwrap();

    let v1 = find(&outcome.snapshot.vocabulary, "v1");
    assert_eq!(v1.context.as_ref(), Some(&context));
    assert_eq!(v1.analysis.as_ref(), Some(&analysis));
}

#[test]
fn defaults_are_filled_for_sparse_records() {
    let engine = make_engine();
    let outcome = engine
        .sync(request(json!([{"bookId": "b1", "word": "猫"}])))
        .unwrap();

    let record = &outcome.snapshot.vocabulary[0];
    assert!(!record.id.as_str().is_empty());
    assert_eq!(record.status, "learning");
    assert!(!record.created_at.is_empty());
    assert_eq!(record.updated_at, record.created_at);
}

// ── Snapshot ─────────────────────────────────────────────────────

#[test]
fn snapshot_includes_records_not_in_the_batch() {
    let engine = make_engine();
    engine
        .sync(request(json!([
            {"id": "a", "bookId": "b1", "word": "一", "updatedAt": "2024-01-01T00:00:00Z"},
            {"id": "b", "bookId": "b2", "word": "二", "updatedAt": "2024-01-02T00:00:00Z"}
        ])))
        .unwrap();

    let outcome = engine
        .sync(request(json!([
            {"id": "c", "bookId": "b1", "word": "三", "updatedAt": "2024-01-03T00:00:00Z"}
        ])))
        .unwrap();

    let ids: Vec<&str> = outcome
        .snapshot
        .vocabulary
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}

#[test]
fn empty_batch_returns_current_state() {
    let engine = make_engine();
    engine
        .sync(request(json!([cat("learning", "2024-01-01T00:00:00Z")])))
        .unwrap();

    let outcome = engine.sync(SyncRequest::default()).unwrap();
    assert_eq!(outcome.stats.received, 0);
    assert_eq!(outcome.snapshot.vocabulary.len(), 1);
    assert!(!outcome.snapshot.synced_at.is_empty());
}

#[test]
fn missing_vocabulary_key_is_an_empty_batch() {
    let request: SyncRequest = serde_json::from_value(json!({})).unwrap();
    assert!(request.vocabulary.is_empty());
}

#[test]
fn snapshot_serializes_with_client_field_names() {
    let engine = make_engine();
    let outcome = engine
        .sync(request(json!([cat("learning", "2024-01-01T00:00:00Z")])))
        .unwrap();

    let body = serde_json::to_value(&outcome.snapshot).unwrap();
    assert!(body.get("syncedAt").is_some());
    assert_eq!(body["vocabulary"][0]["bookId"], "b1");
    assert_eq!(body["vocabulary"][0]["updatedAt"], "2024-01-01T00:00:00Z");
}

// ── Rejection ────────────────────────────────────────────────────

#[test]
fn invalid_record_rejects_the_whole_batch() {
    let engine = make_engine();
    let result = engine.sync(request(json!([
        cat("learning", "2024-01-01T00:00:00Z"),
        {"id": "broken", "bookId": "b1"}
    ])));

    match result {
        Err(SyncError::InvalidRecord { index, id, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(id, "broken");
        }
        other => panic!("expected InvalidRecord, got {other:?}"),
    }

    let stored = engine.store().list_vocabulary().unwrap();
    assert!(stored.is_empty());
}

#[test]
fn failed_batch_leaves_earlier_state_intact() {
    let engine = make_engine();
    engine
        .sync(request(json!([cat("learning", "2024-01-01T00:00:00Z")])))
        .unwrap();

    let result = engine.sync(request(json!([
        cat("known", "2025-01-01T00:00:00Z"),
        {"bookId": "b1", "word": ""}
    ])));
    assert!(result.is_err());

    let v1 = engine
        .store()
        .get_vocabulary(&RecordId::parse("v1").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(v1.status, "learning");
}

#[test]
fn oversized_batch_is_rejected() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let engine = SyncEngine::new(store, SyncConfig { max_batch_size: Some(2) });

    let result = engine.sync(request(json!([
        {"bookId": "b1", "word": "a"},
        {"bookId": "b1", "word": "b"},
        {"bookId": "b1", "word": "c"}
    ])));

    assert!(matches!(
        result,
        Err(SyncError::BatchTooLarge { size: 3, max: 2 })
    ));
    assert!(engine.store().list_vocabulary().unwrap().is_empty());
}

#[test]
fn batch_at_the_limit_is_accepted() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let engine = SyncEngine::new(store, SyncConfig { max_batch_size: Some(2) });

    let outcome = engine
        .sync(request(json!([
            {"bookId": "b1", "word": "a"},
            {"bookId": "b1", "word": "b"}
        ])))
        .unwrap();
    assert_eq!(outcome.stats.created, 2);
}

#[test]
fn batch_size_is_unlimited_by_default() {
    let engine = make_engine();
    let batch: Vec<Value> = (0..12_000)
        .map(|i| json!({"id": format!("w{i}"), "bookId": "b1", "word": format!("w{i}")}))
        .collect();

    let outcome = engine.sync(request(Value::Array(batch))).unwrap();
    assert_eq!(outcome.stats.created, 12_000);
    assert_eq!(outcome.snapshot.vocabulary.len(), 12_000);
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn synced_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab.sqlite3");

    {
        let engine = SyncEngine::new(
            Arc::new(Store::open(&path).unwrap()),
            SyncConfig::default(),
        );
        engine
            .sync(request(json!([cat("known", "2024-01-01T00:00:00Z")])))
            .unwrap();
    }

    let engine = SyncEngine::new(Arc::new(Store::open(&path).unwrap()), SyncConfig::default());
    let outcome = engine.sync(SyncRequest::default()).unwrap();
    assert_eq!(outcome.snapshot.vocabulary[0].status, "known");
}
