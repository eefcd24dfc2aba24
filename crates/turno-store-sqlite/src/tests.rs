//! Integration tests for `SqliteStore` against an in-memory database.

use serde_json::json;
use turno_core::store::{Collection, Direction, DocumentQuery, DocumentStore, FilterOp};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_document() {
  let s = store().await;

  let id = s
    .create_document(Collection::Credentials, json!({ "email": "a@b.bo" }))
    .await
    .unwrap();

  let doc = s.get_document(Collection::Credentials, id).await.unwrap().unwrap();
  assert_eq!(doc.id, id);
  assert_eq!(doc.data["email"], "a@b.bo");
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let result = s.get_document(Collection::Shifts, Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn collections_are_separate() {
  let s = store().await;
  let id = Uuid::new_v4();
  s.put_document(Collection::Profiles, id, json!({ "role": "admin" })).await.unwrap();

  assert!(s.get_document(Collection::Shifts, id).await.unwrap().is_none());
  assert!(s.get_document(Collection::Profiles, id).await.unwrap().is_some());
}

#[tokio::test]
async fn put_replaces_the_whole_document() {
  let s = store().await;
  let id = Uuid::new_v4();
  s.put_document(Collection::Profiles, id, json!({ "a": 1, "b": 2 })).await.unwrap();
  s.put_document(Collection::Profiles, id, json!({ "a": 3 })).await.unwrap();

  let doc = s.get_document(Collection::Profiles, id).await.unwrap().unwrap();
  assert_eq!(doc.data, json!({ "a": 3 }));
}

// ─── Update / append ─────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_top_level_fields() {
  let s = store().await;
  let id = Uuid::new_v4();
  s.put_document(
    Collection::Shifts,
    id,
    json!({ "state": "abierto", "opening": { "memorandum": "045/2025" } }),
  )
  .await
  .unwrap();

  s.update_document(Collection::Shifts, id, json!({ "state": "cerrado", "closing": { "report": "INFORME" } }))
    .await
    .unwrap();

  let doc = s.get_document(Collection::Shifts, id).await.unwrap().unwrap();
  assert_eq!(doc.data["state"], "cerrado");
  assert_eq!(doc.data["opening"]["memorandum"], "045/2025");
  assert_eq!(doc.data["closing"]["report"], "INFORME");
}

#[tokio::test]
async fn update_missing_document_fails() {
  let s = store().await;
  let err = s
    .update_document(Collection::Shifts, Uuid::new_v4(), json!({ "state": "cerrado" }))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { collection: Collection::Shifts, .. }));
}

#[tokio::test]
async fn append_preserves_order() {
  let s = store().await;
  let id = Uuid::new_v4();
  s.put_document(Collection::Shifts, id, json!({ "facility_checks": [] })).await.unwrap();

  for unit in ["FELCC CENTRAL", "POFOMA", "DELTA"] {
    s.append_to_array_field(Collection::Shifts, id, "facility_checks", json!({ "facility": unit }))
      .await
      .unwrap();
  }

  let doc = s.get_document(Collection::Shifts, id).await.unwrap().unwrap();
  let names: Vec<_> = doc.data["facility_checks"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["facility"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["FELCC CENTRAL", "POFOMA", "DELTA"]);
}

#[tokio::test]
async fn append_to_missing_document_fails() {
  let s = store().await;
  let err = s
    .append_to_array_field(Collection::Shifts, Uuid::new_v4(), "facility_checks", json!(1))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn failed_append_leaves_document_untouched() {
  let s = store().await;
  let id = Uuid::new_v4();
  s.put_document(Collection::Shifts, id, json!({ "state": "abierto" })).await.unwrap();

  let err = s
    .append_to_array_field(Collection::Shifts, id, "state", json!(1))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotAnArray { .. }));

  let doc = s.get_document(Collection::Shifts, id).await.unwrap().unwrap();
  assert_eq!(doc.data, json!({ "state": "abierto" }));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_reports_existence() {
  let s = store().await;
  let id = s.create_document(Collection::Shifts, json!({})).await.unwrap();

  assert!(s.delete_document(Collection::Shifts, id).await.unwrap());
  assert!(!s.delete_document(Collection::Shifts, id).await.unwrap());
  assert!(s.get_document(Collection::Shifts, id).await.unwrap().is_none());
}

// ─── Queries ─────────────────────────────────────────────────────────────────

async fn seed_shifts(s: &SqliteStore) -> (Uuid, Uuid) {
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let rows = [
    (alice, "cerrado", "2025-01-01T12:00:00Z"),
    (alice, "abierto", "2025-01-03T12:00:00Z"),
    (bob, "abierto", "2025-01-02T12:00:00Z"),
  ];
  for (owner, state, created) in rows {
    s.create_document(
      Collection::Shifts,
      json!({ "supervisor_id": owner, "state": state, "created_at": created }),
    )
    .await
    .unwrap();
  }
  (alice, bob)
}

#[tokio::test]
async fn query_by_equality() {
  let s = store().await;
  let (alice, _) = seed_shifts(&s).await;

  let q = DocumentQuery::new().eq("supervisor_id", alice.to_string()).eq("state", "abierto");
  let docs = s.query_documents(Collection::Shifts, &q).await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0].data["created_at"], "2025-01-03T12:00:00Z");
}

#[tokio::test]
async fn query_without_filters_keeps_insertion_order() {
  let s = store().await;
  seed_shifts(&s).await;

  let docs = s.query_documents(Collection::Shifts, &DocumentQuery::new()).await.unwrap();
  let created: Vec<_> = docs.iter().map(|d| d.data["created_at"].as_str().unwrap()).collect();
  assert_eq!(created, ["2025-01-01T12:00:00Z", "2025-01-03T12:00:00Z", "2025-01-02T12:00:00Z"]);
}

#[tokio::test]
async fn query_orders_and_limits() {
  let s = store().await;
  seed_shifts(&s).await;

  let q = DocumentQuery::new().order_by("created_at", Direction::Desc).limit(2);
  let docs = s.query_documents(Collection::Shifts, &q).await.unwrap();
  let created: Vec<_> = docs.iter().map(|d| d.data["created_at"].as_str().unwrap()).collect();
  assert_eq!(created, ["2025-01-03T12:00:00Z", "2025-01-02T12:00:00Z"]);
}

#[tokio::test]
async fn query_with_range_filter() {
  let s = store().await;
  seed_shifts(&s).await;

  let q = DocumentQuery::new().filter("created_at", FilterOp::Lt, "2025-01-02T18:00:00Z");
  let docs = s.query_documents(Collection::Shifts, &q).await.unwrap();
  assert_eq!(docs.len(), 2);
}

#[tokio::test]
async fn file_backed_store_persists() {
  let dir = std::env::temp_dir().join(format!("turno-store-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("turno.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_document(Collection::Shifts, json!({ "state": "abierto" })).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let doc = s.get_document(Collection::Shifts, id).await.unwrap().unwrap();
  assert_eq!(doc.data["state"], "abierto");

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn replace_array_element_keeps_concurrent_appends() {
  let s = store().await;
  let id = Uuid::new_v4();
  s.put_document(
    Collection::Shifts,
    id,
    json!({ "extraordinary_services": [
      { "service_id": "a", "state": "abierto" },
      { "service_id": "b", "state": "abierto" },
    ] }),
  )
  .await
  .unwrap();

  // A writer holding this snapshot must not clobber the later append.
  let stale = s.get_document(Collection::Shifts, id).await.unwrap().unwrap();
  s.append_to_array_field(
    Collection::Shifts,
    id,
    "extraordinary_services",
    json!({ "service_id": "c", "state": "abierto" }),
  )
  .await
  .unwrap();

  let mut closed = stale.data["extraordinary_services"][0].clone();
  closed["state"] = json!("cerrado");
  s.replace_array_element(Collection::Shifts, id, "extraordinary_services", "service_id", closed)
    .await
    .unwrap();

  let doc = s.get_document(Collection::Shifts, id).await.unwrap().unwrap();
  assert_eq!(
    doc.data["extraordinary_services"],
    json!([
      { "service_id": "a", "state": "cerrado" },
      { "service_id": "b", "state": "abierto" },
      { "service_id": "c", "state": "abierto" },
    ])
  );

  let err = s
    .replace_array_element(
      Collection::Shifts,
      id,
      "extraordinary_services",
      "service_id",
      json!({ "service_id": "z" }),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ElementNotFound { .. }));

  let err = s
    .replace_array_element(
      Collection::Shifts,
      Uuid::new_v4(),
      "extraordinary_services",
      "service_id",
      json!({ "service_id": "a" }),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}
