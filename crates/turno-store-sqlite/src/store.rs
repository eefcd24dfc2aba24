//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use turno_core::store::{Collection, DocumentQuery, DocumentStore, StoredDocument};

use crate::{
  Error, Result,
  document::{append, decode_uuid, encode_dt, encode_uuid, merge, pushdown, replace_element},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Turno document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read-modify-write one document inside a transaction. `edit` runs on the
  /// connection thread; its error aborts the transaction.
  async fn modify<F>(&self, collection: Collection, id: Uuid, edit: F) -> Result<()>
  where
    F: FnOnce(&mut Value) -> Result<()> + Send + 'static,
  {
    let coll = collection.as_ref().to_owned();
    let id_str = encode_uuid(id);
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw: Option<String> = tx
          .query_row(
            "SELECT data FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![coll, id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(Err(Error::NotFound { collection, id }));
        };

        let mut doc: Value = match serde_json::from_str(&raw) {
          Ok(doc) => doc,
          Err(e) => return Ok(Err(e.into())),
        };
        if let Err(e) = edit(&mut doc) {
          return Ok(Err(e));
        }

        tx.execute(
          "UPDATE documents SET data = ?3, updated_at = ?4
           WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![coll, id_str, doc.to_string(), now],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn create_document(&self, collection: Collection, data: Value) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let coll = collection.as_ref().to_owned();
    let id_str = encode_uuid(id);
    let body = data.to_string();
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![coll, id_str, body, now],
        )?;
        Ok(())
      })
      .await?;

    debug!(%collection, %id, "document created");
    Ok(id)
  }

  async fn put_document(&self, collection: Collection, id: Uuid, data: Value) -> Result<()> {
    let coll = collection.as_ref().to_owned();
    let id_str = encode_uuid(id);
    let body = data.to_string();
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (collection, doc_id)
           DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
          rusqlite::params![coll, id_str, body, now],
        )?;
        Ok(())
      })
      .await?;

    debug!(%collection, %id, "document stored");
    Ok(())
  }

  async fn update_document(&self, collection: Collection, id: Uuid, partial: Value) -> Result<()> {
    self.modify(collection, id, move |doc| merge(id, doc, partial)).await?;
    debug!(%collection, %id, "document updated");
    Ok(())
  }

  async fn get_document(&self, collection: Collection, id: Uuid) -> Result<Option<StoredDocument>> {
    let coll = collection.as_ref().to_owned();
    let id_str = encode_uuid(id);

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT data FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![coll, id_str],
            |r| r.get(0),
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw
      .map(|raw| Ok(StoredDocument { id, data: serde_json::from_str(&raw)? }))
      .transpose()
  }

  async fn query_documents<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocumentQuery,
  ) -> Result<Vec<StoredDocument>> {
    let coll = collection.as_ref().to_owned();

    // Push string equality into SQL; everything else is checked below.
    let mut sql = String::from("SELECT doc_id, data FROM documents WHERE collection = ?");
    let mut params: Vec<String> = vec![coll];
    for (path, expected) in query.filters.iter().filter_map(pushdown) {
      sql.push_str(" AND json_extract(data, ?) = ?");
      params.push(path);
      params.push(expected);
    }
    sql.push_str(" ORDER BY rowid");

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |r| {
            Ok((r.get(0)?, r.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut docs = Vec::with_capacity(rows.len());
    for (id, raw) in rows {
      let data: Value = serde_json::from_str(&raw)?;
      if query.matches(&data) {
        docs.push(StoredDocument { id: decode_uuid(&id)?, data });
      }
    }
    query.sort_and_limit(&mut docs);
    Ok(docs)
  }

  async fn delete_document(&self, collection: Collection, id: Uuid) -> Result<bool> {
    let coll = collection.as_ref().to_owned();
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![coll, id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    debug!(%collection, %id, deleted, "document delete");
    Ok(deleted)
  }

  async fn append_to_array_field<'a>(
    &'a self,
    collection: Collection,
    id: Uuid,
    field: &'a str,
    value: Value,
  ) -> Result<()> {
    let field = field.to_owned();
    self
      .modify(collection, id, move |doc| append(id, doc, &field, value))
      .await
  }

  async fn replace_array_element<'a>(
    &'a self,
    collection: Collection,
    id: Uuid,
    field: &'a str,
    key: &'a str,
    value: Value,
  ) -> Result<()> {
    let (field, key) = (field.to_owned(), key.to_owned());
    self
      .modify(collection, id, move |doc| replace_element(id, doc, &field, &key, value))
      .await
  }
}
