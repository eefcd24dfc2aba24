//! Error type for `turno-store-sqlite`.

use thiserror::Error;
use turno_core::store::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("document not found: {collection}/{id}")]
  NotFound { collection: Collection, id: uuid::Uuid },

  /// The stored document or the update payload is not a JSON object.
  #[error("document {0} is not a JSON object")]
  NotAnObject(uuid::Uuid),

  #[error("field {field:?} of document {id} is not an array")]
  NotAnArray { id: uuid::Uuid, field: String },

  #[error("no element of {field:?} in document {id} has {key} = {value}")]
  ElementNotFound { id: uuid::Uuid, field: String, key: String, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
