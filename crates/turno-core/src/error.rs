//! Error types for `turno-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("shift {0} is closed and read-only")]
  ShiftClosed(Uuid),

  #[error("shift {0} is already closed")]
  AlreadyClosed(Uuid),

  #[error("extraordinary service {0} not found")]
  ExtraordinaryNotFound(Uuid),

  #[error("extraordinary service {0} is already closed")]
  ExtraordinaryAlreadyClosed(Uuid),

  #[error("observation is {0} characters long; at most {max} are allowed", max = crate::extraordinary::OBSERVATION_MAX_CHARS)]
  ObservationTooLong(usize),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
