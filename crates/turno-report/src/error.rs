//! Error types for `turno-report`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown report template: {0:?}")]
  UnknownTemplate(String),

  #[error("UTC offset out of range: {0} minutes")]
  InvalidOffset(i32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
