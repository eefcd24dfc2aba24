//! Error types for `turno-assist`.

use thiserror::Error;

/// One failed completion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
  pub model: String,
  pub error: String,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("input text is empty")]
  EmptyInput,

  #[error("no candidate models configured")]
  NoCandidates,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("[{model}] {status}: {body}")]
  Status { model: String, status: u16, body: String },

  #[error("[{model}] empty response")]
  EmptyResponse { model: String },

  #[error("all candidate models failed: {}", describe(.0))]
  AllCandidatesFailed(Vec<Attempt>),

  #[error("response contains no JSON object")]
  NoJson,

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

fn describe(attempts: &[Attempt]) -> String {
  attempts
    .iter()
    .map(|a| format!("{}: {}", a.model, a.error))
    .collect::<Vec<_>>()
    .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
