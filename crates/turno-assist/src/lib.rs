//! Generative-text assistance for Turno.
//!
//! The only capability consumed from the outside world is
//! [`TextCompleter::complete`]: one prompt, one model, one attempt. On top of
//! it [`Assistant`] walks an ordered list of candidate models and implements
//! the three text helpers used while filling a shift: tidying a free-text
//! note, extracting a relevant case from a chat message, and extracting an
//! extraordinary-service opening from an operation plan.

pub mod error;
pub mod gemini;
mod parse;
mod prompts;

use std::future::Future;

pub use error::{Attempt, Error, Result};
pub use gemini::{GeminiClient, GeminiConfig};
pub use parse::{CaseDraft, ImprovedNote, OperationDraft};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Models tried in order when none are configured.
pub const DEFAULT_CANDIDATES: [&str; 3] =
  ["gemini-2.0-flash", "gemini-2.5-flash", "gemini-pro-latest"];

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A text-completion backend.
///
/// Implementations make exactly one attempt; retrying across models is the
/// caller's job.
pub trait TextCompleter: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn complete<'a>(
    &'a self,
    model: &'a str,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

// ─── Input types ─────────────────────────────────────────────────────────────

/// Kind of document a note is being written for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
  #[default]
  #[strum(serialize = "Novedad de servicio")]
  Novelty,
  #[strum(serialize = "Informe")]
  Report,
  #[strum(serialize = "Parte")]
  DailyPart,
}

// ─── Assistant ───────────────────────────────────────────────────────────────

pub struct Assistant<T> {
  completer:  T,
  candidates: Vec<String>,
}

impl<T: TextCompleter> Assistant<T> {
  /// An assistant trying [`DEFAULT_CANDIDATES`] in order.
  pub fn new(completer: T) -> Self {
    Self::with_candidates(completer, DEFAULT_CANDIDATES.iter().map(|m| m.to_string()).collect())
  }

  pub fn with_candidates(completer: T, candidates: Vec<String>) -> Self {
    Self { completer, candidates }
  }

  pub fn candidates(&self) -> &[String] { &self.candidates }

  /// Try each candidate model once and return the first successful answer.
  pub async fn complete(&self, prompt: &str) -> Result<String> {
    if self.candidates.is_empty() {
      return Err(Error::NoCandidates);
    }

    let mut attempts = Vec::new();
    for model in &self.candidates {
      match self.completer.complete(model, prompt).await {
        Ok(text) => {
          debug!(%model, "completion succeeded");
          return Ok(text);
        }
        Err(e) => {
          warn!(%model, error = %e, "completion failed; trying next model");
          attempts.push(Attempt { model: model.clone(), error: e.to_string() });
        }
      }
    }
    Err(Error::AllCandidatesFailed(attempts))
  }

  /// Rewrite an informal draft as a formal police note plus a one-line
  /// summary.
  pub async fn improve_note(
    &self,
    draft: &str,
    kind: NoteKind,
    context: Option<&str>,
  ) -> Result<ImprovedNote> {
    let draft = non_empty(draft)?;
    let text = self.complete(&prompts::improve_note(draft, kind, context)).await?;
    Ok(parse::improved_note(&text))
  }

  /// Pull one relevant case out of a free-text report (e.g. a chat message).
  pub async fn extract_case(&self, report: &str) -> Result<CaseDraft> {
    let report = non_empty(report)?;
    let text = self.complete(&prompts::extract_case(report)).await?;
    parse::case_draft(&text)
  }

  /// Pull the opening data of an extraordinary service out of an operation
  /// plan.
  pub async fn extract_operation(&self, plan: &str) -> Result<OperationDraft> {
    let plan = non_empty(plan)?;
    let text = self.complete(&prompts::extract_operation(plan)).await?;
    parse::operation_draft(&text)
  }
}

fn non_empty(s: &str) -> Result<&str> {
  match s.trim() {
    "" => Err(Error::EmptyInput),
    s => Ok(s),
  }
}

#[cfg(test)]
pub(crate) mod test_helpers {
  use std::sync::Mutex;

  use super::TextCompleter;

  #[derive(Debug, thiserror::Error)]
  #[error("model {0} unavailable")]
  pub(crate) struct Unavailable(pub String);

  /// Answers with a canned response; models listed in `failing` error out.
  /// Every call is recorded.
  pub(crate) struct Scripted {
    pub failing:  Vec<&'static str>,
    pub response: String,
    pub calls:    Mutex<Vec<(String, String)>>,
  }

  impl Scripted {
    pub(crate) fn answering(response: &str) -> Self {
      Self { failing: vec![], response: response.into(), calls: Mutex::new(vec![]) }
    }

    pub(crate) fn models_called(&self) -> Vec<String> {
      self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }
  }

  impl TextCompleter for Scripted {
    type Error = Unavailable;

    async fn complete<'a>(&'a self, model: &'a str, prompt: &'a str) -> Result<String, Unavailable> {
      self.calls.lock().unwrap().push((model.to_string(), prompt.to_string()));
      if self.failing.iter().any(|m| *m == model) {
        Err(Unavailable(model.to_string()))
      } else {
        Ok(self.response.clone())
      }
    }
  }
}
