//! Handlers for `/assist` endpoints. All answer 503 when no completion
//! backend is configured.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use turno_assist::{Assistant, CaseDraft, ImprovedNote, NoteKind, OperationDraft, TextCompleter};
use turno_core::{extraordinary::ExtraordinaryOpening, store::DocumentStore};

use crate::{AppState, auth::Caller, error::ServiceError};

fn assistant<S, A>(state: &AppState<S, A>) -> Result<&Arc<Assistant<A>>, ServiceError> {
  state.assistant.as_ref().ok_or(ServiceError::Unavailable)
}

// ─── Improve ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ImproveBody {
  pub draft:   String,
  #[serde(default)]
  pub kind:    NoteKind,
  #[serde(default)]
  pub context: Option<String>,
}

/// `POST /assist/improve`
pub async fn improve<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(_): Caller,
  Json(body): Json<ImproveBody>,
) -> Result<Json<ImprovedNote>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let note = assistant(&state)?
    .improve_note(&body.draft, body.kind, body.context.as_deref())
    .await?;
  Ok(Json(note))
}

// ─── Extraction ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractBody {
  pub text:    String,
  /// Opening data already entered; blank fields are filled from the text.
  #[serde(default)]
  pub opening: Option<ExtraordinaryOpening>,
}

/// `POST /assist/extract-case`
pub async fn extract_case<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(_): Caller,
  Json(body): Json<ExtractBody>,
) -> Result<Json<CaseDraft>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(assistant(&state)?.extract_case(&body.text).await?))
}

#[derive(Debug, Serialize)]
pub struct ExtractedOperation {
  pub draft:   OperationDraft,
  /// The submitted opening with its blanks filled, when one was sent.
  pub opening: Option<ExtraordinaryOpening>,
}

/// `POST /assist/extract-operation`
pub async fn extract_operation<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(_): Caller,
  Json(body): Json<ExtractBody>,
) -> Result<Json<ExtractedOperation>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let draft = assistant(&state)?.extract_operation(&body.text).await?;
  let opening = body.opening.map(|mut opening| {
    draft.clone().fill(&mut opening);
    opening
  });
  Ok(Json(ExtractedOperation { draft, opening }))
}
