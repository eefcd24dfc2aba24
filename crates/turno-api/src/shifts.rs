//! Handlers for `/shifts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/shifts` | Admin: all; supervisor: own; newest first |
//! | `POST`   | `/shifts` | Open a shift; 409 if one is already open |
//! | `GET`    | `/shifts/active` | 404 when the caller has no open shift |
//! | `GET`    | `/shifts/{id}` | 403 for someone else's shift |
//! | `DELETE` | `/shifts/{id}` | Admin only |
//! | `POST`   | `/shifts/{id}/facility-checks` | Append an inspection |
//! | `POST`   | `/shifts/{id}/extraordinary` | Body: opening data |
//! | `POST`   | `/shifts/{id}/extraordinary/{entry}/close` | Body: closing data |
//! | `POST`   | `/shifts/{id}/close` | Body: closing input; returns the shift |
//! | `POST`   | `/shifts/{id}/report/preview` | `text/plain` |
//! | `GET`    | `/shifts/{id}/report` | `text/plain`; 409 while open |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use turno_assist::TextCompleter;
use turno_core::{
  extraordinary::{ExtraordinaryClosing, ExtraordinaryOpening},
  facility::FacilityCheck,
  shift::{ClosingInput, Shift},
  store::DocumentStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Caller,
  error::ServiceError,
  service::{NewFacilityCheck, OpenShift},
};

// ─── Collection ──────────────────────────────────────────────────────────────

/// `GET /shifts`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<Shift>>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(state.service.list_shifts(&caller).await?))
}

/// `POST /shifts`
pub async fn open<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Json(body): Json<OpenShift>,
) -> Result<impl IntoResponse, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let shift = state.service.open_shift(&caller, body).await?;
  Ok((StatusCode::CREATED, Json(shift)))
}

/// `GET /shifts/active`
pub async fn active<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
) -> Result<Json<Shift>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  state
    .service
    .active_shift(&caller)
    .await?
    .map(Json)
    .ok_or_else(|| ServiceError::NotFound("no open shift".into()))
}

// ─── Single shift ────────────────────────────────────────────────────────────

/// `GET /shifts/{id}`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Shift>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(state.service.get_shift(&caller, id).await?))
}

/// `DELETE /shifts/{id}`
pub async fn delete_one<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  state.service.delete_shift(&caller, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// `POST /shifts/{id}/facility-checks`
pub async fn add_facility_check<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<NewFacilityCheck>,
) -> Result<(StatusCode, Json<FacilityCheck>), ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let entry = state.service.add_facility_check(&caller, id, body).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Serialize)]
pub struct Opened {
  pub service_id: Uuid,
}

/// `POST /shifts/{id}/extraordinary`
pub async fn open_extraordinary<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ExtraordinaryOpening>,
) -> Result<(StatusCode, Json<Opened>), ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let service_id = state.service.open_extraordinary(&caller, id, body).await?;
  Ok((StatusCode::CREATED, Json(Opened { service_id })))
}

/// `POST /shifts/{id}/extraordinary/{entry}/close`
pub async fn close_extraordinary<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path((id, entry)): Path<(Uuid, Uuid)>,
  Json(body): Json<ExtraordinaryClosing>,
) -> Result<Json<Shift>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(state.service.close_extraordinary(&caller, id, entry, body).await?))
}

// ─── Closing and reports ─────────────────────────────────────────────────────

/// `POST /shifts/{id}/close`
pub async fn close<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ClosingInput>,
) -> Result<Json<Shift>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(state.service.close_shift(&caller, id, body).await?))
}

/// `POST /shifts/{id}/report/preview`
pub async fn preview_report<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ClosingInput>,
) -> Result<String, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  state.service.preview_report(&caller, id, &body).await
}

/// `GET /shifts/{id}/report`
pub async fn report<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<String, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  state.service.stored_report(&caller, id).await
}
