//! Handlers for `/profiles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/profiles/bootstrap` | Unauthenticated; only while no admin exists |
//! | `GET`  | `/profiles/me` | The caller's own profile |
//! | `GET`  | `/profiles` | Admin: supervisors, newest first |
//! | `POST` | `/profiles` | Admin: create a supervisor |
//! | `GET`  | `/profiles/{id}` | Admin, or the profile's owner |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use turno_assist::TextCompleter;
use turno_core::{
  profile::{NewProfile, Profile},
  store::DocumentStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ServiceError};

/// `POST /profiles/bootstrap`
pub async fn bootstrap<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<NewProfile>,
) -> Result<impl IntoResponse, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let profile = state.service.bootstrap_admin(body).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /profiles/me`
pub async fn me(Caller(profile): Caller) -> Json<Profile> { Json(profile) }

/// `GET /profiles`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<Profile>>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(state.service.list_supervisors(&caller).await?))
}

/// `POST /profiles`
pub async fn create<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Json(body): Json<NewProfile>,
) -> Result<impl IntoResponse, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  let profile = state.service.create_supervisor(&caller, body).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /profiles/{id}`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ServiceError>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Ok(Json(state.service.get_profile(&caller, id).await?))
}
