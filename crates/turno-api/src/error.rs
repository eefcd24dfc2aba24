//! Service error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by a service operation or API handler.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// Text assistance is not configured on this server.
  #[error("text assistance is not configured")]
  Unavailable,

  #[error(transparent)]
  Domain(#[from] turno_core::Error),

  #[error("malformed document: {0}")]
  Document(#[from] serde_json::Error),

  #[error("password hashing failed: {0}")]
  Password(String),

  #[error("assist error: {0}")]
  Assist(#[from] turno_assist::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

impl ServiceError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ServiceError::Store(Box::new(e))
  }

  fn status(&self) -> StatusCode {
    use turno_assist::Error as A;
    use turno_core::Error as D;

    match self {
      ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
      ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
      ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
      ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ServiceError::Conflict(_) => StatusCode::CONFLICT,
      ServiceError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
      ServiceError::Domain(e) => match e {
        D::ShiftClosed(_) | D::AlreadyClosed(_) | D::ExtraordinaryAlreadyClosed(_) => {
          StatusCode::CONFLICT
        }
        D::ExtraordinaryNotFound(_) => StatusCode::NOT_FOUND,
        D::ObservationTooLong(_) => StatusCode::BAD_REQUEST,
        D::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ServiceError::Assist(A::EmptyInput) => StatusCode::BAD_REQUEST,
      ServiceError::Assist(A::NoCandidates) => StatusCode::SERVICE_UNAVAILABLE,
      ServiceError::Assist(_) => StatusCode::BAD_GATEWAY,
      ServiceError::Document(_) | ServiceError::Password(_) | ServiceError::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    let status = self.status();
    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"turno\""),
      );
    }
    res
  }
}
