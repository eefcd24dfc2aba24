//! HTTP Basic-auth extractor resolving the calling profile.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use turno_assist::TextCompleter;
use turno_core::{profile::Profile, store::DocumentStore};

use crate::{AppState, error::ServiceError};

/// The authenticated, active profile making the request.
#[derive(Debug, Clone)]
pub struct Caller(pub Profile);

/// Decode `Authorization: Basic …` into an (email, password) pair.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ServiceError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ServiceError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ServiceError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ServiceError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ServiceError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ServiceError::Unauthorized)?;
  Ok((email.to_string(), password.to_string()))
}

impl<S, A> FromRequestParts<AppState<S, A>> for Caller
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  type Rejection = ServiceError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) = basic_credentials(&parts.headers)?;
    let profile = state.service.authenticate(&email, &password).await?;
    Ok(Caller(profile))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn decodes_email_and_password() {
    let value = format!("Basic {}", B64.encode("perez@policia.bo:a:b"));
    let (email, password) = basic_credentials(&headers(&value)).unwrap();
    assert_eq!(email, "perez@policia.bo");
    assert_eq!(password, "a:b");
  }

  #[test]
  fn missing_header() {
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(ServiceError::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let h = headers("Basic !!!not-base64!!!");
    assert!(matches!(basic_credentials(&h), Err(ServiceError::Unauthorized)));
  }

  #[test]
  fn other_schemes_are_rejected() {
    let h = headers("Bearer abc");
    assert!(matches!(basic_credentials(&h), Err(ServiceError::Unauthorized)));
  }
}
