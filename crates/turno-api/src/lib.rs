//! JSON REST API for Turno.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`] and, optionally,
//! a text-completion backend. Every route except `/profiles/bootstrap` and
//! `/catalog/facilities` requires HTTP Basic credentials (email + password).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", turno_api::api_router(state))
//! ```

pub mod assist;
pub mod auth;
pub mod error;
pub mod profiles;
pub mod service;
pub mod shifts;

use std::sync::Arc;

use axum::{
  Json,
  Router,
  routing::{get, post},
};
use turno_assist::{Assistant, TextCompleter};
use turno_core::{catalog, store::DocumentStore};

pub use error::{Result, ServiceError};
pub use service::Service;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, A> {
  pub service:   Arc<Service<S>>,
  /// `None` when no completion backend is configured.
  pub assistant: Option<Arc<Assistant<A>>>,
}

impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self {
      service:   self.service.clone(),
      assistant: self.assistant.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(state: AppState<S, A>) -> Router<()>
where
  S: DocumentStore + 'static,
  A: TextCompleter + 'static,
{
  Router::new()
    // Profiles
    .route("/profiles/bootstrap", post(profiles::bootstrap::<S, A>))
    .route("/profiles/me", get(profiles::me))
    .route("/profiles", get(profiles::list::<S, A>).post(profiles::create::<S, A>))
    .route("/profiles/{id}", get(profiles::get_one::<S, A>))
    // Shifts
    .route("/shifts", get(shifts::list::<S, A>).post(shifts::open::<S, A>))
    .route("/shifts/active", get(shifts::active::<S, A>))
    .route("/shifts/{id}", get(shifts::get_one::<S, A>).delete(shifts::delete_one::<S, A>))
    .route("/shifts/{id}/facility-checks", post(shifts::add_facility_check::<S, A>))
    .route("/shifts/{id}/extraordinary", post(shifts::open_extraordinary::<S, A>))
    .route(
      "/shifts/{id}/extraordinary/{entry}/close",
      post(shifts::close_extraordinary::<S, A>),
    )
    .route("/shifts/{id}/close", post(shifts::close::<S, A>))
    .route("/shifts/{id}/report/preview", post(shifts::preview_report::<S, A>))
    .route("/shifts/{id}/report", get(shifts::report::<S, A>))
    // Catalog
    .route("/catalog/facilities", get(facilities))
    // Assist
    .route("/assist/improve", post(assist::improve::<S, A>))
    .route("/assist/extract-case", post(assist::extract_case::<S, A>))
    .route("/assist/extract-operation", post(assist::extract_operation::<S, A>))
    .with_state(state)
}

/// `GET /catalog/facilities`
async fn facilities() -> Json<&'static [catalog::Unit]> { Json(catalog::UNITS) }
