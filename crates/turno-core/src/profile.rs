//! User profiles and stored credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shift::Officer;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Admin,
  Supervisor,
}

/// A registered user. The role is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id: Uuid,
  pub email:      String,
  pub role:       Role,
  /// Police grade abbreviation, e.g. "Tcnl." or "Sgto.".
  pub grade:      String,
  pub full_name:  String,
  #[serde(default)]
  pub phone:      Option<String>,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

impl Profile {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  /// The profile as an officer, used to pre-fill the incoming supervisor.
  pub fn officer(&self) -> Officer { Officer::new(&self.grade, &self.full_name) }
}

/// Input for creating a profile. The password is hashed before storage and
/// never kept on the profile itself.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub email:     String,
  pub password:  String,
  pub grade:     String,
  pub full_name: String,
  #[serde(default)]
  pub phone:     Option<String>,
}

/// Stored credential: email plus an argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
  pub profile_id:    Uuid,
  pub email:         String,
  pub password_hash: String,
}
