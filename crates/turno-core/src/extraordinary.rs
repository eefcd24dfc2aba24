//! Extraordinary services: special operations (event security, raids, …)
//! tracked with their own open/close record nested inside a shift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  facility::{NoveltyStatus, RelevantCase},
};

/// Longest observation accepted when closing an extraordinary service.
pub const OBSERVATION_MAX_CHARS: usize = 100;

// ─── Formation ───────────────────────────────────────────────────────────────

/// Kind of uniform violation noted at formation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
  strum::EnumString,
)]
pub enum UniformViolation {
  #[serde(rename = "Incorrecto")]
  #[strum(serialize = "Incorrecto")]
  Incorrect,
  #[serde(rename = "Sucio/Desarreglado")]
  #[strum(serialize = "Sucio/Desarreglado")]
  Untidy,
  #[serde(rename = "Incompleto")]
  #[strum(serialize = "Incompleto")]
  Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformObservation {
  /// Grade and name of the officer observed.
  pub person: String,
  pub kind:   UniformViolation,
}

/// Personnel exceptions noted when the operation's personnel formed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationReport {
  pub formed:               u32,
  #[serde(default)]
  pub absent:               Vec<String>,
  #[serde(default)]
  pub on_leave:             Vec<String>,
  #[serde(default)]
  pub late:                 Vec<String>,
  #[serde(default)]
  pub uniform_observations: Vec<UniformObservation>,
}

// ─── Opening / closing ───────────────────────────────────────────────────────

/// Data recorded when an extraordinary service starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraordinaryOpening {
  /// Human label for the operation, e.g. "Partido Universitario - Capacho".
  pub name:               String,
  /// Operation-order number ("Plan de Operaciones"), e.g. "1576/2025".
  pub operation_order:    Option<String>,
  pub planned_personnel:  u32,
  pub general_supervisor: String,
  /// Grade and name of the operational chief.
  pub operational_chief:  Option<String>,
  pub formation_place:    String,
  pub formation_time:     String,
  pub installation_time:  String,
  pub opened_at:          DateTime<Utc>,
  #[serde(default)]
  pub formation:          FormationReport,
}

/// Free-text observation of at most [`OBSERVATION_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Observation(String);

impl Observation {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for Observation {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> {
    let len = s.chars().count();
    if len > OBSERVATION_MAX_CHARS {
      return Err(Error::ObservationTooLong(len));
    }
    Ok(Self(s))
  }
}

impl From<Observation> for String {
  fn from(o: Observation) -> Self { o.0 }
}

/// Data recorded when an extraordinary service ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraordinaryClosing {
  pub closed_at:   DateTime<Utc>,
  /// Absentees, inherited from the formation report and editable at close.
  #[serde(default)]
  pub absent:      Vec<String>,
  /// Late arrivals, inherited from the formation report plus new ones.
  #[serde(default)]
  pub late:        Vec<String>,
  pub novelty:     NoveltyStatus,
  #[serde(default)]
  pub cases:       Vec<RelevantCase>,
  pub observation: Option<Observation>,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
  #[serde(rename = "abierto")]
  Open,
  #[serde(rename = "cerrado")]
  Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraordinaryService {
  pub service_id: Uuid,
  pub state:      ServiceState,
  pub opening:    ExtraordinaryOpening,
  pub closing:    Option<ExtraordinaryClosing>,
}

impl ExtraordinaryService {
  /// Start a new, open service.
  pub fn open(opening: ExtraordinaryOpening) -> Self {
    Self {
      service_id: Uuid::new_v4(),
      state: ServiceState::Open,
      opening,
      closing: None,
    }
  }

  /// Record the closing data. A service closes exactly once.
  pub fn close(&mut self, closing: ExtraordinaryClosing) -> Result<()> {
    if self.closing.is_some() || self.state == ServiceState::Closed {
      return Err(Error::ExtraordinaryAlreadyClosed(self.service_id));
    }
    self.state = ServiceState::Closed;
    self.closing = Some(closing);
    Ok(())
  }

  /// Absent and late lists as they stand: the closing's when closed, the
  /// formation report's otherwise.
  pub fn absent_and_late(&self) -> (&[String], &[String]) {
    match &self.closing {
      Some(c) => (&c.absent, &c.late),
      None => (&self.opening.formation.absent, &self.opening.formation.late),
    }
  }
}
