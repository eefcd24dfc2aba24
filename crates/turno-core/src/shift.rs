//! Shift: one supervisor's open-to-close duty tour ("Servicio Supervisor").
//!
//! A shift is open while the supervisor appends facility checks and
//! extraordinary services, and is closed exactly once. Closing freezes both
//! lists and stores the generated report. Shift documents expire
//! [`RETENTION_DAYS`] after creation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  extraordinary::{ExtraordinaryClosing, ExtraordinaryOpening, ExtraordinaryService},
  facility::FacilityCheck,
};

/// Days a shift document is kept before the retention purge removes it.
pub const RETENTION_DAYS: i64 = 7;

// ─── People ──────────────────────────────────────────────────────────────────

/// Grade and full name of an officer, rendered as "Tcnl. Juan Perez".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
  pub grade:     String,
  pub full_name: String,
}

impl Officer {
  pub fn new(grade: impl Into<String>, full_name: impl Into<String>) -> Self {
    Self { grade: grade.into(), full_name: full_name.into() }
  }
}

impl fmt::Display for Officer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.grade, self.full_name)
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr,
)]
pub enum ShiftState {
  #[serde(rename = "abierto")]
  #[strum(serialize = "abierto")]
  Open,
  #[serde(rename = "cerrado")]
  #[strum(serialize = "cerrado")]
  Closed,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Written once when the shift opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftOpening {
  /// Memorandum that assigned the duty, e.g. "045/2025".
  pub memorandum: String,
  pub started_at: DateTime<Utc>,
  /// The supervisor being relieved.
  pub outgoing:   Officer,
  /// The supervisor taking over; the author of the shift.
  pub incoming:   Officer,
}

/// Inputs collected from the supervisor when the shift is handed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingInput {
  /// Grade and name of the supervisor receiving the duty.
  pub handed_to:      String,
  pub routine_cases:  u32,
  pub relevant_cases: u32,
}

/// Written once when the shift closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftClosing {
  pub closed_at:      DateTime<Utc>,
  pub handed_to:      String,
  pub routine_cases:  u32,
  pub relevant_cases: u32,
  /// The rendered report; empty for shifts closed without one.
  #[serde(default)]
  pub report:         String,
  /// Template version the report was rendered with.
  #[serde(default)]
  pub report_version: Option<String>,
}

impl ShiftClosing {
  pub fn new(
    input: ClosingInput,
    closed_at: DateTime<Utc>,
    report: String,
    report_version: impl Into<String>,
  ) -> Self {
    Self {
      closed_at,
      handed_to: input.handed_to,
      routine_cases: input.routine_cases,
      relevant_cases: input.relevant_cases,
      report,
      report_version: Some(report_version.into()),
    }
  }
}

// ─── Shift ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
  pub shift_id:               Uuid,
  /// Profile id of the supervisor who opened the shift.
  pub supervisor_id:          Uuid,
  pub state:                  ShiftState,
  pub opening:                ShiftOpening,
  pub closing:                Option<ShiftClosing>,
  #[serde(default)]
  pub facility_checks:        Vec<FacilityCheck>,
  #[serde(default)]
  pub extraordinary_services: Vec<ExtraordinaryService>,
  pub created_at:             DateTime<Utc>,
  pub expires_at:             DateTime<Utc>,
}

impl Shift {
  /// A freshly opened shift with empty entry lists.
  pub fn open(supervisor_id: Uuid, opening: ShiftOpening, created_at: DateTime<Utc>) -> Self {
    Self {
      shift_id: Uuid::new_v4(),
      supervisor_id,
      state: ShiftState::Open,
      opening,
      closing: None,
      facility_checks: Vec::new(),
      extraordinary_services: Vec::new(),
      created_at,
      expires_at: created_at + Duration::days(RETENTION_DAYS),
    }
  }

  pub fn is_open(&self) -> bool { self.state == ShiftState::Open }

  /// Fail with [`Error::ShiftClosed`] unless the shift still accepts entries.
  pub fn ensure_open(&self) -> Result<()> {
    if self.is_open() { Ok(()) } else { Err(Error::ShiftClosed(self.shift_id)) }
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at < now }

  pub fn add_facility_check(&mut self, entry: FacilityCheck) -> Result<()> {
    self.ensure_open()?;
    self.facility_checks.push(entry);
    Ok(())
  }

  /// Start an extraordinary service and return its id.
  pub fn open_extraordinary(&mut self, opening: ExtraordinaryOpening) -> Result<Uuid> {
    self.ensure_open()?;
    let service = ExtraordinaryService::open(opening);
    let id = service.service_id;
    self.extraordinary_services.push(service);
    Ok(id)
  }

  pub fn close_extraordinary(
    &mut self,
    service_id: Uuid,
    closing: ExtraordinaryClosing,
  ) -> Result<()> {
    self.ensure_open()?;
    self
      .extraordinary_services
      .iter_mut()
      .find(|s| s.service_id == service_id)
      .ok_or(Error::ExtraordinaryNotFound(service_id))?
      .close(closing)
  }

  /// Close the shift. Transitions `abierto → cerrado` exactly once.
  pub fn close(&mut self, closing: ShiftClosing) -> Result<()> {
    if !self.is_open() || self.closing.is_some() {
      return Err(Error::AlreadyClosed(self.shift_id));
    }
    self.state = ShiftState::Closed;
    self.closing = Some(closing);
    Ok(())
  }
}
