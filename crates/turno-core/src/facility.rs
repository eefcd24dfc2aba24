//! Facility-check entries, one inspection record per unit visited during a
//! shift.
//!
//! Entries are immutable once appended to a shift. The payload is a tagged
//! variant chosen when the entry is created: ordinary units report routine
//! and relevant cases, the penal facility reports its population instead.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;

// ─── Novelty flag ────────────────────────────────────────────────────────────

/// Whether a record carries novelties ("con novedad") or not ("sin novedad").
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display, strum::EnumString, strum::AsRefStr,
)]
pub enum NoveltyStatus {
  #[default]
  #[serde(rename = "sin")]
  #[strum(serialize = "sin")]
  None,
  #[serde(rename = "con")]
  #[strum(serialize = "con")]
  Reported,
}

impl NoveltyStatus {
  pub fn is_reported(self) -> bool { matches!(self, Self::Reported) }
}

// ─── Cases ───────────────────────────────────────────────────────────────────

/// A case of relevance attended at a unit or during an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantCase {
  /// Nature of the case, e.g. "Riña", "Robo".
  pub kind:        String,
  /// Time of the event as entered, usually `HH:MM`.
  pub time:        String,
  pub place:       String,
  /// Grade and name of the officer in charge.
  pub responsible: String,
  pub detail:      String,
}

// ─── Personnel ───────────────────────────────────────────────────────────────

/// Head-count and exception lists for a unit's personnel. Each name is the
/// officer's grade followed by the full name ("Sgto. David Mamani").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelSummary {
  pub present:   u32,
  pub status:    NoveltyStatus,
  #[serde(default)]
  pub absent:    Vec<String>,
  #[serde(default)]
  pub abandoned: Vec<String>,
  #[serde(default)]
  pub arrested:  Vec<String>,
  #[serde(default)]
  pub on_leave:  Vec<String>,
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// Case counts for an ordinary unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineCheck {
  pub routine_cases: u32,
  #[serde(default)]
  pub relevant:      Vec<RelevantCase>,
}

/// Population report for the penal facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenalCheck {
  pub male:           u32,
  pub female:         u32,
  pub home_detention: u32,
  /// Grade and name of the facility's head of security.
  pub security_chief: Option<String>,
  pub notes:          Option<String>,
}

impl PenalCheck {
  /// Inmates held on site (male plus female).
  pub fn total(&self) -> u64 { u64::from(self.male) + u64::from(self.female) }
}

/// The mutually exclusive payload of a facility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckPayload {
  Routine(RoutineCheck),
  Penal(PenalCheck),
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One inspection record for one facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityCheck {
  pub check_id:   Uuid,
  /// Free-text unit name; usually one of [`catalog::UNITS`].
  pub facility:   String,
  /// Local date and time of the inspection as entered by the supervisor.
  pub checked_at: NaiveDateTime,
  pub personnel:  PersonnelSummary,
  pub payload:    CheckPayload,
}

impl FacilityCheck {
  /// Build a new entry with a fresh id.
  pub fn new(
    facility: impl Into<String>,
    checked_at: NaiveDateTime,
    personnel: PersonnelSummary,
    payload: CheckPayload,
  ) -> Self {
    Self {
      check_id: Uuid::new_v4(),
      facility: facility.into(),
      checked_at,
      personnel,
      payload,
    }
  }

  /// Whether this entry reports on the penal facility: either it carries a
  /// population payload, or (entries recorded before the payload was tagged)
  /// its name matches the penal markers.
  pub fn is_penal(&self) -> bool {
    matches!(self.payload, CheckPayload::Penal(_))
      || catalog::is_penal_facility_name(&self.facility)
  }

  pub fn penal(&self) -> Option<&PenalCheck> {
    match &self.payload {
      CheckPayload::Penal(p) => Some(p),
      CheckPayload::Routine(_) => None,
    }
  }

  /// Relevant cases; always empty for penal entries.
  pub fn relevant_cases(&self) -> &[RelevantCase] {
    match &self.payload {
      CheckPayload::Routine(r) => &r.relevant,
      CheckPayload::Penal(_) => &[],
    }
  }
}
