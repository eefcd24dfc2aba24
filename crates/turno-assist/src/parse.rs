//! Turning free-form model output into typed drafts.
//!
//! Models wrap JSON in prose or markdown fences often enough that parsing is
//! lenient: surrounding text is dropped, missing fields default, and unknown
//! uniform-violation kinds are skipped rather than failing the whole draft.

use serde::{Deserialize, Serialize};
use turno_core::{
  extraordinary::{
    ExtraordinaryOpening, FormationReport, UniformObservation, UniformViolation,
  },
  facility::RelevantCase,
};

use crate::{Error, Result};

/// Placeholder for a case whose type the model could not identify.
pub const UNSPECIFIED: &str = "Sin especificar";

const SUMMARY_MARKER: &str = "RESUMEN:";
const NO_SUMMARY: &str = "Resumen no generado automáticamente.";

// ─── Notes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovedNote {
  pub text:    String,
  /// One-line summary for the daily report.
  pub summary: String,
}

pub(crate) fn improved_note(response: &str) -> ImprovedNote {
  match response.split_once(SUMMARY_MARKER) {
    Some((body, summary)) if !summary.trim().is_empty() => ImprovedNote {
      text:    body.trim().to_string(),
      summary: summary.trim().to_string(),
    },
    Some((body, _)) => ImprovedNote { text: body.trim().to_string(), summary: NO_SUMMARY.into() },
    None => ImprovedNote { text: response.trim().to_string(), summary: NO_SUMMARY.into() },
  }
}

// ─── Cases ───────────────────────────────────────────────────────────────────

/// A relevant case as extracted from free text. Every field may be blank
/// except `kind`, which falls back to [`UNSPECIFIED`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseDraft {
  pub kind:        String,
  pub time:        String,
  pub place:       String,
  pub responsible: String,
  pub detail:      String,
}

impl CaseDraft {
  fn normalised(mut self) -> Self {
    if self.kind.trim().is_empty() {
      self.kind = UNSPECIFIED.to_string();
    }
    self
  }
}

impl From<CaseDraft> for RelevantCase {
  fn from(d: CaseDraft) -> Self {
    RelevantCase {
      kind:        d.kind,
      time:        d.time,
      place:       d.place,
      responsible: d.responsible,
      detail:      d.detail,
    }
  }
}

/// Parse the first `{` … last `}` span of the response.
pub(crate) fn case_draft(response: &str) -> Result<CaseDraft> {
  let start = response.find('{').ok_or(Error::NoJson)?;
  let end = response.rfind('}').filter(|&e| e > start).ok_or(Error::NoJson)?;
  let draft: CaseDraft = serde_json::from_str(&response[start..=end])?;
  Ok(draft.normalised())
}

// ─── Operations ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct RawUniform {
  person: String,
  kind:   String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawOperation {
  operation_order:      Option<String>,
  planned_personnel:    Option<u32>,
  general_supervisor:   Option<String>,
  operational_chief:    Option<String>,
  formation_place:      Option<String>,
  formation_time:       Option<String>,
  installation_time:    Option<String>,
  formed:               Option<u32>,
  absent:               Vec<String>,
  on_leave:             Vec<String>,
  late:                 Vec<String>,
  uniform_observations: Vec<RawUniform>,
  cases:                Vec<CaseDraft>,
}

/// Partial opening data for an extraordinary service. Only fields found in
/// the source text are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDraft {
  pub operation_order:    Option<String>,
  pub planned_personnel:  Option<u32>,
  pub general_supervisor: Option<String>,
  pub operational_chief:  Option<String>,
  pub formation_place:    Option<String>,
  pub formation_time:     Option<String>,
  pub installation_time:  Option<String>,
  /// Present when any formation data was found.
  pub formation:          Option<FormationReport>,
  pub cases:              Vec<CaseDraft>,
}

impl OperationDraft {
  /// Fill the blank fields of `opening` with what was extracted. Values the
  /// supervisor already entered are kept.
  pub fn fill(self, opening: &mut ExtraordinaryOpening) {
    fill_opt(&mut opening.operation_order, self.operation_order);
    fill_opt(&mut opening.operational_chief, self.operational_chief);
    fill_str(&mut opening.general_supervisor, self.general_supervisor);
    fill_str(&mut opening.formation_place, self.formation_place);
    fill_str(&mut opening.formation_time, self.formation_time);
    fill_str(&mut opening.installation_time, self.installation_time);
    if opening.planned_personnel == 0 {
      opening.planned_personnel = self.planned_personnel.unwrap_or(0);
    }
    if opening.formation == FormationReport::default() {
      if let Some(f) = self.formation {
        opening.formation = f;
      }
    }
  }
}

fn fill_opt(slot: &mut Option<String>, value: Option<String>) {
  if slot.as_deref().is_none_or(|s| s.trim().is_empty()) {
    *slot = value;
  }
}

fn fill_str(slot: &mut String, value: Option<String>) {
  if slot.trim().is_empty() {
    if let Some(v) = value {
      *slot = v;
    }
  }
}

/// Strip an optional markdown code fence and parse the whole response.
pub(crate) fn operation_draft(response: &str) -> Result<OperationDraft> {
  let raw: RawOperation = serde_json::from_str(strip_fences(response))?;

  let uniform_observations: Vec<UniformObservation> = raw
    .uniform_observations
    .into_iter()
    .filter_map(|u| {
      let kind = u.kind.trim().parse::<UniformViolation>().ok()?;
      Some(UniformObservation { person: u.person, kind })
    })
    .collect();

  let has_formation = raw.formed.is_some()
    || !raw.absent.is_empty()
    || !raw.on_leave.is_empty()
    || !raw.late.is_empty()
    || !uniform_observations.is_empty();
  let formation = has_formation.then(|| FormationReport {
    formed: raw.formed.unwrap_or(0),
    absent: raw.absent,
    on_leave: raw.on_leave,
    late: raw.late,
    uniform_observations,
  });

  Ok(OperationDraft {
    operation_order: non_blank(raw.operation_order),
    planned_personnel: raw.planned_personnel,
    general_supervisor: non_blank(raw.general_supervisor),
    operational_chief: non_blank(raw.operational_chief),
    formation_place: non_blank(raw.formation_place),
    formation_time: non_blank(raw.formation_time),
    installation_time: non_blank(raw.installation_time),
    formation,
    cases: raw.cases.into_iter().map(CaseDraft::normalised).collect(),
  })
}

fn strip_fences(response: &str) -> &str {
  let s = response.trim();
  let Some(rest) = s.strip_prefix("```") else {
    return s;
  };
  // Drop the info string ("json") up to the first newline.
  let rest = rest.strip_prefix("json").unwrap_or(rest);
  let rest = rest.trim_start_matches([' ', '\r', '\n']);
  rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn non_blank(s: Option<String>) -> Option<String> { s.filter(|s| !s.trim().is_empty()) }
