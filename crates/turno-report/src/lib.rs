//! End-of-shift report synthesis for Turno.
//!
//! Renders a [`Shift`] and its nested entries into the plain-text memorandum a
//! supervisor hands to the departmental commander. Pure and synchronous: the
//! only input besides the shift is the current time, taken from an injected
//! [`Clock`], so identical inputs and clock values yield identical bytes.
//!
//! # Quick start
//!
//! ```no_run
//! use turno_core::{clock::SystemClock, shift::{ClosingInput, Shift}};
//! use turno_report::{ReportOptions, Synthesizer};
//!
//! # fn demo(shift: &Shift) {
//! let synth = Synthesizer::new(SystemClock, ReportOptions::default());
//! let input = ClosingInput { handed_to: "Tcnl. Ruiz".into(), routine_cases: 3, relevant_cases: 1 };
//! println!("{}", synth.render(shift, &input));
//! # }
//! ```

pub mod error;
mod memorandum;
mod spanish;
mod summary;

use chrono::{FixedOffset, Offset, Utc};
pub use error::{Error, Result};
use serde::{Deserialize, Serialize};
use turno_core::{
  clock::Clock,
  shift::{ClosingInput, Shift},
};

/// Text shown for a closed shift that has no stored report.
pub const MISSING_REPORT_NOTICE: &str = "INFORME

Este servicio fue cerrado con una versión anterior del sistema y no cuenta con el formato de informe automatizado guardado.
Por favor, consulte los detalles en el dashboard.
";

/// Bolivia time, UTC−04:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -4 * 60;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Report layout version. The tag is stored with each closing record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportTemplate {
  /// Sectioned memorandum addressed to the departmental commander.
  #[default]
  Memorandum,
  /// Earlier statistical summary ("REPORTE DE SERVICIO DE SUPERVISOR").
  Summary,
}

impl ReportTemplate {
  pub fn parse(tag: &str) -> Result<Self> {
    tag.parse().map_err(|_| Error::UnknownTemplate(tag.to_string()))
  }
}

/// Boilerplate that varies between deployments. Defaults reproduce the
/// Chuquisaca memorandum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
  pub recipient:  String,
  /// Police garrison named in the reference and opening lines.
  pub garrison:   String,
  /// City printed on the location/date line.
  pub city:       String,
  /// Offset in which all dates and times are printed.
  pub utc_offset: FixedOffset,
  pub template:   ReportTemplate,
}

impl Default for ReportOptions {
  fn default() -> Self {
    Self {
      recipient:  "COMANDANTE DEPARTAMENTAL".into(),
      garrison:   "Chuquisaca".into(),
      city:       "Sucre".into(),
      utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
        .unwrap_or_else(|| Utc.fix()),
      template:   ReportTemplate::Memorandum,
    }
  }
}

impl ReportOptions {
  /// Replace the offset, given in minutes east of UTC.
  pub fn with_offset_minutes(mut self, minutes: i32) -> Result<Self> {
    self.utc_offset = minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .ok_or(Error::InvalidOffset(minutes))?;
    Ok(self)
  }
}

// ─── Synthesizer ─────────────────────────────────────────────────────────────

/// Renders reports. Cheap to clone when `C` is; safe to share between
/// threads.
#[derive(Debug, Clone)]
pub struct Synthesizer<C> {
  clock:   C,
  options: ReportOptions,
}

impl<C: Clock> Synthesizer<C> {
  pub fn new(clock: C, options: ReportOptions) -> Self { Self { clock, options } }

  pub fn options(&self) -> &ReportOptions { &self.options }

  /// Render with the configured template.
  pub fn render(&self, shift: &Shift, input: &ClosingInput) -> String {
    self.render_with(self.options.template, shift, input)
  }

  /// Render with an explicit template version.
  pub fn render_with(
    &self,
    template: ReportTemplate,
    shift: &Shift,
    input: &ClosingInput,
  ) -> String {
    let now = self.clock.now().with_timezone(&self.options.utc_offset);
    match template {
      ReportTemplate::Memorandum => memorandum::render(&self.options, shift, input, now),
      ReportTemplate::Summary => summary::render(&self.options, shift, input),
    }
  }
}

/// The report to show for a closed shift: the stored text, or
/// [`MISSING_REPORT_NOTICE`] when none was saved. `None` while open.
pub fn stored_report(shift: &Shift) -> Option<&str> {
  let closing = shift.closing.as_ref()?;
  if closing.report.trim().is_empty() {
    Some(MISSING_REPORT_NOTICE)
  } else {
    Some(&closing.report)
  }
}

// ─── Shared test helpers ─────────────────────────────────────────────────────
