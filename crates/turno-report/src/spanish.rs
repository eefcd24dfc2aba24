//! Spanish (Bolivia) date and time formatting.

use chrono::{Datelike, Timelike};

const MONTHS: [&str; 12] = [
  "enero", "febrero", "marzo", "abril", "mayo", "junio",
  "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

/// "10 de enero de 2025".
pub(crate) fn long_date(d: &impl Datelike) -> String {
  let month = MONTHS[d.month0() as usize];
  format!("{} de {} de {}", d.day(), month, d.year())
}

/// 24-hour "08:00".
pub(crate) fn clock_time(t: &impl Timelike) -> String {
  format!("{:02}:{:02}", t.hour(), t.minute())
}

/// "10/01/2025".
pub(crate) fn short_date(d: &impl Datelike) -> String {
  format!("{:02}/{:02}/{}", d.day(), d.month(), d.year())
}
