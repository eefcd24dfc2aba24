//! The sectioned memorandum layout.
//!
//! ```text
//! INFORME / AL / DEL / Ref.      letter header
//! opening narrative              memorandum, start, relieved supervisor
//! I.   Unidades Supervisadas     unit list, personnel novelties, cases
//! II.  Servicios extraordinarios one line per operation
//! III. Recinto penitenciario     first penal entry only
//! IV.  Detalle del Personal      absent / abandoned roll-up
//! closing narrative, city and date
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};
use turno_core::{
  extraordinary::ExtraordinaryService,
  facility::FacilityCheck,
  shift::{ClosingInput, Shift},
};

use crate::{ReportOptions, spanish};

pub(crate) fn render(
  opts: &ReportOptions,
  shift: &Shift,
  input: &ClosingInput,
  now: DateTime<FixedOffset>,
) -> String {
  let opening = &shift.opening;
  let started = opening.started_at.with_timezone(&opts.utc_offset);
  let start_date = spanish::long_date(&started);
  let checks = &shift.facility_checks;

  format!(
    "INFORME

AL:\t{recipient}
DEL: \t{incoming}
SUPERVISOR GENERAL DE SERVICIOS\x20
Ref.: \tInforme de novedades del servicio de supervisor general de servicios de la guarnición policial de {garrison} de fecha {start_date}

Señor comandante

Dando cumplimiento a memorándum {memorandum} en fecha {start_date} a horas {start_time}, me hice cargo del servicio de supervisor general de servicios de la guarnición policial de {garrison} procediendo al relevo con el {outgoing} con las novedades del turno saliente, durante el servicio se registraron las siguientes novedades:

I. Unidades Supervisadas.
Se realizó el control y supervisión de las siguientes unidades: {units}.

{personnel}
{cases}

II. Servicios extraordinarios
{extraordinary}

III. Recinto penitenciario de San Roque
{penal}

IV. Detalle del Personal
Este es un resumen de las novedades del personal:

a) Faltantes en sus unidades
{missing}

b) Abandono de servicio
{abandoned}

Con las novedades registradas en el presente informe a horas {now_time} procedí al relevo del servicio con el {handed_to} con {routine} casos registrados de rutina y {relevant} de relevancia.

{city}, {now_date}
",
    recipient = opts.recipient,
    incoming = opening.incoming,
    garrison = opts.garrison,
    memorandum = opening.memorandum,
    start_time = spanish::clock_time(&started),
    outgoing = opening.outgoing,
    units = unit_list(checks),
    personnel = personnel_novelties(checks),
    cases = relevant_cases(checks),
    extraordinary = extraordinary_services(&shift.extraordinary_services),
    penal = penal_facility(checks),
    missing = roll_up(checks, |c| &c.personnel.absent, "Sin personal faltante."),
    abandoned = roll_up(checks, |c| &c.personnel.abandoned, "Sin abandono de servicio."),
    now_time = spanish::clock_time(&now),
    handed_to = input.handed_to,
    routine = input.routine_cases,
    relevant = input.relevant_cases,
    city = opts.city,
    now_date = spanish::long_date(&now),
  )
}

// ─── Section I ───────────────────────────────────────────────────────────────

/// "1. FELCC CENTRAL  2. POFOMA", penal entries left out.
fn unit_list(checks: &[FacilityCheck]) -> String {
  let names: Vec<String> = checks
    .iter()
    .filter(|c| !c.is_penal())
    .enumerate()
    .map(|(i, c)| format!("{}. {}", i + 1, c.facility))
    .collect();
  if names.is_empty() {
    "Ninguna unidad registrada".to_string()
  } else {
    names.join("  ")
  }
}

fn personnel_novelties(checks: &[FacilityCheck]) -> String {
  let reported: Vec<&FacilityCheck> =
    checks.iter().filter(|c| c.personnel.status.is_reported()).collect();
  if reported.is_empty() {
    return "   - Personal: Sin novedad.\n".to_string();
  }

  let mut out = String::from("Novedades del Personal:\n");
  for check in reported {
    let p = &check.personnel;
    let parts: Vec<String> = [
      ("Faltaron al servicio", &p.absent),
      ("Abandonaron el servicio", &p.abandoned),
      ("Cumplió Arresto", &p.arrested),
      ("Con Permiso", &p.on_leave),
    ]
    .into_iter()
    .filter(|(_, names)| !names.is_empty())
    .map(|(label, names)| format!("{label}: {}", names.join(", ")))
    .collect();

    // A "con" entry with every list empty has nothing to say.
    if !parts.is_empty() {
      let _ = writeln!(out, "   - {}: {}.", check.facility, parts.join(". "));
    }
  }
  out
}

fn relevant_cases(checks: &[FacilityCheck]) -> String {
  let with_cases: Vec<&FacilityCheck> =
    checks.iter().filter(|c| !c.relevant_cases().is_empty()).collect();
  if with_cases.is_empty() {
    return "   - Casos de Relevancia: Sin novedad.\n".to_string();
  }

  let mut out = String::from("Casos de Relevancia Atendidos:\n");
  for check in with_cases {
    for case in check.relevant_cases() {
      let _ = writeln!(
        out,
        "   - {}: {} a hrs {}. {} (Encargado: {}).",
        check.facility, case.kind, case.time, case.detail, case.responsible
      );
    }
  }
  out
}

// ─── Section II ──────────────────────────────────────────────────────────────

fn extraordinary_services(services: &[ExtraordinaryService]) -> String {
  if services.is_empty() {
    return "Sin servicios extraordinarios registrados.\n".to_string();
  }

  let mut out = String::new();
  for (i, svc) in services.iter().enumerate() {
    let opening = &svc.opening;
    let order = non_empty(opening.operation_order.as_deref()).unwrap_or("S/N");
    let chief = non_empty(opening.operational_chief.as_deref()).unwrap_or("Sin Jefe Operativo");
    let _ = writeln!(
      out,
      "{}. Servicio \"{}\" (Plan de Op. N° {}), a cargo del {}. Novedades: {}.",
      i + 1,
      opening.name,
      order,
      chief,
      service_novelties(svc)
    );
  }
  out
}

/// Personnel description and results description joined by ". ", or the
/// "nothing of note" default.
fn service_novelties(svc: &ExtraordinaryService) -> String {
  let parts: Vec<String> = [personnel_description(svc), results_description(svc)]
    .into_iter()
    .flatten()
    .collect();
  if parts.is_empty() {
    return "Sin novedad de importancia".to_string();
  }
  parts.join(". ").trim_end_matches('.').to_string()
}

/// Absent, late and uniform exceptions: "Faltaron: …; Atrasados: …".
fn personnel_description(svc: &ExtraordinaryService) -> Option<String> {
  let (absent, late) = svc.absent_and_late();
  let uniforms: Vec<String> = svc
    .opening
    .formation
    .uniform_observations
    .iter()
    .map(|o| format!("{} ({})", o.person, o.kind))
    .collect();

  let parts: Vec<String> = [("Faltaron", absent), ("Atrasados", late), ("Uniforme", &uniforms[..])]
    .into_iter()
    .filter(|(_, names)| !names.is_empty())
    .map(|(label, names)| format!("{label}: {}", names.join(", ")))
    .collect();
  (!parts.is_empty()).then(|| parts.join("; "))
}

/// Cases attended and the closing observation: "Resultados: …".
fn results_description(svc: &ExtraordinaryService) -> Option<String> {
  let closing = svc.closing.as_ref()?;
  let mut items: Vec<String> = closing
    .cases
    .iter()
    .map(|c| format!("{} a hrs {}, {}", c.kind, c.time, c.place))
    .collect();
  if let Some(obs) = closing.observation.as_ref().and_then(|o| non_empty(Some(o.as_str()))) {
    items.push(obs.to_string());
  }
  (!items.is_empty()).then(|| format!("Resultados: {}", items.join("; ")))
}

// ─── Section III ─────────────────────────────────────────────────────────────

/// The first penal entry wins; later ones are ignored here.
fn penal_facility(checks: &[FacilityCheck]) -> String {
  let Some(check) = checks.iter().find(|c| c.is_penal()) else {
    return "No se registró control en el Recinto Penitenciario.\n".to_string();
  };
  let penal = check.penal();

  let chief = penal
    .and_then(|p| non_empty(p.security_chief.as_deref()))
    .unwrap_or("No registrado");
  let mut out = format!("Jefe de Seguridad: {chief}\n");
  if let Some(p) = penal {
    let _ = writeln!(out, "Población Penal: {} privados de libertad.", p.total());
    let _ = writeln!(out, "Arrestos Domiciliarios: {}.", p.home_detention);
  }
  let notes = penal
    .and_then(|p| non_empty(p.notes.as_deref()))
    .unwrap_or("Sin novedades de relevancia.");
  let _ = writeln!(out, "Novedades: {notes}");
  out
}

// ─── Section IV ──────────────────────────────────────────────────────────────

/// "Sgto. Mamani (POFOMA), Cbo. Quispe (DELTA)" across every entry.
fn roll_up(
  checks: &[FacilityCheck],
  list: impl Fn(&FacilityCheck) -> &Vec<String>,
  empty: &str,
) -> String {
  let names: Vec<String> = checks
    .iter()
    .flat_map(|c| list(c).iter().map(move |n| format!("{n} ({})", c.facility)))
    .collect();
  if names.is_empty() { empty.to_string() } else { names.join(", ") }
}

fn non_empty(s: Option<&str>) -> Option<&str> { s.map(str::trim).filter(|s| !s.is_empty()) }

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use turno_core::{
    extraordinary::{
      ExtraordinaryClosing, ExtraordinaryOpening, FormationReport, Observation,
      UniformObservation, UniformViolation,
    },
    facility::{CheckPayload, NoveltyStatus, PenalCheck, PersonnelSummary},
  };

  use super::*;
  use crate::test_helpers::*;

  fn render(shift: &Shift) -> String { synth().render(shift, &closing_input()) }

  fn penal(facility: &str, male: u32, chief: Option<&str>) -> FacilityCheck {
    FacilityCheck::new(
      facility,
      local(10, 0),
      PersonnelSummary::default(),
      CheckPayload::Penal(PenalCheck {
        male,
        female: 12,
        home_detention: 4,
        security_chief: chief.map(Into::into),
        notes: None,
      }),
    )
  }

  #[test]
  fn memorandum_045_scenario() {
    let mut s = shift();
    s.facility_checks.push(routine("FELCC CENTRAL", PersonnelSummary::default(), vec![brawl()]));
    let out = render(&s);

    assert!(out.starts_with("INFORME\n\nAL:\tCOMANDANTE DEPARTAMENTAL\nDEL: \tTcnl. Perez\nSUPERVISOR GENERAL DE SERVICIOS \n"));
    assert!(out.contains(
      "Ref.: \tInforme de novedades del servicio de supervisor general de servicios de la guarnición policial de Chuquisaca de fecha 10 de enero de 2025\n"
    ));
    assert!(out.contains(
      "Dando cumplimiento a memorándum 045/2025 en fecha 10 de enero de 2025 a horas 08:00, me hice cargo"
    ));
    assert!(out.contains("procediendo al relevo con el Tcnl. Gomez con las novedades"));
    assert!(out.contains("siguientes unidades: 1. FELCC CENTRAL.\n"));
    assert!(out.contains("   - Personal: Sin novedad.\n"));
    assert!(out.contains(
      "Casos de Relevancia Atendidos:\n   - FELCC CENTRAL: Riña a hrs 14:00. Se controló disturbio (Encargado: Sgto. Lopez).\n"
    ));
    assert!(out.contains("II. Servicios extraordinarios\nSin servicios extraordinarios registrados.\n"));
    assert!(out.contains("No se registró control en el Recinto Penitenciario.\n"));
    assert!(out.contains(
      "a horas 07:45 procedí al relevo del servicio con el Tcnl. Ruiz con 3 casos registrados de rutina y 1 de relevancia."
    ));
    assert!(out.ends_with("\n\nSucre, 11 de enero de 2025\n"));
  }

  #[test]
  fn empty_shift_uses_placeholders() {
    let out = render(&shift());
    assert!(out.contains("siguientes unidades: Ninguna unidad registrada.\n"));
    assert!(out.contains("   - Personal: Sin novedad.\n\n   - Casos de Relevancia: Sin novedad.\n\n\nII."));
    assert!(out.contains("a) Faltantes en sus unidades\nSin personal faltante.\n"));
    assert!(out.contains("b) Abandono de servicio\nSin abandono de servicio.\n"));
  }

  #[test]
  fn absent_officer_is_reported_twice() {
    let mut s = shift();
    s.facility_checks.push(routine("POFOMA", absent(&["Sgto. Mamani"]), vec![]));
    let out = render(&s);

    assert!(out.contains("Novedades del Personal:\n   - POFOMA: Faltaron al servicio: Sgto. Mamani.\n"));
    assert!(out.contains("a) Faltantes en sus unidades\nSgto. Mamani (POFOMA)\n"));
    assert!(!out.contains("Personal: Sin novedad."));
  }

  #[test]
  fn all_personnel_categories_in_order() {
    let mut s = shift();
    let personnel = PersonnelSummary {
      present:   8,
      status:    NoveltyStatus::Reported,
      absent:    vec!["Sgto. A".into(), "Cbo. B".into()],
      abandoned: vec!["Pol. C".into()],
      arrested:  vec!["Pol. D".into()],
      on_leave:  vec!["Sof. E".into()],
    };
    s.facility_checks.push(routine("DELTA", personnel, vec![]));
    let out = render(&s);

    assert!(out.contains(
      "   - DELTA: Faltaron al servicio: Sgto. A, Cbo. B. Abandonaron el servicio: Pol. C. Cumplió Arresto: Pol. D. Con Permiso: Sof. E.\n"
    ));
    assert!(out.contains("Sgto. A (DELTA), Cbo. B (DELTA)\n"));
    assert!(out.contains("b) Abandono de servicio\nPol. C (DELTA)\n"));
  }

  #[test]
  fn units_without_novelty_stay_out_of_the_novelty_block() {
    let mut s = shift();
    // Names listed but status "sin": not a novelty.
    let quiet = PersonnelSummary { status: NoveltyStatus::None, absent: vec!["Pol. X".into()], ..Default::default() };
    s.facility_checks.push(routine("UTOP", quiet, vec![]));
    s.facility_checks.push(routine("PAC", absent(&["Pol. Y"]), vec![]));
    let out = render(&s);

    assert!(out.contains("   - PAC: Faltaron al servicio: Pol. Y.\n"));
    assert!(!out.contains("   - UTOP:"));
  }

  #[test]
  fn reported_entry_with_empty_lists_prints_only_the_header() {
    let mut s = shift();
    let flagged = PersonnelSummary { status: NoveltyStatus::Reported, ..Default::default() };
    s.facility_checks.push(routine("UTOP", flagged, vec![]));
    let out = render(&s);
    assert!(out.contains("Novedades del Personal:\n\n   - Casos de Relevancia: Sin novedad."));
  }

  #[test]
  fn penal_entries_feed_section_three_once() {
    let mut s = shift();
    s.facility_checks.push(routine("FELCC CENTRAL", PersonnelSummary::default(), vec![]));
    s.facility_checks.push(penal("RECINTO PENITENCIARIO \"SAN ROQUE\"", 300, Some("Cap. Rojas")));
    s.facility_checks.push(routine("POFOMA", PersonnelSummary::default(), vec![]));
    s.facility_checks.push(penal("CARCELETA", 999, None));
    let out = render(&s);

    assert!(out.contains("siguientes unidades: 1. FELCC CENTRAL  2. POFOMA.\n"));
    assert!(out.contains(
      "III. Recinto penitenciario de San Roque\nJefe de Seguridad: Cap. Rojas\nPoblación Penal: 312 privados de libertad.\nArrestos Domiciliarios: 4.\nNovedades: Sin novedades de relevancia.\n"
    ));
    assert!(!out.contains("1011"));
    assert_eq!(out.matches("Jefe de Seguridad:").count(), 1);
  }

  #[test]
  fn penal_population_does_not_wrap() {
    let mut s = shift();
    s.facility_checks.push(FacilityCheck::new(
      "RECINTO PENITENCIARIO \"SAN ROQUE\"",
      local(10, 0),
      PersonnelSummary::default(),
      CheckPayload::Penal(PenalCheck { male: u32::MAX, female: 1, ..Default::default() }),
    ));
    let out = render(&s);

    assert!(out.contains("Población Penal: 4294967296 privados de libertad.\n"));
  }

  #[test]
  fn legacy_penal_entry_by_name() {
    let mut s = shift();
    s.facility_checks.push(routine("RECINTO PENITENCIARIO \"SAN ROQUE\"", PersonnelSummary::default(), vec![]));
    let out = render(&s);

    assert!(out.contains("siguientes unidades: Ninguna unidad registrada."));
    assert!(out.contains("Jefe de Seguridad: No registrado\nNovedades: Sin novedades de relevancia.\n"));
    assert!(!out.contains("Población Penal"));
  }

  #[test]
  fn extraordinary_services_are_numbered() {
    let mut s = shift();
    s.open_extraordinary(ExtraordinaryOpening {
      name: "Partido Universitario".into(),
      operation_order: Some("1576/2025".into()),
      operational_chief: Some("My. Vargas".into()),
      ..Default::default()
    })
    .unwrap();
    let raid = s
      .open_extraordinary(ExtraordinaryOpening {
        name: "Operativo Nocturno".into(),
        formation: FormationReport {
          formed: 12,
          absent: vec!["Pol. Cruz".into()],
          uniform_observations: vec![UniformObservation {
            person: "Pol. Flores".into(),
            kind:   UniformViolation::Incomplete,
          }],
          ..Default::default()
        },
        ..Default::default()
      })
      .unwrap();
    s.close_extraordinary(
      raid,
      ExtraordinaryClosing {
        closed_at:   Utc::now(),
        absent:      vec!["Pol. Cruz".into()],
        late:        vec!["Pol. Ticona".into()],
        novelty:     NoveltyStatus::Reported,
        cases:       vec![brawl()],
        observation: Some(Observation::try_from("Dos aprehendidos.".to_string()).unwrap()),
      },
    )
    .unwrap();
    let out = render(&s);

    assert!(out.contains(
      "1. Servicio \"Partido Universitario\" (Plan de Op. N° 1576/2025), a cargo del My. Vargas. Novedades: Sin novedad de importancia.\n"
    ));
    assert!(out.contains(
      "2. Servicio \"Operativo Nocturno\" (Plan de Op. N° S/N), a cargo del Sin Jefe Operativo. Novedades: Faltaron: Pol. Cruz; Atrasados: Pol. Ticona; Uniforme: Pol. Flores (Incompleto). Resultados: Riña a hrs 14:00, Plaza; Dos aprehendidos.\n"
    ));
  }

  #[test]
  fn numbering_restarts_after_filtering() {
    let mut s = shift();
    s.facility_checks.push(penal("RECINTO PENITENCIARIO \"SAN ROQUE\"", 1, None));
    s.facility_checks.push(routine("DIPROVE", PersonnelSummary::default(), vec![]));
    s.facility_checks.push(routine("INTERPOL", PersonnelSummary::default(), vec![]));
    let out = render(&s);
    assert!(out.contains("unidades: 1. DIPROVE  2. INTERPOL."));
  }
}
