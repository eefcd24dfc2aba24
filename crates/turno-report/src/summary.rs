//! The earlier statistical summary layout, kept for shifts closed under that
//! version.

use std::fmt::Write as _;

use turno_core::{
  facility::FacilityCheck,
  shift::{ClosingInput, Shift},
};

use crate::{ReportOptions, spanish};

pub(crate) fn render(opts: &ReportOptions, shift: &Shift, input: &ClosingInput) -> String {
  let created = shift.created_at.with_timezone(&opts.utc_offset);
  let handed_to = match input.handed_to.trim() {
    "" => "N/A",
    name => name,
  };

  let mut out = String::from("REPORTE DE SERVICIO DE SUPERVISOR\n");
  out.push_str("--------------------------------\n");
  let _ = writeln!(out, "Fecha: {}", spanish::short_date(&created));
  let _ = writeln!(out, "Supervisor Saliente: {}", shift.opening.incoming);
  let _ = writeln!(out, "Entregado a: {handed_to}\n");

  out.push_str("RESUMEN ESTADÍSTICO\n");
  let _ = writeln!(out, "- Casos Rutinarios: {}", input.routine_cases);
  let _ = writeln!(out, "- Casos Relevantes: {}\n", input.relevant_cases);

  let _ = writeln!(out, "CONTROL DE UNIDADES ({})", shift.facility_checks.len());
  for (i, check) in shift.facility_checks.iter().enumerate() {
    match detail(check) {
      Some(d) => {
        let _ = writeln!(out, "{}. {}: Con Novedad", i + 1, check.facility);
        let _ = writeln!(out, "   Detalle: {d}");
      }
      None => {
        let _ = writeln!(out, "{}. {}: Sin Novedad", i + 1, check.facility);
      }
    }
  }
  out.push('\n');

  out.push_str("SERVICIOS EXTRAORDINARIOS\n");
  if shift.extraordinary_services.is_empty() {
    out.push_str("Sin servicios extraordinarios registrados.\n");
  } else {
    for (i, svc) in shift.extraordinary_services.iter().enumerate() {
      let name = match svc.opening.name.trim() {
        "" => "Evento",
        name => name,
      };
      let _ = writeln!(out, "{}. {name}", i + 1);
    }
  }
  out
}

/// One-line description of an entry's novelties, if it has any.
fn detail(check: &FacilityCheck) -> Option<String> {
  let p = &check.personnel;
  let mut parts = Vec::new();
  if p.status.is_reported() {
    let names: Vec<&str> = p
      .absent
      .iter()
      .chain(&p.abandoned)
      .chain(&p.arrested)
      .chain(&p.on_leave)
      .map(String::as_str)
      .collect();
    if names.is_empty() {
      parts.push("Novedad de personal".to_string());
    } else {
      parts.push(format!("Personal: {}", names.join(", ")));
    }
  }
  for case in check.relevant_cases() {
    parts.push(format!("{} a hrs {}", case.kind, case.time));
  }
  (!parts.is_empty()).then(|| parts.join("; "))
}

#[cfg(test)]
mod tests {
  use turno_core::{
    extraordinary::ExtraordinaryOpening,
    facility::PersonnelSummary,
    shift::ClosingInput,
  };

  use crate::{ReportTemplate, test_helpers::*};

  #[test]
  fn summary_layout() {
    let mut s = shift();
    s.facility_checks.push(routine("FELCC CENTRAL", PersonnelSummary::default(), vec![brawl()]));
    s.facility_checks.push(routine("POFOMA", absent(&["Sgto. Mamani"]), vec![]));
    s.facility_checks.push(routine("DELTA", PersonnelSummary::default(), vec![]));
    s.open_extraordinary(ExtraordinaryOpening { name: "Carnaval".into(), ..Default::default() })
      .unwrap();

    let out = synth().render_with(ReportTemplate::Summary, &s, &closing_input());
    assert_eq!(
      out,
      "REPORTE DE SERVICIO DE SUPERVISOR
--------------------------------
Fecha: 10/01/2025
Supervisor Saliente: Tcnl. Perez
Entregado a: Tcnl. Ruiz

RESUMEN ESTADÍSTICO
- Casos Rutinarios: 3
- Casos Relevantes: 1

CONTROL DE UNIDADES (3)
1. FELCC CENTRAL: Con Novedad
   Detalle: Riña a hrs 14:00
2. POFOMA: Con Novedad
   Detalle: Personal: Sgto. Mamani
3. DELTA: Sin Novedad

SERVICIOS EXTRAORDINARIOS
1. Carnaval
"
    );
  }

  #[test]
  fn summary_of_an_empty_shift() {
    let input = ClosingInput { handed_to: String::new(), routine_cases: 0, relevant_cases: 0 };
    let out = synth().render_with(ReportTemplate::Summary, &shift(), &input);
    assert!(out.contains("Entregado a: N/A\n"));
    assert!(out.contains("CONTROL DE UNIDADES (0)\n\n"));
    assert!(out.ends_with("SERVICIOS EXTRAORDINARIOS\nSin servicios extraordinarios registrados.\n"));
  }
}
