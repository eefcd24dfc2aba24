//! The fixed catalog of units a supervisor inspects during a shift.
//!
//! Names are used for grouping in clients only; a facility-check entry stores
//! the name as free text and is never joined back to this table.

use serde::Serialize;

/// A unit, optionally grouping sub-units (e.g. FELCC and its EPI offices).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Unit {
  pub id:        &'static str,
  pub name:      &'static str,
  pub sub_units: &'static [Unit],
}

const fn leaf(id: &'static str, name: &'static str) -> Unit {
  Unit { id, name, sub_units: &[] }
}

/// Substrings that identify the penal facility by name. Matching is
/// case-sensitive.
pub const PENAL_MARKERS: [&str; 3] = ["PENITENCIARIO", "San Roque", "RECINTO"];

pub const UNITS: &[Unit] = &[
  Unit {
    id:        "FELCC",
    name:      "FELCC",
    sub_units: &[
      leaf("FELCC_CENTRAL", "FELCC CENTRAL"),
      leaf("FELCC_VILLA_ARMONIA", "FELCC EPI VILLA ARMONÍA"),
      leaf("FELCC_PATACON", "FELCC EPI PATACÓN"),
      leaf("FELCC_SAN_ROQUE", "FELCC EPI SAN ROQUE"),
    ],
  },
  Unit {
    id:        "FELCV",
    name:      "FELCV",
    sub_units: &[
      leaf("FELCV_VILLA_ARMONIA", "FELCV EPI VILLA ARMONÍA"),
      leaf("FELCV_SAN_ROQUE", "FELCV EPI SAN ROQUE"),
      leaf("FELCV_PATACON", "FELCV EPI PATACÓN"),
    ],
  },
  leaf("DIPROVE", "DIPROVE"),
  leaf("INTERPOL", "INTERPOL"),
  leaf("POFOMA", "POFOMA"),
  Unit {
    id:        "TRANSITO",
    name:      "TRANSITO",
    sub_units: &[
      leaf("TRANSITO_COMISARIA", "COMISARIA"),
      leaf("TRANSITO_ACCIDENTES", "DIVISION ACCIDENTES Y ESPECIALES"),
    ],
  },
  leaf("BOMBEROS", "BOMBEROS"),
  leaf("UTOP", "UTOP"),
  leaf("DELTA", "DELTA"),
  leaf("PAC", "PAC"),
  leaf("RADIO_PATRULLAS_110", "RADIO PATRULLAS 110"),
  leaf("UTEPII", "UTEPII"),
  leaf("PATRULLA_CAMINERA", "PATRULLA CAMINERA"),
  leaf("POLICIA_RURAL", "POLICÍA RURAL Y FRONTERIZA"),
  leaf("BSFE_1", "BSFE N° 1"),
  leaf("BSFE_2", "BSFE N° 2"),
  leaf("CONCILIACION", "CONCILIACIÓN CIUDADANA"),
  leaf("INTELIGENCIA", "INTELIGENCIA"),
  leaf("EPI_SAN_ROQUE", "EPI DE SAN ROQUE"),
  leaf("EPI_VILLA_ARMONIA", "EPI DE VILLA ARMONÍA"),
  leaf("EPI_PATACON", "EPI DE PATACÓN"),
  leaf("RECAUDACIONES", "RECAUDACIONES, GARAJE"),
  leaf("RECINTO_PENITENCIARIO", "RECINTO PENITENCIARIO \"SAN ROQUE\""),
  leaf("COMANDO_DEPARTAMENTAL", "COMANDO DEPARTAMENTAL"),
  leaf("FATESCIPOL", "FATESCIPOL"),
];

/// Whether `name` designates the penal facility.
pub fn is_penal_facility_name(name: &str) -> bool {
  PENAL_MARKERS.iter().any(|m| name.contains(m))
}

/// Every inspectable unit: leaves, plus sub-units in place of their parent.
pub fn inspectable_units() -> impl Iterator<Item = &'static Unit> {
  UNITS.iter().flat_map(|u| {
    if u.sub_units.is_empty() {
      std::slice::from_ref(u).iter()
    } else {
      u.sub_units.iter()
    }
  })
}
