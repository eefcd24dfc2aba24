//! Shift and profile operations over any [`DocumentStore`].
//!
//! Every operation is one or two single-record store calls guarded by a role
//! check against the calling [`Profile`]. Nothing here holds locks across
//! calls; "one open shift per supervisor" is a read-time filter only.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use turno_core::{
  clock::Clock,
  extraordinary::{ExtraordinaryClosing, ExtraordinaryOpening},
  facility::{CheckPayload, FacilityCheck, PersonnelSummary},
  profile::{Credential, NewProfile, Profile, Role},
  shift::{ClosingInput, Officer, Shift, ShiftClosing, ShiftOpening, ShiftState},
  store::{Collection, Direction, DocumentQuery, DocumentStore, FilterOp, StoredDocument},
};
use turno_report::{ReportOptions, Synthesizer};
use uuid::Uuid;

use crate::error::{Result, ServiceError};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Body of an open-shift request. The incoming supervisor defaults to the
/// caller and the start time to now.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenShift {
  pub memorandum: String,
  pub outgoing:   Officer,
  #[serde(default)]
  pub incoming:   Option<Officer>,
  #[serde(default)]
  pub started_at: Option<DateTime<Utc>>,
}

/// A facility check as submitted; the id is assigned on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFacilityCheck {
  pub facility:   String,
  pub checked_at: NaiveDateTime,
  pub personnel:  PersonnelSummary,
  pub payload:    CheckPayload,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct Service<S> {
  store:       Arc<S>,
  clock:       Arc<dyn Clock>,
  synthesizer: Synthesizer<Arc<dyn Clock>>,
}

impl<S> Service<S>
where
  S: DocumentStore,
{
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, options: ReportOptions) -> Self {
    let synthesizer = Synthesizer::new(clock.clone(), options);
    Self { store, clock, synthesizer }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn synthesizer(&self) -> &Synthesizer<Arc<dyn Clock>> { &self.synthesizer }

  pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

  // ─── Shifts ────────────────────────────────────────────────────────────────

  /// Open a shift for `caller`. Fails with `Conflict` if the caller already
  /// has one open.
  pub async fn open_shift(&self, caller: &Profile, input: OpenShift) -> Result<Shift> {
    if input.memorandum.trim().is_empty() {
      return Err(ServiceError::BadRequest("memorandum is required".into()));
    }
    if let Some(open) = self.active_shift(caller).await? {
      return Err(ServiceError::Conflict(format!(
        "supervisor already has open shift {}",
        open.shift_id
      )));
    }

    let now = self.now();
    let opening = ShiftOpening {
      memorandum: input.memorandum.trim().to_string(),
      started_at: input.started_at.unwrap_or(now),
      outgoing:   input.outgoing,
      incoming:   input.incoming.unwrap_or_else(|| caller.officer()),
    };
    let shift = Shift::open(caller.profile_id, opening, now);
    self.put(Collection::Shifts, shift.shift_id, &shift).await?;

    info!(shift_id = %shift.shift_id, supervisor = %caller.email, "shift opened");
    Ok(shift)
  }

  /// The caller's newest open shift, if any.
  pub async fn active_shift(&self, caller: &Profile) -> Result<Option<Shift>> {
    let query = DocumentQuery::new()
      .eq("supervisor_id", caller.profile_id.to_string())
      .eq("state", ShiftState::Open.as_ref())
      .order_by("created_at", Direction::Desc)
      .limit(1);
    let mut shifts: Vec<Shift> = self.query(Collection::Shifts, &query).await?;
    Ok(shifts.pop())
  }

  /// Admins see every shift, supervisors their own. Newest first.
  pub async fn list_shifts(&self, caller: &Profile) -> Result<Vec<Shift>> {
    let mut query = DocumentQuery::new().order_by("created_at", Direction::Desc);
    if !caller.is_admin() {
      query = query.eq("supervisor_id", caller.profile_id.to_string());
    }
    self.query(Collection::Shifts, &query).await
  }

  pub async fn get_shift(&self, caller: &Profile, id: Uuid) -> Result<Shift> {
    let shift = self.load_shift(id).await?;
    authorize(caller, &shift)?;
    Ok(shift)
  }

  /// Append a facility check to an open shift.
  pub async fn add_facility_check(
    &self,
    caller: &Profile,
    id: Uuid,
    input: NewFacilityCheck,
  ) -> Result<FacilityCheck> {
    if input.facility.trim().is_empty() {
      return Err(ServiceError::BadRequest("facility is required".into()));
    }
    let mut shift = self.get_shift(caller, id).await?;
    let entry = FacilityCheck::new(input.facility, input.checked_at, input.personnel, input.payload);
    shift.add_facility_check(entry.clone())?;

    self
      .store
      .append_to_array_field(Collection::Shifts, id, "facility_checks", serde_json::to_value(&entry)?)
      .await
      .map_err(ServiceError::store)?;

    debug!(shift_id = %id, facility = %entry.facility, "facility check added");
    Ok(entry)
  }

  /// Start an extraordinary service on an open shift and return its id.
  pub async fn open_extraordinary(
    &self,
    caller: &Profile,
    id: Uuid,
    opening: ExtraordinaryOpening,
  ) -> Result<Uuid> {
    if opening.name.trim().is_empty() {
      return Err(ServiceError::BadRequest("operation name is required".into()));
    }
    let mut shift = self.get_shift(caller, id).await?;
    let service_id = shift.open_extraordinary(opening)?;
    let entry = shift
      .extraordinary_services
      .iter()
      .find(|s| s.service_id == service_id)
      .ok_or(turno_core::Error::ExtraordinaryNotFound(service_id))?;

    self
      .store
      .append_to_array_field(
        Collection::Shifts,
        id,
        "extraordinary_services",
        serde_json::to_value(entry)?,
      )
      .await
      .map_err(ServiceError::store)?;

    debug!(shift_id = %id, %service_id, "extraordinary service opened");
    Ok(service_id)
  }

  /// Close one extraordinary service. The whole list is written back.
  pub async fn close_extraordinary(
    &self,
    caller: &Profile,
    id: Uuid,
    service_id: Uuid,
    closing: ExtraordinaryClosing,
  ) -> Result<Shift> {
    let mut shift = self.get_shift(caller, id).await?;
    shift.close_extraordinary(service_id, closing)?;
    let entry = shift
      .extraordinary_services
      .iter()
      .find(|s| s.service_id == service_id)
      .ok_or(turno_core::Error::ExtraordinaryNotFound(service_id))?;

    // Only the closed entry is written back; services appended since the
    // read above stay in the stored array.
    self
      .store
      .replace_array_element(
        Collection::Shifts,
        id,
        "extraordinary_services",
        "service_id",
        serde_json::to_value(entry)?,
      )
      .await
      .map_err(ServiceError::store)?;

    debug!(shift_id = %id, %service_id, "extraordinary service closed");
    self.get_shift(caller, id).await
  }

  /// Render the report and close the shift in a single update.
  pub async fn close_shift(&self, caller: &Profile, id: Uuid, input: ClosingInput) -> Result<Shift> {
    let mut shift = self.get_shift(caller, id).await?;
    if !shift.is_open() {
      return Err(turno_core::Error::AlreadyClosed(id).into());
    }

    let template = self.synthesizer.options().template;
    let report = self.synthesizer.render(&shift, &input);
    let closing = ShiftClosing::new(input, self.now(), report, template.as_ref());
    shift.close(closing)?;

    self
      .update(
        Collection::Shifts,
        id,
        json!({ "state": shift.state, "closing": shift.closing }),
      )
      .await?;

    info!(shift_id = %id, %template, "shift closed");
    Ok(shift)
  }

  /// Render the report without writing anything.
  pub async fn preview_report(&self, caller: &Profile, id: Uuid, input: &ClosingInput) -> Result<String> {
    let shift = self.get_shift(caller, id).await?;
    Ok(self.synthesizer.render(&shift, input))
  }

  /// The report saved when the shift closed.
  pub async fn stored_report(&self, caller: &Profile, id: Uuid) -> Result<String> {
    let shift = self.get_shift(caller, id).await?;
    turno_report::stored_report(&shift)
      .map(str::to_string)
      .ok_or_else(|| ServiceError::Conflict(format!("shift {id} is still open")))
  }

  pub async fn delete_shift(&self, caller: &Profile, id: Uuid) -> Result<()> {
    require_admin(caller)?;
    let existed = self
      .store
      .delete_document(Collection::Shifts, id)
      .await
      .map_err(ServiceError::store)?;
    if !existed {
      return Err(ServiceError::NotFound(format!("shift {id}")));
    }
    info!(shift_id = %id, admin = %caller.email, "shift deleted");
    Ok(())
  }

  /// Delete every shift whose retention period ended before `now`. Returns
  /// how many were removed.
  pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
    let query = DocumentQuery::new().filter("expires_at", FilterOp::Lt, now.to_rfc3339());
    let expired = self
      .store
      .query_documents(Collection::Shifts, &query)
      .await
      .map_err(ServiceError::store)?;

    let mut removed = 0;
    for doc in expired {
      if self
        .store
        .delete_document(Collection::Shifts, doc.id)
        .await
        .map_err(ServiceError::store)?
      {
        removed += 1;
      }
    }
    if removed > 0 {
      info!(removed, "purged expired shifts");
    }
    Ok(removed)
  }

  // ─── Profiles ──────────────────────────────────────────────────────────────

  /// Create the first administrator. Refused once any admin exists.
  pub async fn bootstrap_admin(&self, input: NewProfile) -> Result<Profile> {
    let query = DocumentQuery::new().eq("role", Role::Admin.as_ref()).limit(1);
    let admins = self
      .store
      .query_documents(Collection::Profiles, &query)
      .await
      .map_err(ServiceError::store)?;
    if !admins.is_empty() {
      return Err(ServiceError::Conflict("an administrator already exists".into()));
    }
    self.create_profile(input, Role::Admin).await
  }

  pub async fn create_supervisor(&self, caller: &Profile, input: NewProfile) -> Result<Profile> {
    require_admin(caller)?;
    self.create_profile(input, Role::Supervisor).await
  }

  /// Admins may read any profile, everyone else only their own.
  pub async fn get_profile(&self, caller: &Profile, id: Uuid) -> Result<Profile> {
    if !caller.is_admin() && caller.profile_id != id {
      return Err(ServiceError::Forbidden("not your profile".into()));
    }
    self
      .load(Collection::Profiles, id)
      .await?
      .ok_or_else(|| ServiceError::NotFound(format!("profile {id}")))
  }

  pub async fn list_supervisors(&self, caller: &Profile) -> Result<Vec<Profile>> {
    require_admin(caller)?;
    let query = DocumentQuery::new()
      .eq("role", Role::Supervisor.as_ref())
      .order_by("created_at", Direction::Desc);
    self.query(Collection::Profiles, &query).await
  }

  /// Check an email and password against the stored credential.
  pub async fn authenticate(&self, email: &str, password: &str) -> Result<Profile> {
    let query = DocumentQuery::new().eq("email", normalise_email(email)).limit(1);
    let mut creds: Vec<Credential> = self.query(Collection::Credentials, &query).await?;
    let cred = creds.pop().ok_or(ServiceError::Unauthorized)?;

    let parsed = PasswordHash::new(&cred.password_hash).map_err(|_| ServiceError::Unauthorized)?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .map_err(|_| ServiceError::Unauthorized)?;

    let profile: Profile = self
      .load(Collection::Profiles, cred.profile_id)
      .await?
      .ok_or(ServiceError::Unauthorized)?;
    if !profile.active {
      warn!(email = %profile.email, "inactive profile tried to sign in");
      return Err(ServiceError::Forbidden("profile is inactive".into()));
    }
    Ok(profile)
  }

  async fn create_profile(&self, input: NewProfile, role: Role) -> Result<Profile> {
    let email = normalise_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
      return Err(ServiceError::BadRequest("email and password are required".into()));
    }

    let taken = DocumentQuery::new().eq("email", email.as_str()).limit(1);
    let existing = self
      .store
      .query_documents(Collection::Credentials, &taken)
      .await
      .map_err(ServiceError::store)?;
    if !existing.is_empty() {
      return Err(ServiceError::Conflict(format!("email {email} is already registered")));
    }

    let profile = Profile {
      profile_id: Uuid::new_v4(),
      email:      email.clone(),
      role,
      grade:      input.grade.trim().to_string(),
      full_name:  input.full_name.trim().to_string(),
      phone:      input.phone.filter(|p| !p.trim().is_empty()),
      active:     true,
      created_at: self.now(),
    };
    let credential = Credential {
      profile_id:    profile.profile_id,
      email,
      password_hash: hash_password(&input.password)?,
    };

    self.put(Collection::Profiles, profile.profile_id, &profile).await?;
    self
      .store
      .create_document(Collection::Credentials, serde_json::to_value(&credential)?)
      .await
      .map_err(ServiceError::store)?;

    info!(profile_id = %profile.profile_id, %role, "profile created");
    Ok(profile)
  }

  // ─── Store helpers ─────────────────────────────────────────────────────────

  async fn load_shift(&self, id: Uuid) -> Result<Shift> {
    self
      .load(Collection::Shifts, id)
      .await?
      .ok_or_else(|| ServiceError::NotFound(format!("shift {id}")))
  }

  async fn load<T: DeserializeOwned>(&self, collection: Collection, id: Uuid) -> Result<Option<T>> {
    let doc = self
      .store
      .get_document(collection, id)
      .await
      .map_err(ServiceError::store)?;
    doc.map(decode).transpose()
  }

  async fn query<T: DeserializeOwned>(
    &self,
    collection: Collection,
    query: &DocumentQuery,
  ) -> Result<Vec<T>> {
    self
      .store
      .query_documents(collection, query)
      .await
      .map_err(ServiceError::store)?
      .into_iter()
      .map(decode)
      .collect()
  }

  async fn put<T: Serialize>(&self, collection: Collection, id: Uuid, value: &T) -> Result<()> {
    self
      .store
      .put_document(collection, id, serde_json::to_value(value)?)
      .await
      .map_err(ServiceError::store)
  }

  async fn update(&self, collection: Collection, id: Uuid, partial: Value) -> Result<()> {
    self
      .store
      .update_document(collection, id, partial)
      .await
      .map_err(ServiceError::store)
  }
}

fn decode<T: DeserializeOwned>(doc: StoredDocument) -> Result<T> {
  Ok(serde_json::from_value(doc.data)?)
}

fn authorize(caller: &Profile, shift: &Shift) -> Result<()> {
  if caller.is_admin() || caller.profile_id == shift.supervisor_id {
    Ok(())
  } else {
    Err(ServiceError::Forbidden(format!("shift {} belongs to another supervisor", shift.shift_id)))
  }
}

fn require_admin(caller: &Profile) -> Result<()> {
  if caller.is_admin() {
    Ok(())
  } else {
    Err(ServiceError::Forbidden("administrator role required".into()))
  }
}

fn normalise_email(email: &str) -> String { email.trim().to_lowercase() }

/// Argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ServiceError::Password(e.to_string()))
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, NaiveDate, TimeZone};
  use turno_core::{
    clock::FixedClock,
    extraordinary::ServiceState,
    facility::{NoveltyStatus, PenalCheck, RoutineCheck},
  };
  use turno_store_sqlite::SqliteStore;

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap() }

  async fn service() -> Service<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Service::new(Arc::new(store), Arc::new(FixedClock(now())), ReportOptions::default())
  }

  fn new_profile(email: &str, name: &str) -> NewProfile {
    NewProfile {
      email:     email.into(),
      password:  "clave-segura".into(),
      grade:     "Tcnl.".into(),
      full_name: name.into(),
      phone:     None,
    }
  }

  async fn admin_and_supervisor(svc: &Service<SqliteStore>) -> (Profile, Profile) {
    let admin = svc.bootstrap_admin(new_profile("jefe@policia.bo", "Ana Rojas")).await.unwrap();
    let sup = svc
      .create_supervisor(&admin, new_profile("Perez@Policia.bo ", "Juan Perez"))
      .await
      .unwrap();
    (admin, sup)
  }

  fn open_input() -> OpenShift {
    OpenShift {
      memorandum: "045/2025".into(),
      outgoing:   Officer::new("Tcnl.", "Luis Gomez"),
      incoming:   None,
      started_at: None,
    }
  }

  fn closing_input() -> ClosingInput {
    ClosingInput { handed_to: "Tcnl. Ruiz".into(), routine_cases: 3, relevant_cases: 1 }
  }

  fn check(facility: &str) -> NewFacilityCheck {
    NewFacilityCheck {
      facility:   facility.into(),
      checked_at: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap().and_hms_opt(9, 30, 0).unwrap(),
      personnel:  PersonnelSummary { present: 8, ..Default::default() },
      payload:    CheckPayload::Routine(RoutineCheck { routine_cases: 2, relevant: vec![] }),
    }
  }

  // ─── Profiles ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bootstrap_only_once() {
    let svc = service().await;
    svc.bootstrap_admin(new_profile("jefe@policia.bo", "Ana Rojas")).await.unwrap();
    let err = svc.bootstrap_admin(new_profile("otro@policia.bo", "Otro")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
  }

  #[tokio::test]
  async fn supervisors_need_an_admin_and_a_fresh_email() {
    let svc = service().await;
    let (admin, sup) = admin_and_supervisor(&svc).await;
    assert_eq!(sup.email, "perez@policia.bo");
    assert_eq!(sup.role, Role::Supervisor);

    let err = svc.create_supervisor(&sup, new_profile("x@policia.bo", "X")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = svc
      .create_supervisor(&admin, new_profile("perez@policia.bo", "Duplicado"))
      .await
      .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let listed = svc.list_supervisors(&admin).await.unwrap();
    assert_eq!(listed, [sup]);
  }

  #[tokio::test]
  async fn authenticate_checks_password_and_activity() {
    let svc = service().await;
    let (_, sup) = admin_and_supervisor(&svc).await;

    let found = svc.authenticate("PEREZ@policia.bo", "clave-segura").await.unwrap();
    assert_eq!(found.profile_id, sup.profile_id);

    let err = svc.authenticate("perez@policia.bo", "otra").await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));
    let err = svc.authenticate("nadie@policia.bo", "clave-segura").await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));

    svc
      .store()
      .update_document(Collection::Profiles, sup.profile_id, json!({ "active": false }))
      .await
      .unwrap();
    let err = svc.authenticate("perez@policia.bo", "clave-segura").await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
  }

  // ─── Shifts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn one_open_shift_per_supervisor() {
    let svc = service().await;
    let (_, sup) = admin_and_supervisor(&svc).await;

    let shift = svc.open_shift(&sup, open_input()).await.unwrap();
    assert_eq!(shift.opening.incoming, Officer::new("Tcnl.", "Juan Perez"));
    assert_eq!(shift.expires_at, now() + Duration::days(7));

    let err = svc.open_shift(&sup, open_input()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let active = svc.active_shift(&sup).await.unwrap().unwrap();
    assert_eq!(active.shift_id, shift.shift_id);
  }

  #[tokio::test]
  async fn supervisors_cannot_read_other_shifts() {
    let svc = service().await;
    let (admin, sup) = admin_and_supervisor(&svc).await;
    let other = svc
      .create_supervisor(&admin, new_profile("mamani@policia.bo", "David Mamani"))
      .await
      .unwrap();

    let shift = svc.open_shift(&sup, open_input()).await.unwrap();
    let err = svc.get_shift(&other, shift.shift_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert!(svc.list_shifts(&other).await.unwrap().is_empty());

    assert_eq!(svc.get_shift(&admin, shift.shift_id).await.unwrap(), shift);
    assert_eq!(svc.list_shifts(&admin).await.unwrap().len(), 1);

    let err = svc.get_shift(&admin, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
  }

  #[tokio::test]
  async fn entries_are_appended_in_order() {
    let svc = service().await;
    let (_, sup) = admin_and_supervisor(&svc).await;
    let shift = svc.open_shift(&sup, open_input()).await.unwrap();

    svc.add_facility_check(&sup, shift.shift_id, check("FELCC CENTRAL")).await.unwrap();
    let mut penal = check("CENTRO PENITENCIARIO SAN ROQUE");
    penal.payload = CheckPayload::Penal(PenalCheck { male: 410, female: 35, ..Default::default() });
    svc.add_facility_check(&sup, shift.shift_id, penal).await.unwrap();

    let stored = svc.get_shift(&sup, shift.shift_id).await.unwrap();
    let names: Vec<_> = stored.facility_checks.iter().map(|c| c.facility.as_str()).collect();
    assert_eq!(names, ["FELCC CENTRAL", "CENTRO PENITENCIARIO SAN ROQUE"]);
    assert!(stored.facility_checks[1].is_penal());
  }

  #[tokio::test]
  async fn extraordinary_service_lifecycle() {
    let svc = service().await;
    let (_, sup) = admin_and_supervisor(&svc).await;
    let shift = svc.open_shift(&sup, open_input()).await.unwrap();

    let opening = ExtraordinaryOpening {
      name: "Partido Universitario - Capacho".into(),
      planned_personnel: 22,
      opened_at: now(),
      ..Default::default()
    };
    let service_id = svc.open_extraordinary(&sup, shift.shift_id, opening).await.unwrap();

    let closing = ExtraordinaryClosing {
      closed_at:   now() + Duration::hours(3),
      absent:      vec![],
      late:        vec![],
      novelty:     NoveltyStatus::None,
      cases:       vec![],
      observation: None,
    };
    let updated = svc
      .close_extraordinary(&sup, shift.shift_id, service_id, closing.clone())
      .await
      .unwrap();
    assert_eq!(updated.extraordinary_services[0].state, ServiceState::Closed);

    let stored = svc.get_shift(&sup, shift.shift_id).await.unwrap();
    assert_eq!(stored.extraordinary_services, updated.extraordinary_services);

    let err = svc
      .close_extraordinary(&sup, shift.shift_id, service_id, closing.clone())
      .await
      .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(turno_core::Error::ExtraordinaryAlreadyClosed(_))));

    let err = svc
      .close_extraordinary(&sup, shift.shift_id, Uuid::new_v4(), closing)
      .await
      .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(turno_core::Error::ExtraordinaryNotFound(_))));
  }

  #[tokio::test]
  async fn closing_one_service_keeps_its_siblings() {
    let svc = service().await;
    let (_, sup) = admin_and_supervisor(&svc).await;
    let shift = svc.open_shift(&sup, open_input()).await.unwrap();

    let open = |name: &str| ExtraordinaryOpening {
      name: name.into(),
      opened_at: now(),
      ..Default::default()
    };
    let first = svc
      .open_extraordinary(&sup, shift.shift_id, open("Custodia de valores"))
      .await
      .unwrap();
    let second = svc
      .open_extraordinary(&sup, shift.shift_id, open("Control de feria"))
      .await
      .unwrap();

    let closing = ExtraordinaryClosing {
      closed_at:   now() + Duration::hours(1),
      absent:      vec![],
      late:        vec![],
      novelty:     NoveltyStatus::None,
      cases:       vec![],
      observation: None,
    };
    let updated = svc
      .close_extraordinary(&sup, shift.shift_id, first, closing)
      .await
      .unwrap();

    let ids: Vec<_> = updated.extraordinary_services.iter().map(|s| s.service_id).collect();
    assert_eq!(ids, [first, second]);
    assert_eq!(updated.extraordinary_services[0].state, ServiceState::Closed);
    assert_eq!(updated.extraordinary_services[1].state, ServiceState::Open);
    assert!(updated.extraordinary_services[1].closing.is_none());
  }

  #[tokio::test]
  async fn closing_stores_the_report_once() {
    let svc = service().await;
    let (_, sup) = admin_and_supervisor(&svc).await;
    let shift = svc.open_shift(&sup, open_input()).await.unwrap();
    svc.add_facility_check(&sup, shift.shift_id, check("POFOMA")).await.unwrap();

    let preview = svc.preview_report(&sup, shift.shift_id, &closing_input()).await.unwrap();
    let err = svc.stored_report(&sup, shift.shift_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let closed = svc.close_shift(&sup, shift.shift_id, closing_input()).await.unwrap();
    assert_eq!(closed.state, ShiftState::Closed);
    let closing = closed.closing.as_ref().unwrap();
    assert_eq!(closing.report, preview);
    assert_eq!(closing.report_version.as_deref(), Some("memorandum"));
    assert_eq!(svc.stored_report(&sup, shift.shift_id).await.unwrap(), preview);
    assert!(svc.active_shift(&sup).await.unwrap().is_none());

    let err = svc.close_shift(&sup, shift.shift_id, closing_input()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(turno_core::Error::AlreadyClosed(_))));

    let err = svc.add_facility_check(&sup, shift.shift_id, check("DELTA")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(turno_core::Error::ShiftClosed(_))));
  }

  #[tokio::test]
  async fn delete_is_admin_only() {
    let svc = service().await;
    let (admin, sup) = admin_and_supervisor(&svc).await;
    let shift = svc.open_shift(&sup, open_input()).await.unwrap();

    let err = svc.delete_shift(&sup, shift.shift_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    svc.delete_shift(&admin, shift.shift_id).await.unwrap();
    let err = svc.delete_shift(&admin, shift.shift_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
  }

  #[tokio::test]
  async fn purge_removes_only_expired_shifts() {
    let svc = service().await;
    let (admin, sup) = admin_and_supervisor(&svc).await;
    let old = svc.open_shift(&sup, open_input()).await.unwrap();

    let recent = Shift::open(admin.profile_id, old.opening.clone(), now() + Duration::days(3));
    svc.put(Collection::Shifts, recent.shift_id, &recent).await.unwrap();

    assert_eq!(svc.purge_expired(now() + Duration::days(6)).await.unwrap(), 0);
    assert_eq!(svc.purge_expired(now() + Duration::days(8)).await.unwrap(), 1);

    let left = svc.list_shifts(&admin).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].shift_id, recent.shift_id);
  }
}
