//! Helpers between JSON documents and the plain-text columns stored in
//! SQLite.
//!
//! Timestamps are RFC 3339 strings and UUIDs hyphenated lowercase strings.
//! The JSON manipulation used by partial updates and array edits lives
//! here so it can run inside a single `conn.call` transaction.

use chrono::{DateTime, Utc};
use serde_json::Value;
use turno_core::store::{Filter, FilterOp};
use uuid::Uuid;

use crate::{Error, Result};

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Updates ─────────────────────────────────────────────────────────────────

/// Shallow merge: every top-level key of `partial` replaces the one in `doc`.
pub fn merge(id: Uuid, doc: &mut Value, partial: Value) -> Result<()> {
  let Value::Object(fields) = partial else {
    return Err(Error::NotAnObject(id));
  };
  let target = doc.as_object_mut().ok_or(Error::NotAnObject(id))?;
  target.extend(fields);
  Ok(())
}

/// Push `value` onto the array at `field`, creating it when absent or null.
pub fn append(id: Uuid, doc: &mut Value, field: &str, value: Value) -> Result<()> {
  let target = doc.as_object_mut().ok_or(Error::NotAnObject(id))?;
  let slot = target.entry(field).or_insert(Value::Null);
  if slot.is_null() {
    *slot = Value::Array(Vec::new());
  }
  match slot {
    Value::Array(items) => {
      items.push(value);
      Ok(())
    }
    _ => Err(Error::NotAnArray { id, field: field.to_string() }),
  }
}

/// Overwrite the element of the array at `field` whose `key` matches the one
/// carried by `value`. Other elements are left untouched.
pub fn replace_element(
  id: Uuid,
  doc: &mut Value,
  field: &str,
  key: &str,
  value: Value,
) -> Result<()> {
  let not_found = |wanted: &Value| Error::ElementNotFound {
    id,
    field: field.to_string(),
    key: key.to_string(),
    value: wanted.to_string(),
  };
  let wanted = match value.get(key) {
    Some(v) if !v.is_null() => v.clone(),
    _ => return Err(not_found(&Value::Null)),
  };

  let target = doc.as_object_mut().ok_or(Error::NotAnObject(id))?;
  let Some(Value::Array(items)) = target.get_mut(field) else {
    return Err(Error::NotAnArray { id, field: field.to_string() });
  };
  let slot = items
    .iter_mut()
    .find(|item| item.get(key) == Some(&wanted))
    .ok_or_else(|| not_found(&wanted))?;
  *slot = value;
  Ok(())
}

// ─── Query push-down ─────────────────────────────────────────────────────────

/// String equality filters can be evaluated by SQLite through `json_extract`;
/// returns the JSON path and the expected text. Everything else is left to
/// [`turno_core::store::DocumentQuery::matches`].
pub fn pushdown(filter: &Filter) -> Option<(String, String)> {
  match (&filter.op, &filter.value) {
    (FilterOp::Eq, Value::String(s)) => Some((format!("$.{}", filter.field), s.clone())),
    _ => None,
  }
}
