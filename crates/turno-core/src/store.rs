//! The `DocumentStore` trait and supporting query types.
//!
//! Records are schemaless JSON documents grouped in named collections. The
//! trait is implemented by storage backends (e.g. `turno-store-sqlite`);
//! services depend on this abstraction, not on any concrete backend.

use std::{cmp::Ordering, future::Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ─── Collections ─────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  strum::AsRefStr, strum::Display, strum::EnumString,
)]
pub enum Collection {
  /// Shifts, with their facility checks and extraordinary services embedded.
  #[strum(serialize = "servicios_supervisor")]
  #[serde(rename = "servicios_supervisor")]
  Shifts,
  /// User profiles keyed by profile id.
  #[strum(serialize = "users")]
  #[serde(rename = "users")]
  Profiles,
  #[strum(serialize = "credentials")]
  #[serde(rename = "credentials")]
  Credentials,
}

// ─── Query types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

/// A single predicate on a (dot-separated) field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
  pub field: String,
  pub op:    FilterOp,
  pub value: Value,
}

impl Filter {
  pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
    Self { field: field.into(), op, value: value.into() }
  }

  /// Whether `doc` satisfies this predicate. A missing field only satisfies
  /// [`FilterOp::Ne`].
  pub fn matches(&self, doc: &Value) -> bool {
    let Some(actual) = lookup(doc, &self.field) else {
      return self.op == FilterOp::Ne;
    };
    match self.op {
      FilterOp::Eq => actual == &self.value,
      FilterOp::Ne => actual != &self.value,
      FilterOp::Lt => compare(actual, &self.value).is_some_and(Ordering::is_lt),
      FilterOp::Le => compare(actual, &self.value).is_some_and(Ordering::is_le),
      FilterOp::Gt => compare(actual, &self.value).is_some_and(Ordering::is_gt),
      FilterOp::Ge => compare(actual, &self.value).is_some_and(Ordering::is_ge),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  #[default]
  Asc,
  Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
  pub field:     String,
  pub direction: Direction,
}

/// Parameters for [`DocumentStore::query_documents`]. All filters must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
  pub filters:  Vec<Filter>,
  pub order_by: Option<OrderBy>,
  pub limit:    Option<usize>,
}

impl DocumentQuery {
  pub fn new() -> Self { Self::default() }

  pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
    self.filters.push(Filter::new(field, op, value));
    self
  }

  pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filter(field, FilterOp::Eq, value)
  }

  pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
    self.order_by = Some(OrderBy { field: field.into(), direction });
    self
  }

  pub fn limit(mut self, n: usize) -> Self {
    self.limit = Some(n);
    self
  }

  pub fn matches(&self, doc: &Value) -> bool { self.filters.iter().all(|f| f.matches(doc)) }

  /// Sort `docs` by the query's ordering, then apply the limit. Documents
  /// lacking the order field sort last.
  pub fn sort_and_limit(&self, docs: &mut Vec<StoredDocument>) {
    if let Some(order) = &self.order_by {
      docs.sort_by(|a, b| {
        let ord = match (lookup(&a.data, &order.field), lookup(&b.data, &order.field)) {
          (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
          (Some(_), None) => return Ordering::Less,
          (None, Some(_)) => return Ordering::Greater,
          (None, None) => Ordering::Equal,
        };
        match order.direction {
          Direction::Asc => ord,
          Direction::Desc => ord.reverse(),
        }
      });
    }
    if let Some(n) = self.limit {
      docs.truncate(n);
    }
  }
}

/// Resolve a dot-separated path inside a JSON document.
pub fn lookup<'v>(doc: &'v Value, path: &str) -> Option<&'v Value> {
  path.split('.').try_fold(doc, |v, key| v.get(key))
}

/// Order two JSON scalars: numbers numerically, RFC 3339 timestamps
/// chronologically, other strings lexically, booleans false-first.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
    (Value::String(x), Value::String(y)) => {
      match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
        (Ok(x), Ok(y)) => Some(x.cmp(&y)),
        _ => Some(x.cmp(y)),
      }
    }
    (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
    _ => None,
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
  pub id:   Uuid,
  pub data: Value,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a JSON document store backend.
///
/// Each method is a single-record operation; no cross-call transactions are
/// offered. All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new document under a store-generated id.
  fn create_document(
    &self,
    collection: Collection,
    data: Value,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Create or replace the document stored under `id`.
  fn put_document(
    &self,
    collection: Collection,
    id: Uuid,
    data: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Shallow-merge the top-level fields of `partial` into an existing
  /// document. Fails if the document does not exist.
  fn update_document(
    &self,
    collection: Collection,
    id: Uuid,
    partial: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a document by id. Returns `None` if not found.
  fn get_document(
    &self,
    collection: Collection,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StoredDocument>, Self::Error>> + Send + '_;

  /// All documents in `collection` matching `query`, ordered as requested.
  fn query_documents<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Vec<StoredDocument>, Self::Error>> + Send + 'a;

  /// Delete a document. Returns whether it existed.
  fn delete_document(
    &self,
    collection: Collection,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Append `value` to the array at top-level `field`, creating the array if
  /// absent. Fails if the document does not exist.
  fn append_to_array_field<'a>(
    &'a self,
    collection: Collection,
    id: Uuid,
    field: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace the element of the array at `field` whose `key` equals
  /// `value[key]`, leaving every other element as stored. Fails if the
  /// document or the element does not exist.
  fn replace_array_element<'a>(
    &'a self,
    collection: Collection,
    id: Uuid,
    field: &'a str,
    key: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
