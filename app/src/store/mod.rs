// storelink/app/src/store/mod.rs

//! Document persistence keyed by upstream ids.
//!
//! Each collection holds one JSON document per external id. Writes merge the
//! top-level fields of a patch into the stored document, so fields a patch
//! does not carry keep their stored value. `createdAt` and `updatedAt` are
//! maintained by the backend and added to every document it returns.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{OrderFilter, Repository};

use crate::errors::Result as AppResult;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

pub type Document = serde_json::Map<String, JsonValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  Orders,
  Products,
  Vendors,
}

impl Collection {
  pub const ALL: [Collection; 3] = [Collection::Orders, Collection::Products, Collection::Vendors];

  pub fn as_str(&self) -> &'static str {
    match self {
      Collection::Orders => "orders",
      Collection::Products => "products",
      Collection::Vendors => "vendors",
    }
  }

  /// Document field that carries the external id.
  pub fn key_field(&self) -> &'static str {
    match self {
      Collection::Orders => "orderId",
      Collection::Products => "wooId",
      Collection::Vendors => "id",
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
  pub document: JsonValue,
  pub inserted: bool,
  pub modified: bool,
}

/// Counts for a grouped upsert. `upserted_ids` lists the ids that did not exist before.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkWriteResult {
  pub matched: u64,
  pub modified: u64,
  pub upserted: u64,
  pub upserted_ids: BTreeSet<i64>,
}

impl BulkWriteResult {
  pub fn record(&mut self, id: i64, outcome: &UpsertOutcome) {
    if outcome.inserted {
      self.upserted += 1;
      self.upserted_ids.insert(id);
    } else {
      self.matched += 1;
      if outcome.modified {
        self.modified += 1;
      }
    }
  }
}

/// Top-level equality filter.
#[derive(Debug, Clone, Default)]
pub struct DocFilter {
  pub equals: Document,
}

impl DocFilter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn field(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
    self.equals.insert(name.to_string(), value.into());
    self
  }

  pub fn matches(&self, doc: &Document) -> bool {
    self.equals.iter().all(|(k, v)| doc.get(k) == Some(v))
  }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
  fn backend_name(&self) -> &'static str;

  async fn find_one(&self, collection: Collection, id: i64) -> AppResult<Option<JsonValue>>;

  /// Newest first.
  async fn find_all(&self, collection: Collection, filter: &DocFilter) -> AppResult<Vec<JsonValue>>;

  /// Merges `patch` into the document for `id`, creating it when absent. Atomic per id.
  async fn upsert_one(&self, collection: Collection, id: i64, patch: Document) -> AppResult<UpsertOutcome>;

  /// Like `upsert_one` but never creates; `None` when `id` is unknown.
  async fn update_one(&self, collection: Collection, id: i64, patch: Document) -> AppResult<Option<JsonValue>>;

  async fn delete_one(&self, collection: Collection, id: i64) -> AppResult<bool>;

  /// Applies all writes as one unit, in order.
  async fn bulk_upsert(&self, collection: Collection, writes: Vec<(i64, Document)>) -> AppResult<BulkWriteResult>;

  async fn health_check(&self) -> AppResult<()>;
}
