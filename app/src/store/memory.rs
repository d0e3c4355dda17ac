// storelink/app/src/store/memory.rs

//! In-process backend. Used by tests and when no `DATABASE_URL` is configured.

use super::{BulkWriteResult, Collection, DocFilter, Document, DocumentStore, UpsertOutcome};
use crate::errors::Result as AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct StoredDoc {
  doc: Document,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl StoredDoc {
  fn render(&self) -> JsonValue {
    let mut doc = self.doc.clone();
    doc.insert("createdAt".to_string(), json!(self.created_at));
    doc.insert("updatedAt".to_string(), json!(self.updated_at));
    JsonValue::Object(doc)
  }

  /// Returns whether anything changed.
  fn merge(&mut self, patch: Document, now: DateTime<Utc>) -> bool {
    let mut changed = false;
    for (key, value) in patch {
      if self.doc.get(&key) != Some(&value) {
        self.doc.insert(key, value);
        changed = true;
      }
    }
    if changed {
      self.updated_at = now;
    }
    changed
  }
}

type Table = BTreeMap<i64, StoredDoc>;

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<HashMap<Collection, Table>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of documents in `collection`.
  pub fn count(&self, collection: Collection) -> usize {
    self.tables.lock().get(&collection).map_or(0, BTreeMap::len)
  }
}

fn upsert_locked(table: &mut Table, collection: Collection, id: i64, mut patch: Document) -> UpsertOutcome {
  let now = Utc::now();
  patch.insert(collection.key_field().to_string(), json!(id));

  match table.get_mut(&id) {
    Some(stored) => {
      let modified = stored.merge(patch, now);
      UpsertOutcome {
        document: stored.render(),
        inserted: false,
        modified,
      }
    }
    None => {
      let stored = StoredDoc {
        doc: patch,
        created_at: now,
        updated_at: now,
      };
      let document = stored.render();
      table.insert(id, stored);
      UpsertOutcome {
        document,
        inserted: true,
        modified: false,
      }
    }
  }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  fn backend_name(&self) -> &'static str {
    "memory"
  }

  async fn find_one(&self, collection: Collection, id: i64) -> AppResult<Option<JsonValue>> {
    Ok(self.tables.lock().get(&collection).and_then(|t| t.get(&id)).map(StoredDoc::render))
  }

  async fn find_all(&self, collection: Collection, filter: &DocFilter) -> AppResult<Vec<JsonValue>> {
    let tables = self.tables.lock();
    let mut hits: Vec<(&i64, &StoredDoc)> = tables
      .get(&collection)
      .map(|t| t.iter().filter(|(_, s)| filter.matches(&s.doc)).collect())
      .unwrap_or_default();
    hits.sort_by_key(|(id, s)| Reverse((s.created_at, **id)));
    Ok(hits.into_iter().map(|(_, s)| s.render()).collect())
  }

  async fn upsert_one(&self, collection: Collection, id: i64, patch: Document) -> AppResult<UpsertOutcome> {
    let mut tables = self.tables.lock();
    let table = tables.entry(collection).or_default();
    Ok(upsert_locked(table, collection, id, patch))
  }

  async fn update_one(&self, collection: Collection, id: i64, mut patch: Document) -> AppResult<Option<JsonValue>> {
    let mut tables = self.tables.lock();
    let Some(stored) = tables.get_mut(&collection).and_then(|t| t.get_mut(&id)) else {
      return Ok(None);
    };
    patch.insert(collection.key_field().to_string(), json!(id));
    stored.merge(patch, Utc::now());
    Ok(Some(stored.render()))
  }

  async fn delete_one(&self, collection: Collection, id: i64) -> AppResult<bool> {
    Ok(
      self
        .tables
        .lock()
        .get_mut(&collection)
        .map_or(false, |t| t.remove(&id).is_some()),
    )
  }

  async fn bulk_upsert(&self, collection: Collection, writes: Vec<(i64, Document)>) -> AppResult<BulkWriteResult> {
    let mut tables = self.tables.lock();
    let table = tables.entry(collection).or_default();
    let mut result = BulkWriteResult::default();
    for (id, patch) in writes {
      let outcome = upsert_locked(table, collection, id, patch);
      result.record(id, &outcome);
    }
    Ok(result)
  }

  async fn health_check(&self) -> AppResult<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn doc(value: JsonValue) -> Document {
    match value {
      JsonValue::Object(map) => map,
      _ => panic!("test document must be an object"),
    }
  }

  #[tokio::test]
  async fn upsert_inserts_then_merges() {
    let store = MemoryStore::new();
    let first = store
      .upsert_one(Collection::Orders, 1, doc(json!({"status": "pending", "total": "10"})))
      .await
      .unwrap();
    assert!(first.inserted);
    assert_eq!(first.document["orderId"], json!(1));

    let second = store
      .upsert_one(Collection::Orders, 1, doc(json!({"status": "completed"})))
      .await
      .unwrap();
    assert!(!second.inserted);
    assert!(second.modified);
    assert_eq!(second.document["status"], json!("completed"));
    assert_eq!(second.document["total"], json!("10"));
    assert_eq!(store.count(Collection::Orders), 1);
  }

  #[tokio::test]
  async fn identical_patch_is_matched_but_not_modified() {
    let store = MemoryStore::new();
    store.upsert_one(Collection::Products, 5, doc(json!({"name": "Tea"}))).await.unwrap();
    let again = store.upsert_one(Collection::Products, 5, doc(json!({"name": "Tea"}))).await.unwrap();
    assert!(!again.inserted);
    assert!(!again.modified);
  }

  #[tokio::test]
  async fn bulk_upsert_reports_new_ids() {
    let store = MemoryStore::new();
    store.upsert_one(Collection::Orders, 1, doc(json!({"status": "a"}))).await.unwrap();

    let result = store
      .bulk_upsert(
        Collection::Orders,
        vec![
          (1, doc(json!({"status": "b"}))),
          (2, doc(json!({"status": "a"}))),
          (2, doc(json!({"status": "a"}))),
        ],
      )
      .await
      .unwrap();

    assert_eq!(result.upserted, 1);
    assert_eq!(result.matched, 2);
    assert_eq!(result.modified, 1);
    assert_eq!(result.upserted_ids.into_iter().collect::<Vec<_>>(), vec![2]);
  }

  #[tokio::test]
  async fn update_and_delete_require_existing_documents() {
    let store = MemoryStore::new();
    assert!(store
      .update_one(Collection::Vendors, 9, doc(json!({"phone": "1"})))
      .await
      .unwrap()
      .is_none());
    assert!(!store.delete_one(Collection::Vendors, 9).await.unwrap());

    store.upsert_one(Collection::Vendors, 9, doc(json!({"phone": "1"}))).await.unwrap();
    let updated = store
      .update_one(Collection::Vendors, 9, doc(json!({"phone": "2"})))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(updated["phone"], json!("2"));
    assert!(store.delete_one(Collection::Vendors, 9).await.unwrap());
    assert!(store.find_one(Collection::Vendors, 9).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn find_all_filters_on_top_level_fields() {
    let store = MemoryStore::new();
    for (id, vendor) in [(1, 10), (2, 11), (3, 10)] {
      store
        .upsert_one(Collection::Orders, id, doc(json!({"vendorId": vendor})))
        .await
        .unwrap();
    }
    let hits = store
      .find_all(Collection::Orders, &DocFilter::new().field("vendorId", 10))
      .await
      .unwrap();
    let ids: Vec<_> = hits.iter().map(|d| d["orderId"].as_i64().unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&1) && ids.contains(&3));
  }
}
