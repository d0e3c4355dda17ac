// storelink/app/src/store/repository.rs

//! Typed access to the document store.

use super::{BulkWriteResult, Collection, DocFilter, Document, DocumentStore};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderPatch, Product, Vendor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
  pub vendor_id: Option<i64>,
  pub status: Option<String>,
}

#[derive(Clone)]
pub struct Repository {
  store: Arc<dyn DocumentStore>,
}

/// Serializes `value` into a top-level document, dropping store-managed fields.
fn to_document<T: Serialize>(value: &T) -> AppResult<Document> {
  match serde_json::to_value(value)? {
    JsonValue::Object(mut map) => {
      map.remove("createdAt");
      map.remove("updatedAt");
      Ok(map)
    }
    other => Err(AppError::Internal(format!("expected a JSON object, got {}", other))),
  }
}

fn from_document<T: DeserializeOwned>(collection: Collection, doc: JsonValue) -> AppResult<T> {
  serde_json::from_value(doc)
    .map_err(|e| AppError::Internal(format!("stored {} document is unreadable: {}", collection.as_str(), e)))
}

impl Repository {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &Arc<dyn DocumentStore> {
    &self.store
  }

  async fn find<T: DeserializeOwned>(&self, collection: Collection, id: i64) -> AppResult<Option<T>> {
    self
      .store
      .find_one(collection, id)
      .await?
      .map(|doc| from_document(collection, doc))
      .transpose()
  }

  async fn list<T: DeserializeOwned>(&self, collection: Collection, filter: &DocFilter) -> AppResult<Vec<T>> {
    self
      .store
      .find_all(collection, filter)
      .await?
      .into_iter()
      .map(|doc| from_document(collection, doc))
      .collect()
  }

  async fn upsert<T: Serialize + DeserializeOwned>(&self, collection: Collection, id: i64, value: &T) -> AppResult<(T, bool)> {
    let outcome = self.store.upsert_one(collection, id, to_document(value)?).await?;
    debug!(collection = collection.as_str(), id, inserted = outcome.inserted, modified = outcome.modified, "upserted");
    Ok((from_document(collection, outcome.document)?, outcome.inserted))
  }

  async fn bulk<'a, T: Serialize + 'a>(
    &self,
    collection: Collection,
    items: impl Iterator<Item = (i64, &'a T)>,
  ) -> AppResult<BulkWriteResult> {
    let writes = items
      .map(|(id, item)| to_document(item).map(|doc| (id, doc)))
      .collect::<AppResult<Vec<_>>>()?;
    if writes.is_empty() {
      return Ok(BulkWriteResult::default());
    }
    self.store.bulk_upsert(collection, writes).await
  }

  // --- Orders ---

  /// Merge-upserts `patch`; the flag is `true` when the order did not exist before.
  #[instrument(name = "repo::upsert_order", skip(self, patch), fields(order_id = patch.order_id))]
  pub async fn upsert_order(&self, patch: &OrderPatch) -> AppResult<(Order, bool)> {
    let outcome = self
      .store
      .upsert_one(Collection::Orders, patch.order_id, to_document(patch)?)
      .await?;
    Ok((from_document(Collection::Orders, outcome.document)?, outcome.inserted))
  }

  #[instrument(name = "repo::bulk_upsert_orders", skip_all, fields(count = patches.len()))]
  pub async fn bulk_upsert_orders(&self, patches: &[OrderPatch]) -> AppResult<BulkWriteResult> {
    self.bulk(Collection::Orders, patches.iter().map(|p| (p.order_id, p))).await
  }

  pub async fn find_order(&self, order_id: i64) -> AppResult<Option<Order>> {
    self.find(Collection::Orders, order_id).await
  }

  pub async fn list_orders(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
    let mut doc_filter = DocFilter::new();
    if let Some(vendor_id) = filter.vendor_id {
      doc_filter = doc_filter.field("vendorId", vendor_id);
    }
    if let Some(status) = &filter.status {
      doc_filter = doc_filter.field("status", status.as_str());
    }
    self.list(Collection::Orders, &doc_filter).await
  }

  // --- Products ---

  pub async fn upsert_product(&self, product: &Product) -> AppResult<(Product, bool)> {
    self.upsert(Collection::Products, product.woo_id, product).await
  }

  pub async fn bulk_upsert_products(&self, products: &[Product]) -> AppResult<BulkWriteResult> {
    self.bulk(Collection::Products, products.iter().map(|p| (p.woo_id, p))).await
  }

  pub async fn find_product(&self, woo_id: i64) -> AppResult<Option<Product>> {
    self.find(Collection::Products, woo_id).await
  }

  pub async fn list_products(&self) -> AppResult<Vec<Product>> {
    self.list(Collection::Products, &DocFilter::new()).await
  }

  pub async fn delete_product(&self, woo_id: i64) -> AppResult<bool> {
    self.store.delete_one(Collection::Products, woo_id).await
  }

  // --- Vendors ---

  pub async fn upsert_vendor(&self, vendor: &Vendor) -> AppResult<(Vendor, bool)> {
    self.upsert(Collection::Vendors, vendor.id, vendor).await
  }

  pub async fn bulk_upsert_vendors(&self, vendors: &[Vendor]) -> AppResult<BulkWriteResult> {
    self.bulk(Collection::Vendors, vendors.iter().map(|v| (v.id, v))).await
  }

  pub async fn find_vendor(&self, vendor_id: i64) -> AppResult<Option<Vendor>> {
    self.find(Collection::Vendors, vendor_id).await
  }

  pub async fn list_vendors(&self) -> AppResult<Vec<Vendor>> {
    self.list(Collection::Vendors, &DocFilter::new()).await
  }

  /// Merges `fields` into an existing vendor. The merged result must still be a
  /// valid vendor document; `None` when the vendor does not exist.
  pub async fn update_vendor(&self, vendor_id: i64, mut fields: Document) -> AppResult<Option<Vendor>> {
    for managed in ["id", "createdAt", "updatedAt"] {
      fields.remove(managed);
    }
    let Some(current) = self.store.find_one(Collection::Vendors, vendor_id).await? else {
      return Ok(None);
    };

    let mut merged = match current {
      JsonValue::Object(map) => map,
      _ => Document::new(),
    };
    merged.extend(fields.clone());
    serde_json::from_value::<Vendor>(JsonValue::Object(merged))
      .map_err(|e| AppError::Validation(format!("Invalid vendor fields: {}", e)))?;

    self
      .store
      .update_one(Collection::Vendors, vendor_id, fields)
      .await?
      .map(|doc| from_document(Collection::Vendors, doc))
      .transpose()
  }

  pub async fn delete_vendor(&self, vendor_id: i64) -> AppResult<bool> {
    self.store.delete_one(Collection::Vendors, vendor_id).await
  }
}
