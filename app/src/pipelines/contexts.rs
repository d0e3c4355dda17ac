// storelink/app/src/pipelines/contexts.rs

//! Data carried by each pipeline run. Handlers receive these wrapped in
//! `storelink_flow::ContextData`.

use crate::models::{Order, Product};
use crate::services::notifier::NotificationReport;
use crate::state::AppState;
use crate::store::Collection;
use actix_web::web::Bytes;
use serde::Serialize;
use serde_json::Value as JsonValue;

// --- Webhook ---

/// Where a webhook delivery ended up. Rejections surface as errors and leave
/// the state at the last step reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookState {
  Received,
  PingAcknowledged,
  SignatureRejected,
  BodyInvalid,
  Mapped,
  Persisted,
  Notified,
  Acknowledged,
}

/// What a topic asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
  Order,
  Product,
  /// Deletions and unknown resources: acknowledged, nothing stored.
  Ignored,
}

impl TopicKind {
  pub fn from_topic(topic: &str) -> Self {
    let (resource, event) = topic.split_once('.').unwrap_or((topic, ""));
    match (resource, event) {
      (_, "deleted") => TopicKind::Ignored,
      ("order", _) => TopicKind::Order,
      ("product", "created" | "updated") => TopicKind::Product,
      _ => TopicKind::Ignored,
    }
  }
}

#[derive(Debug, Clone)]
pub enum MappedRecord {
  Order(Order),
  Product(Product),
}

#[derive(Clone)]
pub struct WebhookCtxData {
  pub app_state: AppState,
  pub provider: String,
  pub topic: Option<String>,
  pub signature: Option<String>,
  pub delivery_id: Option<String>,
  pub raw_body: Bytes,
  // Filled in by the pipeline:
  pub payload: Option<JsonValue>,
  pub mapped: Option<MappedRecord>,
  pub stored_order: Option<Order>,
  pub inserted: bool,
  pub state: WebhookState,
  pub notifications: Option<NotificationReport>,
}

impl WebhookCtxData {
  pub fn new(
    app_state: AppState,
    provider: String,
    topic: Option<String>,
    signature: Option<String>,
    delivery_id: Option<String>,
    raw_body: Bytes,
  ) -> Self {
    Self {
      app_state,
      provider,
      topic,
      signature,
      delivery_id,
      raw_body,
      payload: None,
      mapped: None,
      stored_order: None,
      inserted: false,
      state: WebhookState::Received,
      notifications: None,
    }
  }

  pub fn topic_kind(&self) -> TopicKind {
    self.topic.as_deref().map_or(TopicKind::Ignored, TopicKind::from_topic)
  }
}

// --- Bulk sync ---

/// Counters returned by a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
  pub collection: Collection,
  pub fetched: usize,
  pub pages: u32,
  pub matched: u64,
  pub modified: u64,
  pub upserted: u64,
  pub notified: usize,
  pub notification_failures: usize,
}

impl SyncSummary {
  pub fn empty(collection: Collection) -> Self {
    Self {
      collection,
      fetched: 0,
      pages: 0,
      matched: 0,
      modified: 0,
      upserted: 0,
      notified: 0,
      notification_failures: 0,
    }
  }
}

#[derive(Clone)]
pub struct SyncCtxData {
  pub app_state: AppState,
  pub collection: Collection,
  pub page_size: u32,
  /// Raw upstream records, in fetch order.
  pub records: Vec<JsonValue>,
  /// Orders that did not exist before this run.
  pub new_orders: Vec<Order>,
  pub summary: SyncSummary,
}

impl SyncCtxData {
  pub fn new(app_state: AppState, collection: Collection) -> Self {
    let page_size = match collection {
      Collection::Vendors => app_state.config.vendor_page_size,
      Collection::Orders | Collection::Products => app_state.config.sync_page_size,
    };
    Self {
      app_state,
      collection,
      page_size,
      records: Vec::new(),
      new_orders: Vec::new(),
      summary: SyncSummary::empty(collection),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn topics_route_by_resource_and_event() {
    assert_eq!(TopicKind::from_topic("order.created"), TopicKind::Order);
    assert_eq!(TopicKind::from_topic("order.updated"), TopicKind::Order);
    assert_eq!(TopicKind::from_topic("order.restored"), TopicKind::Order);
    assert_eq!(TopicKind::from_topic("order.deleted"), TopicKind::Ignored);
    assert_eq!(TopicKind::from_topic("product.updated"), TopicKind::Product);
    assert_eq!(TopicKind::from_topic("product.deleted"), TopicKind::Ignored);
    assert_eq!(TopicKind::from_topic("customer.created"), TopicKind::Ignored);
    assert_eq!(TopicKind::from_topic("action.woocommerce_x"), TopicKind::Ignored);
  }
}
