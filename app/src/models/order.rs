// storelink/app/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
  pub name: String,
  pub email: String,
  pub phone: String,
  pub address: String,
}

impl Customer {
  pub fn is_reachable(&self) -> bool {
    !self.email.trim().is_empty() || !self.phone.trim().is_empty()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
  pub product_id: Option<i64>,
  pub name: String,
  pub quantity: i64,
  pub price: String,
  pub total: String,
  pub sku: String,
}

/// The local, normalized order. One document per upstream `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
  pub order_id: i64,
  pub status: String,
  pub total: String,
  pub currency: String,
  pub payment_method: String,
  pub date_created: Option<DateTime<Utc>>,
  pub date_modified: Option<DateTime<Utc>>,
  pub customer: Customer,
  pub vendor_id: Option<i64>,
  pub items: Vec<LineItem>,
  pub notes: Option<String>,
  pub shipping_method: Option<String>,
  pub full_data: JsonValue,
  pub webhook_topic: Option<String>,
  pub webhook_delivery_id: Option<String>,
  // Managed by the store.
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Order {
  fn default() -> Self {
    Self {
      order_id: 0,
      status: String::new(),
      total: "0.00".to_string(),
      currency: "INR".to_string(),
      payment_method: "N/A".to_string(),
      date_created: None,
      date_modified: None,
      customer: Customer::default(),
      vendor_id: None,
      items: Vec::new(),
      notes: None,
      shipping_method: None,
      full_data: JsonValue::Null,
      webhook_topic: None,
      webhook_delivery_id: None,
      created_at: None,
      updated_at: None,
    }
  }
}

/// A partial order write. Only the fields that are `Some` are merged into the
/// stored document; everything else keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
  pub order_id: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub currency: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub payment_method: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_created: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_modified: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub customer: Option<Customer>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vendor_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub items: Option<Vec<LineItem>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shipping_method: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_data: Option<JsonValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub webhook_topic: Option<String>,
  /// `Some(None)` writes an explicit null so a delivery without an id
  /// clears the one left by an earlier delivery.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub webhook_delivery_id: Option<Option<String>>,
}

impl OrderPatch {
  pub fn new(order_id: i64) -> Self {
    Self {
      order_id,
      ..Default::default()
    }
  }

  pub fn with_provenance(mut self, topic: Option<String>, delivery_id: Option<String>) -> Self {
    self.webhook_topic = topic;
    self.webhook_delivery_id = Some(delivery_id);
    self
  }
}

/// A fully mapped order becomes a patch carrying every mapped field.
/// Optional fields the mapping could not fill are left out so they do not
/// erase values stored by an earlier, richer payload.
impl From<Order> for OrderPatch {
  fn from(order: Order) -> Self {
    Self {
      order_id: order.order_id,
      status: Some(order.status),
      total: Some(order.total),
      currency: Some(order.currency),
      payment_method: Some(order.payment_method),
      date_created: order.date_created,
      date_modified: order.date_modified,
      customer: Some(order.customer),
      vendor_id: order.vendor_id,
      items: Some(order.items),
      notes: order.notes,
      shipping_method: order.shipping_method,
      full_data: Some(order.full_data),
      webhook_topic: order.webhook_topic,
      webhook_delivery_id: order.webhook_delivery_id.map(Some),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn patch_serializes_only_present_fields() {
    let patch = OrderPatch {
      status: Some("completed".into()),
      total: Some("99.00".into()),
      ..OrderPatch::new(42)
    };
    assert_eq!(
      serde_json::to_value(&patch).unwrap(),
      json!({"orderId": 42, "status": "completed", "total": "99.00"})
    );
  }

  #[test]
  fn stored_document_with_missing_fields_uses_defaults() {
    let order: Order = serde_json::from_value(json!({"orderId": 7, "status": "pending"})).unwrap();
    assert_eq!(order.total, "0.00");
    assert_eq!(order.currency, "INR");
    assert!(order.items.is_empty());
    assert_eq!(order.customer, Customer::default());
  }

  #[test]
  fn provenance_without_delivery_id_writes_null() {
    let patch = OrderPatch::new(9).with_provenance(Some("order.updated".into()), None);
    assert_eq!(
      serde_json::to_value(&patch).unwrap(),
      json!({"orderId": 9, "webhookTopic": "order.updated", "webhookDeliveryId": null})
    );
  }
}
