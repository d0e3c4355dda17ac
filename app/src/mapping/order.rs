// storelink/app/src/mapping/order.rs

use super::{array_field, i64_field, lenient_i64, string_field, timestamp_field};
use crate::models::{Customer, LineItem, Order};
use serde_json::Value as JsonValue;

const VENDOR_META_KEY: &str = "_dokan_vendor_id";

/// Maps an upstream order payload into a canonical [`Order`].
///
/// Deterministic and side-effect free. Missing or mistyped fields fall back to
/// defaults; the raw payload is kept in `full_data`.
pub fn map_order(payload: &JsonValue) -> Order {
  let billing = payload.get("billing").unwrap_or(&JsonValue::Null);

  let payment_method = Some(string_field(payload, "payment_method_title"))
    .filter(|t| !t.trim().is_empty())
    .unwrap_or_else(|| "N/A".to_string());

  let defaults = Order::default();
  Order {
    order_id: i64_field(payload, "id").unwrap_or_default(),
    status: string_field(payload, "status"),
    total: non_empty_or(string_field(payload, "total"), defaults.total),
    currency: non_empty_or(string_field(payload, "currency"), defaults.currency),
    payment_method,
    date_created: timestamp_field(payload, "date_created"),
    date_modified: timestamp_field(payload, "date_modified"),
    customer: map_customer(billing),
    vendor_id: vendor_id(payload),
    items: array_field(payload, "line_items").iter().map(map_line_item).collect(),
    notes: Some(string_field(payload, "customer_note")).filter(|n| !n.trim().is_empty()),
    shipping_method: array_field(payload, "shipping_lines")
      .first()
      .map(|line| string_field(line, "method_title"))
      .filter(|m| !m.is_empty()),
    full_data: payload.clone(),
    ..defaults
  }
}

fn non_empty_or(value: String, fallback: String) -> String {
  if value.trim().is_empty() {
    fallback
  } else {
    value
  }
}

fn map_customer(billing: &JsonValue) -> Customer {
  let name = format!(
    "{} {}",
    string_field(billing, "first_name"),
    string_field(billing, "last_name")
  )
  .trim()
  .to_string();

  let address = ["address_1", "city", "state", "country"]
    .iter()
    .map(|key| string_field(billing, key))
    .map(|part| part.trim().to_string())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ");

  Customer {
    name,
    email: string_field(billing, "email").trim().to_string(),
    phone: string_field(billing, "phone").trim().to_string(),
    address,
  }
}

fn map_line_item(item: &JsonValue) -> LineItem {
  LineItem {
    product_id: i64_field(item, "product_id"),
    name: string_field(item, "name"),
    quantity: i64_field(item, "quantity").unwrap_or_default(),
    price: string_field(item, "price"),
    total: string_field(item, "total"),
    sku: string_field(item, "sku"),
  }
}

/// `_dokan_vendor_id` meta entry first, then the Dokan `store.id`.
fn vendor_id(payload: &JsonValue) -> Option<i64> {
  array_field(payload, "meta_data")
    .iter()
    .find(|meta| meta.get("key").and_then(JsonValue::as_str) == Some(VENDOR_META_KEY))
    .and_then(|meta| meta.get("value"))
    .and_then(lenient_i64)
    .or_else(|| payload.get("store").and_then(|store| i64_field(store, "id")))
}
