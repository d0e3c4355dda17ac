// storelink/app/src/mapping/mod.rs

//! Pure conversions from upstream payloads into canonical documents.
//!
//! Upstream JSON is loosely typed: ids and money arrive as numbers or as
//! strings, nested blocks may be missing or `null`. Every mapper here accepts
//! anything and substitutes defaults rather than failing.

pub mod order;
pub mod product;
pub mod vendor;

pub use order::map_order;
pub use product::map_product;
pub use vendor::map_vendor;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

/// Integer from a JSON number or a numeric string.
pub fn lenient_i64(value: &JsonValue) -> Option<i64> {
  match value {
    JsonValue::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
    JsonValue::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}

/// String from a JSON string, number or bool.
pub fn lenient_string(value: &JsonValue) -> Option<String> {
  match value {
    JsonValue::String(s) => Some(s.clone()),
    JsonValue::Number(n) => Some(n.to_string()),
    JsonValue::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

pub fn lenient_bool(value: &JsonValue) -> Option<bool> {
  match value {
    JsonValue::Bool(b) => Some(*b),
    JsonValue::String(s) => match s.trim() {
      "true" | "yes" | "1" => Some(true),
      "false" | "no" | "0" => Some(false),
      _ => None,
    },
    JsonValue::Number(n) => n.as_i64().map(|i| i != 0),
    _ => None,
  }
}

/// `payload[key]` as a string, or `""`.
pub fn string_field(payload: &JsonValue, key: &str) -> String {
  payload.get(key).and_then(lenient_string).unwrap_or_default()
}

pub fn i64_field(payload: &JsonValue, key: &str) -> Option<i64> {
  payload.get(key).and_then(lenient_i64)
}

pub fn bool_field(payload: &JsonValue, key: &str) -> bool {
  payload.get(key).and_then(lenient_bool).unwrap_or(false)
}

/// `payload[key]` when it is an array, otherwise an empty slice.
pub fn array_field<'a>(payload: &'a JsonValue, key: &str) -> &'a [JsonValue] {
  payload
    .get(key)
    .and_then(JsonValue::as_array)
    .map(Vec::as_slice)
    .unwrap_or(&[])
}

/// Parses `YYYY-MM-DDTHH:MM:SS`, with or without fractional seconds and offset.
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
    return Some(with_offset.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .map(|naive| naive.and_utc())
}

pub fn timestamp_field(payload: &JsonValue, key: &str) -> Option<DateTime<Utc>> {
  payload.get(key).and_then(JsonValue::as_str).and_then(parse_timestamp)
}
