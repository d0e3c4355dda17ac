// storelink/app/src/mapping/vendor.rs

use super::{bool_field, i64_field, string_field};
use crate::models::vendor::{Vendor, VendorRating};
use serde_json::Value as JsonValue;

/// Maps a Dokan store payload. Structured blocks (`social`, `address`,
/// `payment`) are kept as-is because their shape varies between Dokan versions.
pub fn map_vendor(payload: &JsonValue) -> Vendor {
  let rating = payload.get("rating").unwrap_or(&JsonValue::Null);
  let raw = |key: &str| payload.get(key).cloned().unwrap_or(JsonValue::Null);

  Vendor {
    id: i64_field(payload, "id").unwrap_or_default(),
    store_name: string_field(payload, "store_name"),
    first_name: string_field(payload, "first_name"),
    last_name: string_field(payload, "last_name"),
    email: string_field(payload, "email"),
    phone: string_field(payload, "phone").trim().to_string(),
    social: raw("social"),
    show_email: bool_field(payload, "show_email"),
    address: raw("address"),
    location: string_field(payload, "location"),
    banner: string_field(payload, "banner"),
    gravatar: string_field(payload, "gravatar"),
    shop_url: string_field(payload, "shop_url"),
    rating: VendorRating {
      rating: string_field(rating, "rating"),
      count: i64_field(rating, "count").unwrap_or_default(),
    },
    enabled: bool_field(payload, "enabled"),
    registered: string_field(payload, "registered"),
    payment: raw("payment"),
    trusted: bool_field(payload, "trusted"),
    company_name: string_field(payload, "company_name"),
    vat_number: string_field(payload, "vat_number"),
    company_id_number: string_field(payload, "company_id_number"),
    bank_name: string_field(payload, "bank_name"),
    bank_iban: string_field(payload, "bank_iban"),
    created_at: None,
    updated_at: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn maps_store_payload() {
    let vendor = map_vendor(&json!({
      "id": 12,
      "store_name": "Dosa Hut",
      "phone": " 9876543210 ",
      "rating": {"rating": "4.50", "count": "8"},
      "enabled": true,
      "address": {"street_1": "MG Road", "city": "Chennai"},
      "payment": {"bank": []}
    }));

    assert_eq!(vendor.id, 12);
    assert_eq!(vendor.sms_number(), Some("9876543210"));
    assert_eq!(vendor.rating.count, 8);
    assert!(vendor.enabled);
    assert_eq!(vendor.address["city"], json!("Chennai"));
  }

  #[test]
  fn empty_phone_means_no_sms() {
    assert_eq!(map_vendor(&json!({"id": 1, "phone": ""})).sms_number(), None);
  }
}
