// storelink/app/src/models/vendor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorRating {
  pub rating: String,
  pub count: i64,
}

/// A Dokan store, keyed by its upstream numeric `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vendor {
  pub id: i64,
  pub store_name: String,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub phone: String,
  pub social: JsonValue,
  pub show_email: bool,
  pub address: JsonValue,
  pub location: String,
  pub banner: String,
  pub gravatar: String,
  pub shop_url: String,
  pub rating: VendorRating,
  pub enabled: bool,
  pub registered: String,
  pub payment: JsonValue,
  pub trusted: bool,
  pub company_name: String,
  pub vat_number: String,
  pub company_id_number: String,
  pub bank_name: String,
  pub bank_iban: String,
  #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Vendor {
  pub fn sms_number(&self) -> Option<&str> {
    Some(self.phone.trim()).filter(|p| !p.is_empty())
  }
}
