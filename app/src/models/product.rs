// storelink/app/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
  pub id: i64,
  pub name: String,
  pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductImage {
  pub id: i64,
  pub src: String,
  pub name: String,
  pub alt: String,
}

/// The Dokan store block attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreInfo {
  pub id: i64,
  pub name: String,
  pub shop_name: String,
  pub url: String,
  pub address: JsonValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaEntry {
  pub id: i64,
  pub key: String,
  pub value: JsonValue,
}

/// Mirrors an upstream product; field names follow the upstream REST schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
  #[serde(rename = "wooId")]
  pub woo_id: i64,
  pub name: String,
  pub slug: String,
  pub permalink: String,
  pub description: String,
  pub short_description: String,
  #[serde(rename = "type")]
  pub product_type: String,
  pub status: String,
  pub sku: String,
  pub price: String,
  pub regular_price: String,
  pub sale_price: String,
  pub on_sale: bool,
  pub purchasable: bool,
  pub total_sales: i64,
  pub manage_stock: bool,
  pub stock_quantity: Option<i64>,
  pub stock_status: String,
  pub featured: bool,
  pub catalog_visibility: String,
  pub average_rating: String,
  pub rating_count: i64,
  pub categories: Vec<Term>,
  pub tags: Vec<Term>,
  pub images: Vec<ProductImage>,
  pub store: Option<StoreInfo>,
  pub meta_data: Vec<MetaEntry>,
  #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}
