// storelink/app/src/mapping/product.rs

use super::{array_field, bool_field, i64_field, string_field};
use crate::models::product::{MetaEntry, Product, ProductImage, StoreInfo, Term};
use serde_json::Value as JsonValue;

/// Maps an upstream product payload. A payload without a usable `id` maps to `woo_id == 0`;
/// callers skip those.
pub fn map_product(payload: &JsonValue) -> Product {
  Product {
    woo_id: i64_field(payload, "id").unwrap_or_default(),
    name: string_field(payload, "name"),
    slug: string_field(payload, "slug"),
    permalink: string_field(payload, "permalink"),
    description: string_field(payload, "description"),
    short_description: string_field(payload, "short_description"),
    product_type: string_field(payload, "type"),
    status: string_field(payload, "status"),
    sku: string_field(payload, "sku"),
    price: string_field(payload, "price"),
    regular_price: string_field(payload, "regular_price"),
    sale_price: string_field(payload, "sale_price"),
    on_sale: bool_field(payload, "on_sale"),
    purchasable: bool_field(payload, "purchasable"),
    total_sales: i64_field(payload, "total_sales").unwrap_or_default(),
    manage_stock: bool_field(payload, "manage_stock"),
    stock_quantity: i64_field(payload, "stock_quantity"),
    stock_status: string_field(payload, "stock_status"),
    featured: bool_field(payload, "featured"),
    catalog_visibility: string_field(payload, "catalog_visibility"),
    average_rating: string_field(payload, "average_rating"),
    rating_count: i64_field(payload, "rating_count").unwrap_or_default(),
    categories: array_field(payload, "categories").iter().map(map_term).collect(),
    tags: array_field(payload, "tags").iter().map(map_term).collect(),
    images: array_field(payload, "images").iter().map(map_image).collect(),
    store: payload.get("store").filter(|s| s.is_object()).map(map_store),
    meta_data: array_field(payload, "meta_data").iter().map(map_meta).collect(),
    created_at: None,
    updated_at: None,
  }
}

fn map_term(term: &JsonValue) -> Term {
  Term {
    id: i64_field(term, "id").unwrap_or_default(),
    name: string_field(term, "name"),
    slug: string_field(term, "slug"),
  }
}

fn map_image(image: &JsonValue) -> ProductImage {
  ProductImage {
    id: i64_field(image, "id").unwrap_or_default(),
    src: string_field(image, "src"),
    name: string_field(image, "name"),
    alt: string_field(image, "alt"),
  }
}

fn map_store(store: &JsonValue) -> StoreInfo {
  StoreInfo {
    id: i64_field(store, "id").unwrap_or_default(),
    name: string_field(store, "name"),
    shop_name: string_field(store, "shop_name"),
    url: string_field(store, "url"),
    address: store.get("address").cloned().unwrap_or(JsonValue::Null),
  }
}

fn map_meta(meta: &JsonValue) -> MetaEntry {
  MetaEntry {
    id: i64_field(meta, "id").unwrap_or_default(),
    key: string_field(meta, "key"),
    value: meta.get("value").cloned().unwrap_or(JsonValue::Null),
  }
}
