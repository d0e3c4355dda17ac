// storelink/app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::mapping::map_product;
use crate::models::product::Product;
use crate::state::AppState;

/// Product fields accepted by the create and update routes. `price` becomes
/// the upstream `regular_price`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductInput {
  pub name: Option<String>,
  pub price: Option<JsonValue>,
  pub description: Option<String>,
  pub short_description: Option<String>,
  pub categories: Option<JsonValue>,
  pub tags: Option<JsonValue>,
  pub images: Option<JsonValue>,
  pub manage_stock: Option<bool>,
  pub stock_quantity: Option<i64>,
  pub status: Option<String>,
}

impl ProductInput {
  /// Upstream stores prices as strings; numeric input is accepted too.
  fn regular_price(&self) -> Option<String> {
    match self.price.as_ref()? {
      JsonValue::String(s) => Some(s.trim().to_string()),
      JsonValue::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  fn create_body(&self) -> Result<JsonValue, AppError> {
    let name = self
      .name
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .ok_or_else(|| AppError::Validation("Product name is required.".to_string()))?;

    Ok(json!({
      "name": name,
      "type": "simple",
      "regular_price": self.regular_price().unwrap_or_default(),
      "description": self.description.clone().unwrap_or_default(),
      "short_description": self.short_description.clone().unwrap_or_default(),
      "categories": self.categories.clone().unwrap_or_else(|| json!([])),
      "tags": self.tags.clone().unwrap_or_else(|| json!([])),
      "images": self.images.clone().unwrap_or_else(|| json!([])),
      "manage_stock": self.manage_stock.unwrap_or(false),
      "stock_quantity": self.stock_quantity,
      "status": self.status.clone().unwrap_or_else(|| "publish".to_string()),
    }))
  }

  /// Only the supplied fields are sent; upstream keeps the rest.
  fn update_body(&self) -> Result<JsonValue, AppError> {
    let mut body = Map::new();
    if let Some(name) = &self.name {
      body.insert("name".into(), json!(name));
    }
    if let Some(price) = self.regular_price() {
      body.insert("regular_price".into(), json!(price));
    }
    if let Some(description) = &self.description {
      body.insert("description".into(), json!(description));
    }
    if let Some(short_description) = &self.short_description {
      body.insert("short_description".into(), json!(short_description));
    }
    for (key, value) in [("categories", &self.categories), ("tags", &self.tags), ("images", &self.images)] {
      if let Some(value) = value {
        body.insert(key.into(), value.clone());
      }
    }
    if let Some(manage_stock) = self.manage_stock {
      body.insert("manage_stock".into(), json!(manage_stock));
    }
    if let Some(stock_quantity) = self.stock_quantity {
      body.insert("stock_quantity".into(), json!(stock_quantity));
    }
    if let Some(status) = &self.status {
      body.insert("status".into(), json!(status));
    }

    if body.is_empty() {
      return Err(AppError::Validation("No product fields to update.".to_string()));
    }
    Ok(JsonValue::Object(body))
  }
}

fn product_not_found(woo_id: i64) -> AppError {
  AppError::NotFound(format!("Product with ID {} not found.", woo_id))
}

/// Maps the product upstream answered with and stores it locally.
async fn store_upstream_product(app_state: &AppState, response: &JsonValue, what: &str) -> Result<Product, AppError> {
  let product = map_product(response);
  if product.woo_id <= 0 {
    return Err(AppError::Upstream(format!("{} response carried no product id", what)));
  }
  let (stored, _) = app_state.repo.upsert_product(&product).await?;
  Ok(stored)
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.repo.list_products().await?;
  info!("Successfully fetched {} products.", products.len());

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Products fetched successfully.",
    "count": products.len(),
    "products": products,
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(woo_id = %path.as_ref()))]
pub async fn get_product_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let woo_id = path.into_inner();

  match app_state.repo.find_product(woo_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Product fetched successfully.",
      "product": product,
    }))),
    None => {
      warn!("Product with ID {} not found.", woo_id);
      Err(product_not_found(woo_id))
    }
  }
}

#[instrument(name = "handler::create_product", skip(app_state, body))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  body: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let upstream_body = body.create_body()?;
  let response = app_state.commerce.create_product(&upstream_body).await?;
  let product = store_upstream_product(&app_state, &response, "product create").await?;
  info!(woo_id = product.woo_id, "Product created upstream and stored locally");

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Product created successfully.",
    "product": product,
  })))
}

#[instrument(name = "handler::update_product", skip(app_state, path, body), fields(woo_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let woo_id = path.into_inner();
  if app_state.repo.find_product(woo_id).await?.is_none() {
    return Err(product_not_found(woo_id));
  }

  let upstream_body = body.update_body()?;
  let response = app_state.commerce.update_product(woo_id, &upstream_body).await?;
  let product = store_upstream_product(&app_state, &response, "product update").await?;
  info!("Product updated upstream and locally");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Product updated successfully.",
    "product": product,
  })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(woo_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let woo_id = path.into_inner();
  if app_state.repo.find_product(woo_id).await?.is_none() {
    return Err(product_not_found(woo_id));
  }

  app_state.commerce.delete_product(woo_id).await?;
  app_state.repo.delete_product(woo_id).await?;
  info!("Product deleted upstream and locally");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Product deleted successfully.",
  })))
}
