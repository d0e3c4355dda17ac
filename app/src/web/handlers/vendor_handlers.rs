// storelink/app/src/web/handlers/vendor_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

fn vendor_not_found(vendor_id: i64) -> AppError {
  AppError::NotFound(format!("Vendor {} not found.", vendor_id))
}

#[instrument(name = "handler::list_vendors", skip(app_state))]
pub async fn list_vendors_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let vendors = app_state.repo.list_vendors().await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Vendors fetched successfully.",
    "count": vendors.len(),
    "vendors": vendors,
  })))
}

#[instrument(name = "handler::get_vendor", skip(app_state, path), fields(vendor_id = %path.as_ref()))]
pub async fn get_vendor_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let vendor_id = path.into_inner();
  let vendor = app_state
    .repo
    .find_vendor(vendor_id)
    .await?
    .ok_or_else(|| vendor_not_found(vendor_id))?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Vendor fetched successfully.",
    "vendor": vendor,
  })))
}

/// Merges the supplied fields into the local vendor record.
#[instrument(name = "handler::update_vendor", skip(app_state, path, body), fields(vendor_id = %path.as_ref()))]
pub async fn update_vendor_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<JsonValue>,
) -> Result<HttpResponse, AppError> {
  let vendor_id = path.into_inner();
  let JsonValue::Object(fields) = body.into_inner() else {
    return Err(AppError::Validation("Vendor update must be a JSON object.".to_string()));
  };

  let vendor = app_state
    .repo
    .update_vendor(vendor_id, fields)
    .await?
    .ok_or_else(|| vendor_not_found(vendor_id))?;
  info!("Vendor updated locally");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Vendor updated successfully.",
    "vendor": vendor,
  })))
}

#[instrument(name = "handler::delete_vendor", skip(app_state, path), fields(vendor_id = %path.as_ref()))]
pub async fn delete_vendor_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let vendor_id = path.into_inner();
  if !app_state.repo.delete_vendor(vendor_id).await? {
    return Err(vendor_not_found(vendor_id));
  }
  info!("Vendor removed from the local mirror");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Vendor deleted successfully.",
  })))
}
