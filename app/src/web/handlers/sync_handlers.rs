// storelink/app/src/web/handlers/sync_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::pipelines::sync_pipeline::run_sync;
use crate::state::AppState;
use crate::store::Collection;

async fn sync_collection(app_state: &AppState, collection: Collection, label: &str) -> Result<HttpResponse, AppError> {
  let summary = run_sync(app_state, collection).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": format!("{} synced successfully", label),
    "summary": summary,
  })))
}

pub async fn sync_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  sync_collection(&app_state, Collection::Orders, "Orders").await
}

pub async fn sync_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  sync_collection(&app_state, Collection::Products, "Products").await
}

pub async fn sync_vendors_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  sync_collection(&app_state, Collection::Vendors, "Vendors").await
}
