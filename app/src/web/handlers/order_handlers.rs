// storelink/app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::mapping::{string_field, timestamp_field};
use crate::models::OrderPatch;
use crate::state::AppState;
use crate::store::OrderFilter;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
  pub vendor_id: Option<i64>,
  pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusRequest {
  pub status: String,
}

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let filter = OrderFilter {
    vendor_id: query.vendor_id,
    status: query.status.filter(|s| !s.trim().is_empty()),
  };
  let orders = app_state.repo.list_orders(&filter).await?;
  info!(count = orders.len(), "Orders listed");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Orders fetched successfully.",
    "count": orders.len(),
    "orders": orders,
  })))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .repo
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Order fetched successfully.",
    "order": order,
  })))
}

/// Pushes a status change upstream, mirrors the result locally and emails the customer.
#[instrument(
  name = "handler::update_order_status",
  skip(app_state, path, body),
  fields(order_id = %path.as_ref(), status = %body.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let status = body.into_inner().status.trim().to_string();
  if status.is_empty() {
    return Err(AppError::Validation("Field 'status' is required.".to_string()));
  }

  let upstream = app_state.commerce.update_order_status(order_id, &status).await?;

  let upstream_status = string_field(&upstream, "status");
  let upstream_total = string_field(&upstream, "total");
  let patch = OrderPatch {
    status: Some(if upstream_status.is_empty() { status } else { upstream_status }),
    total: Some(upstream_total).filter(|t| !t.is_empty()),
    date_modified: timestamp_field(&upstream, "date_modified"),
    ..OrderPatch::new(order_id)
  };
  let (order, inserted) = app_state.repo.upsert_order(&patch).await?;
  info!(inserted, status = %order.status, "Order status updated upstream and mirrored");

  // The upstream change already happened; a failed email does not undo it.
  let report = app_state.notifier.notify_status_change(&order).await;
  if report.failed_count() > 0 {
    warn!(order_id, "Status update email could not be delivered");
  }

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Order status updated successfully.",
    "order": order,
    "notifications": report,
  })))
}
