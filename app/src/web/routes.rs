// storelink/app/src/web/routes.rs

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{
  diagnostics_handlers, order_handlers, product_handlers, sync_handlers, vendor_handlers, webhook_handlers,
};
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

/// Reports which store backend is in use and whether it answers.
async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let store = app_state.repo.store();
  match store.health_check().await {
    Ok(()) => HttpResponse::Ok().json(json!({
      "success": true,
      "message": "ok",
      "store": store.backend_name(),
    })),
    Err(e) => {
      tracing::error!(error = %e, "Health check failed");
      HttpResponse::ServiceUnavailable().json(json!({
        "success": false,
        "message": "store unavailable",
        "store": store.backend_name(),
      }))
    }
  }
}

// Extractor failures are answered with the same JSON envelope as every other error.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  match err {
    JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
      AppError::PayloadTooLarge(err.to_string()).into()
    }
    other => AppError::Validation(format!("Invalid JSON body: {}", other)).into(),
  }
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid query string: {}", err)).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .app_data(web::JsonConfig::default().error_handler(json_error))
      .app_data(web::PathConfig::default().error_handler(path_error))
      .app_data(web::QueryConfig::default().error_handler(query_error))
      .route("/health", web::get().to(health_check_handler))
      // Webhooks; the body is read as a raw stream bounded by `webhook_body_limit`.
      .service(
        web::scope("/webhooks")
          .route("/{provider}", web::post().to(webhook_handlers::webhook_handler))
          .route("/{provider}", web::get().to(webhook_handlers::webhook_status_handler))
          .route("/{provider}/test", web::get().to(webhook_handlers::webhook_test_handler)),
      )
      // Orders; `/sync` is registered before `/{order_id}` so it is not read as an id.
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/sync", web::get().to(sync_handlers::sync_orders_handler))
          .route("/sync", web::post().to(sync_handlers::sync_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/status", web::put().to(order_handlers::update_order_status_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/sync", web::get().to(sync_handlers::sync_products_handler))
          .route("/sync", web::post().to(sync_handlers::sync_products_handler))
          .route("/{woo_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{woo_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{woo_id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/vendors")
          .route("", web::get().to(vendor_handlers::list_vendors_handler))
          .route("/sync", web::get().to(sync_handlers::sync_vendors_handler))
          .route("/sync", web::post().to(sync_handlers::sync_vendors_handler))
          .route("/{vendor_id}", web::get().to(vendor_handlers::get_vendor_handler))
          .route("/{vendor_id}", web::put().to(vendor_handlers::update_vendor_handler))
          .route("/{vendor_id}", web::delete().to(vendor_handlers::delete_vendor_handler)),
      )
      // Diagnostics
      .service(
        web::scope("/test")
          .route("/sms", web::post().to(diagnostics_handlers::test_sms_handler))
          .route("/email", web::post().to(diagnostics_handlers::test_email_handler)),
      ),
  );
}
