// storelink/app/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;
use storelink_flow::ContextData;
use tracing::{field, info, instrument, Span};

use crate::errors::AppError;
use crate::pipelines::contexts::{WebhookCtxData, WebhookState};
use crate::services::signature::{HEADER_DELIVERY_ID, HEADER_SIGNATURE, HEADER_TOPIC};
use crate::state::AppState;

/// Header value as text; absent, blank and non-UTF-8 values all count as missing.
fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
  req
    .headers()
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

/// Buffers the raw body, refusing it once it grows past `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::Bytes, AppError> {
  let mut body = web::BytesMut::new();
  while let Some(chunk) = payload.next().await {
    let chunk = chunk.map_err(|e| AppError::Validation(format!("Unreadable request body: {}", e)))?;
    if body.len() + chunk.len() > limit {
      return Err(AppError::PayloadTooLarge(format!(
        "Webhook body exceeds the {} byte limit",
        limit
      )));
    }
    body.extend_from_slice(&chunk);
  }
  Ok(body.freeze())
}

#[instrument(
  name = "handler::webhook",
  skip(app_state, req, provider, payload),
  fields(provider = %provider.as_ref(), body_len = field::Empty)
)]
pub async fn webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  provider: web::Path<String>,
  payload: web::Payload,
) -> Result<HttpResponse, AppError> {
  let body = read_body(payload, app_state.config.webhook_body_limit).await?;
  Span::current().record("body_len", body.len());

  let ctx_data = ContextData::new(WebhookCtxData::new(
    app_state.get_ref().clone(),
    provider.into_inner(),
    header_value(&req, HEADER_TOPIC),
    header_value(&req, HEADER_SIGNATURE),
    header_value(&req, HEADER_DELIVERY_ID),
    body,
  ));

  // Rejections come back as AppError and are rendered by its ResponseError impl.
  app_state.flows.run(ctx_data.clone()).await?;

  let guard = ctx_data.read();
  if guard.state == WebhookState::PingAcknowledged {
    return Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Ping acknowledged",
    })));
  }

  info!(state = ?guard.state, topic = ?guard.topic, "Webhook handled");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Webhook processed",
    "topic": guard.topic,
    "state": guard.state,
    "orderId": guard.stored_order.as_ref().map(|o| o.order_id),
    "inserted": guard.inserted,
    "notifications": guard.notifications,
  })))
}

/// Lets an operator check the endpoint from a browser.
pub async fn webhook_status_handler(provider: web::Path<String>) -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "success": true,
    "message": format!("Webhook endpoint for '{}' is live", provider.into_inner()),
  }))
}

pub async fn webhook_test_handler(provider: web::Path<String>) -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "success": true,
    "message": format!("Webhook test route for '{}' reached", provider.into_inner()),
  }))
}
