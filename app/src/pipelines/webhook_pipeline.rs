// storelink/app/src/pipelines/webhook_pipeline.rs

use crate::errors::AppError;
use crate::mapping::{map_order, map_product};
use crate::models::OrderPatch;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{MappedRecord, TopicKind, WebhookCtxData, WebhookState};
use crate::services::signature;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use storelink_flow::{ContextData, Pipeline, PipelineControl, Registry, SkipCondition};
use tracing::{info, instrument, warn};

type StepResult = Result<PipelineControl, AppError>;

/// Only a freshly created order with someone to talk to gets the fan-out.
fn skip_notification(ctx_data: ContextData<WebhookCtxData>) -> bool {
  let guard = ctx_data.read();
  let is_created = guard.topic.as_deref() == Some("order.created");
  let reachable = guard
    .stored_order
    .as_ref()
    .is_some_and(|order| order.customer.is_reachable());
  !(is_created && reachable)
}

pub fn build_webhook_pipeline() -> Pipeline<WebhookCtxData, AppError> {
  let nothing_mapped: SkipCondition<WebhookCtxData> = Arc::new(|ctx_data: ContextData<WebhookCtxData>| {
    ctx_data.with_read(|data| data.mapped.is_none())
  });
  let no_notification: SkipCondition<WebhookCtxData> = Arc::new(skip_notification);

  let mut p = Pipeline::<WebhookCtxData, AppError>::new(
    "webhook",
    &[
      ("detect_ping", false, None),
      ("verify_signature", false, None),
      ("parse_payload", false, None),
      ("map_payload", false, None),
      ("persist", false, Some(nothing_mapped)),
      ("notify_customer", true, Some(no_notification)),
      ("acknowledge", false, None),
    ],
  );

  p.on("detect_ping", detect_ping);
  p.on("verify_signature", verify_signature);
  p.on("parse_payload", parse_payload);
  p.on("map_payload", map_payload);
  p.on("persist", persist);
  p.on("notify_customer", notify_customer);
  p.on("acknowledge", acknowledge);
  p
}

pub fn register_webhook_pipeline(registry: &Registry<AppError>) {
  registry.register(build_webhook_pipeline());
  info!("Webhook pipeline registered.");
}

// Step 1: a delivery without a topic is the platform's connectivity check.
#[instrument(name = "webhook::detect_ping", skip_all)]
async fn detect_ping(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let mut guard = ctx_data.write();
  if guard.topic.is_some() {
    return Ok(PipelineControl::Continue);
  }
  info!(provider = %guard.provider, "Webhook ping received");
  guard.state = WebhookState::PingAcknowledged;
  Ok(PipelineControl::Stop)
}

// Step 2
#[instrument(name = "webhook::verify_signature", skip_all)]
async fn verify_signature(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let mut guard = ctx_data.write();
  let Some(claimed) = guard.signature.clone() else {
    warn!(provider = %guard.provider, "Webhook rejected: signature header missing");
    guard.state = WebhookState::SignatureRejected;
    return Err(AppError::Auth("Missing webhook signature".to_string()));
  };
  if guard.raw_body.is_empty() {
    guard.state = WebhookState::BodyInvalid;
    return Err(AppError::Validation("Empty webhook body".to_string()));
  }
  let secret = guard.app_state.config.webhook_secret.clone();
  if !signature::verify_signature(&guard.raw_body, Some(claimed.as_str()), &secret) {
    warn!(provider = %guard.provider, topic = ?guard.topic, "Webhook rejected: signature mismatch");
    guard.state = WebhookState::SignatureRejected;
    return Err(AppError::Auth("Invalid webhook signature".to_string()));
  }
  Ok(PipelineControl::Continue)
}

// Step 3
#[instrument(name = "webhook::parse_payload", skip_all)]
async fn parse_payload(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let mut guard = ctx_data.write();
  let parsed = match serde_json::from_slice::<JsonValue>(&guard.raw_body) {
    Ok(value @ JsonValue::Object(_)) => value,
    Ok(_) => {
      guard.state = WebhookState::BodyInvalid;
      return Err(AppError::Validation("Webhook payload must be a JSON object".to_string()));
    }
    Err(e) => {
      guard.state = WebhookState::BodyInvalid;
      return Err(AppError::Validation(format!("Invalid JSON payload: {}", e)));
    }
  };
  guard.payload = Some(parsed);
  Ok(PipelineControl::Continue)
}

// Step 4: topics we do not mirror end the run here, already acknowledged.
#[instrument(name = "webhook::map_payload", skip_all, fields(topic))]
async fn map_payload(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let mut guard = ctx_data.write();
  tracing::Span::current().record("topic", guard.topic.as_deref().unwrap_or_default());

  let kind = guard.topic_kind();
  let Some(payload) = guard.payload.as_ref() else {
    return Err(AppError::Internal("map_payload ran before parse_payload".to_string()));
  };

  let mapped = match kind {
    TopicKind::Order => {
      let order = map_order(payload);
      if order.order_id <= 0 {
        guard.state = WebhookState::BodyInvalid;
        return Err(AppError::Validation("Order payload carries no id".to_string()));
      }
      MappedRecord::Order(order)
    }
    TopicKind::Product => {
      let product = map_product(payload);
      if product.woo_id <= 0 {
        guard.state = WebhookState::BodyInvalid;
        return Err(AppError::Validation("Product payload carries no id".to_string()));
      }
      MappedRecord::Product(product)
    }
    TopicKind::Ignored => {
      info!(topic = ?guard.topic, "Topic not mirrored; acknowledging without persistence");
      guard.state = WebhookState::Acknowledged;
      return Ok(PipelineControl::Stop);
    }
  };

  guard.mapped = Some(mapped);
  guard.state = WebhookState::Mapped;
  Ok(PipelineControl::Continue)
}

// Step 5
#[instrument(name = "webhook::persist", skip_all)]
async fn persist(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let (app_state, mapped, topic, delivery_id) = {
    let guard = ctx_data.read();
    (
      guard.app_state.clone(),
      guard.mapped.clone(),
      guard.topic.clone(),
      guard.delivery_id.clone(),
    )
  };

  match mapped {
    Some(MappedRecord::Order(order)) => {
      let patch = OrderPatch::from(order).with_provenance(topic, delivery_id);
      let (stored, inserted) = app_state.repo.upsert_order(&patch).await?;
      info!(order_id = stored.order_id, inserted, status = %stored.status, "Order persisted from webhook");
      let mut guard = ctx_data.write();
      guard.stored_order = Some(stored);
      guard.inserted = inserted;
    }
    Some(MappedRecord::Product(product)) => {
      let (stored, inserted) = app_state.repo.upsert_product(&product).await?;
      info!(woo_id = stored.woo_id, inserted, "Product persisted from webhook");
      ctx_data.write().inserted = inserted;
    }
    None => return Ok(PipelineControl::Continue),
  }

  ctx_data.write().state = WebhookState::Persisted;
  Ok(PipelineControl::Continue)
}

// Step 6: delivery failures land in the report, never in the result.
#[instrument(name = "webhook::notify_customer", skip_all)]
async fn notify_customer(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let (app_state, order) = {
    let guard = ctx_data.read();
    (guard.app_state.clone(), guard.stored_order.clone())
  };
  let Some(order) = order else {
    return Ok(PipelineControl::Continue);
  };

  let report = common_steps::notify_new_order(&app_state, &order).await;
  if report.failed_count() > 0 {
    warn!(order_id = order.order_id, failed = report.failed_count(), "Some order notifications failed");
  }

  let mut guard = ctx_data.write();
  guard.notifications = Some(report);
  guard.state = WebhookState::Notified;
  Ok(PipelineControl::Continue)
}

// Step 7
#[instrument(name = "webhook::acknowledge", skip_all)]
async fn acknowledge(ctx_data: ContextData<WebhookCtxData>) -> StepResult {
  let mut guard = ctx_data.write();
  guard.state = WebhookState::Acknowledged;
  info!(
    provider = %guard.provider,
    topic = ?guard.topic,
    delivery_id = ?guard.delivery_id,
    inserted = guard.inserted,
    "Webhook processed"
  );
  Ok(PipelineControl::Continue)
}
