// storelink/app/src/web/handlers/diagnostics_handlers.rs

//! Operator endpoints that exercise the outbound channels directly.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::email::EmailMessage;
use crate::services::sms::SmsOutcome;
use crate::state::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct TestSmsRequest {
  pub to: Option<String>,
  pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct TestEmailRequest {
  pub to: String,
  pub subject: Option<String>,
  pub message: Option<String>,
}

#[instrument(name = "handler::test_sms", skip(app_state, body))]
pub async fn test_sms_handler(
  app_state: web::Data<AppState>,
  body: Option<web::Json<TestSmsRequest>>,
) -> Result<HttpResponse, AppError> {
  let request = body.map(web::Json::into_inner).unwrap_or_default();
  let to = request
    .to
    .filter(|t| !t.trim().is_empty())
    .or_else(|| app_state.config.sms.test_number.clone())
    .ok_or_else(|| AppError::Validation("No recipient given and TEST_SMS_NUMBER is not set.".to_string()))?;
  let message = request
    .message
    .unwrap_or_else(|| "Test message from storelink.".to_string());

  let outcome = app_state.notifier.sms().send(&to, &message).await;
  info!(sent = outcome.is_sent(), "Test SMS attempted");

  let response = match &outcome {
    SmsOutcome::Sent { .. } => HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Test SMS sent.",
      "outcome": outcome,
    })),
    SmsOutcome::Failed { error_message } => HttpResponse::BadGateway().json(json!({
      "success": false,
      "message": format!("Test SMS failed: {}", error_message),
      "outcome": outcome,
    })),
  };
  Ok(response)
}

#[instrument(name = "handler::test_email", skip(app_state, body), fields(to = %body.to))]
pub async fn test_email_handler(
  app_state: web::Data<AppState>,
  body: web::Json<TestEmailRequest>,
) -> Result<HttpResponse, AppError> {
  let request = body.into_inner();
  let message = EmailMessage {
    to: request.to,
    subject: request.subject.unwrap_or_else(|| "storelink test email".to_string()),
    html: format!(
      "<p>{}</p>",
      request.message.as_deref().unwrap_or("This is a test email from storelink.")
    ),
  };

  let message_id = app_state.notifier.email().send(&message).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Test email sent.",
    "messageId": message_id,
  })))
}
