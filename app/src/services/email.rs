// storelink/app/src/services/email.rs

//! Transactional email: Brevo in production, a logging sender when no API key is configured.

use crate::config::EmailConfig;
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument, warn};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
  pub to: String,
  pub subject: String,
  pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
  /// Sends one message and returns the provider's message id.
  async fn send(&self, message: &EmailMessage) -> AppResult<String>;
}

fn ensure_recipient(message: &EmailMessage) -> AppResult<()> {
  if message.to.trim().is_empty() || !message.to.contains('@') {
    return Err(AppError::Validation(format!(
      "Invalid email recipient '{}'",
      message.to
    )));
  }
  Ok(())
}

pub struct BrevoEmailSender {
  client: reqwest::Client,
  api_key: String,
  sender_name: String,
  sender_address: String,
  endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendResponse {
  message_id: Option<String>,
}

impl BrevoEmailSender {
  pub fn new(config: &EmailConfig, api_key: String, timeout: Duration) -> AppResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .connect_timeout(timeout)
      .build()?;
    Ok(Self {
      client,
      api_key,
      sender_name: config.sender_name.clone(),
      sender_address: config.sender_address.clone(),
      endpoint: BREVO_SEND_URL.to_string(),
    })
  }
}

#[async_trait]
impl EmailSender for BrevoEmailSender {
  #[instrument(name = "email::brevo_send", skip(self, message), fields(to = %message.to, subject = %message.subject))]
  async fn send(&self, message: &EmailMessage) -> AppResult<String> {
    ensure_recipient(message)?;

    let response = self
      .client
      .post(&self.endpoint)
      .header("api-key", &self.api_key)
      .json(&json!({
        "sender": { "name": self.sender_name, "email": self.sender_address },
        "to": [{ "email": message.to }],
        "subject": message.subject,
        "htmlContent": message.html,
      }))
      .send()
      .await
      .map_err(|e| {
        warn!(error = %e, "Brevo request failed");
        AppError::from(e)
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      warn!(%status, body = %body, "Brevo rejected the email");
      return Err(AppError::Upstream(format!("Brevo returned {}: {}", status, body)));
    }

    let parsed: BrevoSendResponse = response.json().await?;
    let message_id = parsed.message_id.unwrap_or_default();
    info!(message_id = %message_id, "Email sent via Brevo");
    Ok(message_id)
  }
}

/// Logs instead of sending. Used when `BREVO_API_KEY` is not set.
#[derive(Debug, Default)]
pub struct LogOnlyEmailSender;

#[async_trait]
impl EmailSender for LogOnlyEmailSender {
  #[instrument(name = "email::log_only_send", skip(self, message), fields(to = %message.to))]
  async fn send(&self, message: &EmailMessage) -> AppResult<String> {
    ensure_recipient(message)?;
    let preview: String = message.html.chars().take(50).collect();
    let message_id = format!("log_only_{}", uuid::Uuid::new_v4());
    info!(
      subject = %message.subject,
      body_preview = %preview,
      message_id = %message_id,
      "Email not sent (no Brevo API key configured)"
    );
    Ok(message_id)
  }
}
