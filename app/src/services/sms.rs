// storelink/app/src/services/sms.rs

//! SMS delivery through Twilio with bounded retries on transient failures.

use crate::config::SmsConfig;
use crate::errors::Result as AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmsError {
  /// Sender identity or credentials missing. Retrying cannot help.
  #[error("Missing SMS configuration: {0}")]
  Config(String),

  /// Timeouts, connection failures, 5xx and 429 responses.
  #[error("Transient SMS failure: {0}")]
  Transient(String),

  #[error("SMS rejected by provider: {0}")]
  Permanent(String),
}

impl SmsError {
  pub fn is_retryable(&self) -> bool {
    matches!(self, SmsError::Transient(_))
  }
}

#[async_trait]
pub trait SmsTransport: Send + Sync {
  /// Hands one message to the provider and returns its message id.
  async fn deliver(&self, to: &str, body: &str) -> Result<String, SmsError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SmsOutcome {
  Sent { provider_message_id: String },
  Failed { error_message: String },
}

impl SmsOutcome {
  pub fn is_sent(&self) -> bool {
    matches!(self, SmsOutcome::Sent { .. })
  }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  /// Delay before attempt `n + 1` is `base_delay * n`.
  pub base_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay: Duration::from_secs(2),
    }
  }
}

pub struct SmsService {
  transport: Arc<dyn SmsTransport>,
  default_country_code: String,
  retry: RetryPolicy,
}

impl SmsService {
  pub fn new(transport: Arc<dyn SmsTransport>, default_country_code: impl Into<String>) -> Self {
    Self {
      transport,
      default_country_code: default_country_code.into(),
      retry: RetryPolicy::default(),
    }
  }

  pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  /// Numbers without a leading `+` get the default country code.
  pub fn normalize_number(&self, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      None
    } else if trimmed.starts_with('+') {
      Some(trimmed.to_string())
    } else {
      Some(format!("{}{}", self.default_country_code, trimmed))
    }
  }

  #[instrument(name = "sms::send", skip(self, to, body), fields(to = %to))]
  pub async fn send(&self, to: &str, body: &str) -> SmsOutcome {
    let number = match self.normalize_number(to) {
      Some(n) => n,
      None => {
        warn!("No phone number provided for SMS");
        return SmsOutcome::Failed {
          error_message: "Missing phone number".to_string(),
        };
      }
    };

    let mut attempt: u32 = 1;
    loop {
      match self.transport.deliver(&number, body).await {
        Ok(provider_message_id) => {
          info!(to = %number, attempt, provider_message_id = %provider_message_id, "SMS sent");
          return SmsOutcome::Sent { provider_message_id };
        }
        Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
          let delay = self.retry.base_delay * attempt;
          warn!(to = %number, attempt, error = %e, delay_ms = delay.as_millis() as u64, "SMS attempt failed, retrying");
          tokio::time::sleep(delay).await;
          attempt += 1;
        }
        Err(e) => {
          warn!(to = %number, attempt, error = %e, "SMS delivery failed");
          return SmsOutcome::Failed {
            error_message: e.to_string(),
          };
        }
      }
    }
  }
}

/// Twilio Messages API over `reqwest`.
pub struct TwilioTransport {
  client: reqwest::Client,
  account_sid: Option<String>,
  auth_token: Option<String>,
  messaging_service_sid: Option<String>,
  from_number: Option<String>,
  api_base: String,
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
  sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
  message: Option<String>,
}

impl TwilioTransport {
  pub fn new(config: &SmsConfig, timeout: Duration) -> AppResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .connect_timeout(timeout)
      .build()?;
    Ok(Self {
      client,
      account_sid: config.account_sid.clone(),
      auth_token: config.auth_token.clone(),
      messaging_service_sid: config.messaging_service_sid.clone(),
      from_number: config.from_number.clone(),
      api_base: TWILIO_API_BASE.to_string(),
    })
  }

  /// Messaging service wins over a plain sender number.
  fn sender_param(&self) -> Result<(&'static str, &str), SmsError> {
    if let Some(sid) = &self.messaging_service_sid {
      Ok(("MessagingServiceSid", sid.as_str()))
    } else if let Some(from) = &self.from_number {
      Ok(("From", from.as_str()))
    } else {
      Err(SmsError::Config("Missing Twilio 'from' configuration".to_string()))
    }
  }
}

fn classify_transport_error(err: reqwest::Error) -> SmsError {
  if err.is_timeout() || err.is_connect() {
    SmsError::Transient(err.to_string())
  } else {
    SmsError::Permanent(err.to_string())
  }
}

#[async_trait]
impl SmsTransport for TwilioTransport {
  async fn deliver(&self, to: &str, body: &str) -> Result<String, SmsError> {
    let (account_sid, auth_token) = match (&self.account_sid, &self.auth_token) {
      (Some(sid), Some(token)) => (sid, token),
      _ => return Err(SmsError::Config("Missing Twilio account credentials".to_string())),
    };
    let (sender_key, sender_value) = self.sender_param()?;

    let url = format!("{}/2010-04-01/Accounts/{}/Messages.json", self.api_base, account_sid);
    let response = self
      .client
      .post(&url)
      .basic_auth(account_sid, Some(auth_token))
      .form(&[("To", to), ("Body", body), (sender_key, sender_value)])
      .send()
      .await
      .map_err(classify_transport_error)?;

    let status = response.status();
    if status.is_success() {
      let parsed: TwilioMessageResponse = response
        .json()
        .await
        .map_err(|e| SmsError::Permanent(format!("Unreadable Twilio response: {}", e)))?;
      return Ok(parsed.sid);
    }

    let detail = response
      .json::<TwilioErrorResponse>()
      .await
      .ok()
      .and_then(|r| r.message)
      .unwrap_or_else(|| status.to_string());
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
      Err(SmsError::Transient(format!("Twilio {}: {}", status, detail)))
    } else {
      Err(SmsError::Permanent(format!("Twilio {}: {}", status, detail)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use parking_lot::Mutex;
  use std::collections::VecDeque;

  struct ScriptedTransport {
    script: Mutex<VecDeque<Result<String, SmsError>>>,
    calls: Mutex<Vec<String>>,
  }

  impl ScriptedTransport {
    fn new(script: Vec<Result<String, SmsError>>) -> Arc<Self> {
      Arc::new(Self {
        script: Mutex::new(script.into()),
        calls: Mutex::new(Vec::new()),
      })
    }
  }

  #[async_trait]
  impl SmsTransport for ScriptedTransport {
    async fn deliver(&self, to: &str, _body: &str) -> Result<String, SmsError> {
      self.calls.lock().push(to.to_string());
      self
        .script
        .lock()
        .pop_front()
        .unwrap_or_else(|| Ok("SM_default".to_string()))
    }
  }

  #[test]
  fn numbers_get_default_country_code() {
    let service = SmsService::new(ScriptedTransport::new(vec![]), "+91");
    assert_eq!(service.normalize_number("9999999999").as_deref(), Some("+919999999999"));
    assert_eq!(service.normalize_number(" +15551234 ").as_deref(), Some("+15551234"));
    assert_eq!(service.normalize_number("  "), None);
  }

  #[tokio::test(start_paused = true)]
  async fn transient_failures_are_retried_with_growing_delay() {
    let transport = ScriptedTransport::new(vec![
      Err(SmsError::Transient("timeout".into())),
      Err(SmsError::Transient("503".into())),
      Ok("SM123".into()),
    ]);
    let service = SmsService::new(transport.clone(), "+91");

    let started = tokio::time::Instant::now();
    let outcome = service.send("9999999999", "hi").await;

    assert_eq!(
      outcome,
      SmsOutcome::Sent {
        provider_message_id: "SM123".into()
      }
    );
    assert_eq!(transport.calls.lock().len(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(6));
  }

  #[tokio::test(start_paused = true)]
  async fn gives_up_after_three_attempts() {
    let transport = ScriptedTransport::new(vec![
      Err(SmsError::Transient("a".into())),
      Err(SmsError::Transient("b".into())),
      Err(SmsError::Transient("c".into())),
      Ok("never".into()),
    ]);
    let service = SmsService::new(transport.clone(), "+91");

    let outcome = service.send("+15550001111", "hi").await;
    assert!(matches!(outcome, SmsOutcome::Failed { error_message } if error_message.ends_with(": c")));
    assert_eq!(transport.calls.lock().len(), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn non_transient_failure_is_not_retried() {
    for first in [
      SmsError::Permanent("invalid number".into()),
      SmsError::Config("Missing Twilio 'from' configuration".into()),
    ] {
      let transport = ScriptedTransport::new(vec![Err(first), Ok("never".into())]);
      let service = SmsService::new(transport.clone(), "+91");
      let started = tokio::time::Instant::now();

      let outcome = service.send("9999999999", "hi").await;

      assert!(!outcome.is_sent());
      assert_eq!(transport.calls.lock().len(), 1);
      assert_eq!(started.elapsed(), Duration::ZERO);
    }
  }

  #[tokio::test]
  async fn missing_phone_fails_without_attempt() {
    let transport = ScriptedTransport::new(vec![]);
    let service = SmsService::new(transport.clone(), "+91");
    let outcome = service.send("", "hi").await;
    assert_eq!(
      outcome,
      SmsOutcome::Failed {
        error_message: "Missing phone number".into()
      }
    );
    assert!(transport.calls.lock().is_empty());
  }

  #[tokio::test]
  async fn twilio_without_sender_is_a_config_error() {
    let config = SmsConfig {
      account_sid: Some("AC1".into()),
      auth_token: Some("tok".into()),
      messaging_service_sid: None,
      from_number: None,
      default_country_code: "+91".into(),
      test_number: None,
    };
    let transport = TwilioTransport::new(&config, Duration::from_secs(1)).unwrap();
    let err = transport.deliver("+919999999999", "hi").await.unwrap_err();
    assert!(matches!(err, SmsError::Config(m) if m.contains("Missing")));
  }

  #[tokio::test]
  async fn malformed_request_is_not_retried() {
    let err = reqwest::Client::new()
      .get("not a url")
      .send()
      .await
      .unwrap_err();
    assert!(matches!(classify_transport_error(err), SmsError::Permanent(_)));
  }
}
