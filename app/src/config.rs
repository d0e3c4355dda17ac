// storelink/app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  fn parse(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }

  /// Read on its own because the subscriber is installed before `AppConfig` is loaded.
  pub fn from_env() -> Self {
    dotenv().ok();
    Self::parse(env::var("LOG_FORMAT").ok().as_deref())
  }
}

/// Webhook bodies larger than this are refused with 413.
pub const DEFAULT_WEBHOOK_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Commerce platform credentials (WooCommerce REST API + Dokan).
#[derive(Debug, Clone)]
pub struct WooConfig {
  pub base_url: String,
  pub consumer_key: String,
  pub consumer_secret: String,
  pub dokan_api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
  pub brevo_api_key: Option<String>,
  pub sender_name: String,
  pub sender_address: String,
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
  pub account_sid: Option<String>,
  pub auth_token: Option<String>,
  pub messaging_service_sid: Option<String>,
  pub from_number: Option<String>,
  pub default_country_code: String,
  pub test_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OwnerConfig {
  pub phone: Option<String>,
  pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs against the in-memory store.
  pub database_url: Option<String>,
  pub webhook_secret: String,
  pub woo: WooConfig,
  pub email: EmailConfig,
  pub sms: SmsConfig,
  pub owner: OwnerConfig,
  pub sync_page_size: u32,
  pub vendor_page_size: u32,
  pub http_timeout: Duration,
  pub webhook_body_limit: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    // Unset and blank are treated the same for optional values.
    let opt_env = |var_name: &str| env::var(var_name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let server_host = opt_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_number::<u16>("SERVER_PORT", opt_env("SERVER_PORT"), 8080)?;

    let woo = WooConfig {
      base_url: get_env("WOO_BASE_URL")?.trim_end_matches('/').to_string(),
      consumer_key: get_env("WOO_CONSUMER_KEY")?,
      consumer_secret: get_env("WOO_CONSUMER_SECRET")?,
      dokan_api_url: opt_env("DOKAN_API_URL").map(|u| u.trim_end_matches('/').to_string()),
    };

    let webhook_secret = get_env("WC_WEBHOOK_SECRET")?;
    if webhook_secret.is_empty() {
      return Err(AppError::Config("WC_WEBHOOK_SECRET must not be empty".to_string()));
    }

    let email = EmailConfig {
      brevo_api_key: opt_env("BREVO_API_KEY"),
      sender_name: opt_env("EMAIL_SENDER_NAME").unwrap_or_else(|| "Storelink".to_string()),
      sender_address: opt_env("EMAIL_SENDER_ADDRESS").unwrap_or_else(|| "no-reply@example.com".to_string()),
    };

    let sms = SmsConfig {
      account_sid: opt_env("TWILIO_ACCOUNT_SID"),
      auth_token: opt_env("TWILIO_AUTH_TOKEN"),
      messaging_service_sid: opt_env("TWILIO_MESSAGING_SERVICE_SID"),
      from_number: opt_env("TWILIO_SMS_NUMBER"),
      default_country_code: opt_env("SMS_DEFAULT_COUNTRY_CODE").unwrap_or_else(|| "+91".to_string()),
      test_number: opt_env("TEST_SMS_NUMBER"),
    };

    let owner = OwnerConfig {
      phone: opt_env("OWNER_PHONE"),
      email: opt_env("OWNER_EMAIL"),
    };

    let sync_page_size = parse_number::<u32>("SYNC_PAGE_SIZE", opt_env("SYNC_PAGE_SIZE"), 100)?;
    let vendor_page_size = parse_number::<u32>("VENDOR_PAGE_SIZE", opt_env("VENDOR_PAGE_SIZE"), 50)?;
    if sync_page_size == 0 || vendor_page_size == 0 {
      return Err(AppError::Config("Page sizes must be greater than zero".to_string()));
    }
    let http_timeout = Duration::from_secs(parse_number::<u64>("HTTP_TIMEOUT_SECS", opt_env("HTTP_TIMEOUT_SECS"), 15)?);

    let webhook_body_limit = parse_number::<usize>(
      "WEBHOOK_MAX_BODY_BYTES",
      opt_env("WEBHOOK_MAX_BODY_BYTES"),
      DEFAULT_WEBHOOK_BODY_LIMIT,
    )?;

    let config = Self {
      server_host,
      server_port,
      database_url: opt_env("DATABASE_URL"),
      webhook_secret,
      woo,
      email,
      sms,
      owner,
      sync_page_size,
      vendor_page_size,
      http_timeout,
      webhook_body_limit,
    };

    // Secrets stay out of the logs.
    tracing::info!(
      server = %format!("{}:{}", config.server_host, config.server_port),
      persistent_store = config.database_url.is_some(),
      brevo_enabled = config.email.brevo_api_key.is_some(),
      twilio_enabled = config.sms.account_sid.is_some(),
      vendor_sync_enabled = config.woo.dokan_api_url.is_some(),
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  /// A configuration suitable for tests: in-memory store, no outbound credentials.
  pub fn for_tests(webhook_secret: &str) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: None,
      webhook_secret: webhook_secret.to_string(),
      woo: WooConfig {
        base_url: "http://woo.invalid/wp-json/wc/v3".to_string(),
        consumer_key: "ck_test".to_string(),
        consumer_secret: "cs_test".to_string(),
        dokan_api_url: Some("http://woo.invalid/wp-json/dokan/v1".to_string()),
      },
      email: EmailConfig {
        brevo_api_key: None,
        sender_name: "Storelink".to_string(),
        sender_address: "no-reply@example.com".to_string(),
      },
      sms: SmsConfig {
        account_sid: None,
        auth_token: None,
        messaging_service_sid: None,
        from_number: Some("+15550000000".to_string()),
        default_country_code: "+91".to_string(),
        test_number: None,
      },
      owner: OwnerConfig::default(),
      sync_page_size: 100,
      vendor_page_size: 50,
      http_timeout: Duration::from_secs(15),
      webhook_body_limit: DEFAULT_WEBHOOK_BODY_LIMIT,
    }
  }
}

fn parse_number<T>(var_name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(v) => v
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_number_defaults_and_rejects_garbage() {
    assert_eq!(parse_number::<u32>("X", None, 7).unwrap(), 7);
    assert_eq!(parse_number::<u32>("X", Some("42".into()), 7).unwrap(), 42);
    assert!(matches!(
      parse_number::<u16>("SERVER_PORT", Some("http".into()), 1),
      Err(AppError::Config(m)) if m.contains("SERVER_PORT")
    ));
  }

  #[test]
  fn log_format_accepts_json_in_any_case() {
    assert_eq!(LogFormat::parse(Some("JSON")), LogFormat::Json);
    assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
    assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
  }
}
