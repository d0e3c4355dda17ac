// storelink/app/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use storelink_flow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Payload Too Large: {0}")]
  PayloadTooLarge(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Upstream API Error: {0}")]
  Upstream(String),

  #[error("Sync Failed: {0}")]
  Sync(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(other) => AppError::Internal(other.to_string()),
      },
    }
  }
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      AppError::Upstream(format!("request timed out: {}", err))
    } else {
      AppError::Upstream(err.to_string())
    }
  }
}

impl From<serde_json::Error> for AppError {
  fn from(err: serde_json::Error) -> Self {
    AppError::Internal(format!("JSON (de)serialization failed: {}", err))
  }
}

impl AppError {
  /// Wraps any failure of a bulk sync run, keeping the cause in the message.
  pub fn into_sync(self) -> AppError {
    match self {
      AppError::Sync(_) => self,
      other => AppError::Sync(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
      AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_)
      | AppError::Sync(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }

    let message = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::PayloadTooLarge(m) => {
        m.clone()
      }
      AppError::Config(m) => format!("Configuration issue: {}", m),
      AppError::Upstream(m) => format!("Commerce API error: {}", m),
      AppError::Sync(m) => format!("Sync failed: {}", m),
      AppError::Sqlx(_) | AppError::Migrate(_) => "Database operation failed".to_string(),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        "Workflow processing error".to_string()
      }
      AppError::Internal(_) => "An internal error occurred".to_string(),
    };

    HttpResponse::build(status).json(json!({ "success": false, "message": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_follow_error_class() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Auth("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::PayloadTooLarge("x".into()).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(AppError::Upstream("x".into()).status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(AppError::Sync("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn anyhow_unwraps_app_errors() {
    let wrapped = anyhow::Error::new(AppError::NotFound("order 1".into()));
    assert!(matches!(AppError::from(wrapped), AppError::NotFound(m) if m == "order 1"));
  }

  #[test]
  fn into_sync_keeps_cause() {
    let err = AppError::Upstream("HTTP 503".into()).into_sync();
    assert!(matches!(err, AppError::Sync(m) if m.contains("HTTP 503")));
  }
}
