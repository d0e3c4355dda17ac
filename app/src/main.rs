// storelink/app/src/main.rs

use storelink::config::{AppConfig, LogFormat};
use storelink::errors::Result as AppResult;
use storelink::services::commerce::WooClient;
use storelink::services::email::{BrevoEmailSender, EmailSender, LogOnlyEmailSender};
use storelink::services::notifier::Notifier;
use storelink::services::sms::{SmsService, TwilioTransport};
use storelink::state::AppState;
use storelink::store::{DocumentStore, MemoryStore, PgStore, Repository};
use storelink::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn build_state(config: Arc<AppConfig>) -> AppResult<AppState> {
  let store: Arc<dyn DocumentStore> = match &config.database_url {
    Some(url) => Arc::new(PgStore::connect(url).await?),
    None => {
      tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  let commerce = Arc::new(WooClient::new(config.woo.clone(), config.http_timeout)?);

  let email: Arc<dyn EmailSender> = match &config.email.brevo_api_key {
    Some(key) => Arc::new(BrevoEmailSender::new(&config.email, key.clone(), config.http_timeout)?),
    None => {
      tracing::warn!("BREVO_API_KEY not set; emails are logged instead of sent.");
      Arc::new(LogOnlyEmailSender)
    }
  };

  let transport = Arc::new(TwilioTransport::new(&config.sms, config.http_timeout)?);
  let sms = Arc::new(SmsService::new(transport, config.sms.default_country_code.clone()));
  let notifier = Arc::new(Notifier::new(email, sms, config.owner.clone()));

  Ok(AppState::new(Repository::new(store), commerce, notifier, config))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  init_tracing(LogFormat::from_env());
  tracing::info!("Starting storelink server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      std::process::exit(1);
    }
  };

  let app_state = match build_state(app_config.clone()).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise application services.");
      std::process::exit(1);
    }
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
