// storelink/app/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::commerce::CommerceApi;
use crate::services::notifier::Notifier;
use crate::store::Repository;
use std::sync::Arc;
use storelink_flow::Registry;

/// Everything a handler or pipeline step needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
  pub repo: Repository,
  pub commerce: Arc<dyn CommerceApi>,
  pub notifier: Arc<Notifier>,
  pub flows: Arc<Registry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every pipeline against it.
  pub fn new(
    repo: Repository,
    commerce: Arc<dyn CommerceApi>,
    notifier: Arc<Notifier>,
    config: Arc<AppConfig>,
  ) -> Self {
    let state = Self {
      repo,
      commerce,
      notifier,
      flows: Arc::new(Registry::new()),
      config,
    };
    crate::pipelines::register_all_pipelines(&state.flows);
    state
  }
}
