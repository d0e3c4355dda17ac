// storelink/app/src/pipelines/mod.rs

//! Pipelines run by the application, keyed in the registry by their context type.

use crate::errors::AppError;
use storelink_flow::Registry;

pub mod common_steps;
pub mod contexts;
pub mod sync_pipeline;
pub mod webhook_pipeline;

/// Registers every pipeline. Called once while building [`crate::state::AppState`].
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  webhook_pipeline::register_webhook_pipeline(registry);
  sync_pipeline::register_sync_pipeline(registry);
  tracing::info!("All application pipelines registered.");
}
