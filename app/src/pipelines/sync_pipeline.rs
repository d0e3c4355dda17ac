// storelink/app/src/pipelines/sync_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::mapping::{map_order, map_product, map_vendor};
use crate::models::{Order, OrderPatch};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{SyncCtxData, SyncSummary};
use crate::state::AppState;
use crate::store::{BulkWriteResult, Collection};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;
use storelink_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry, SkipCondition};
use tracing::{info, instrument, warn};

type StepResult = Result<PipelineControl, AppError>;

pub fn build_sync_pipeline() -> Pipeline<SyncCtxData, AppError> {
  let nothing_new: SkipCondition<SyncCtxData> = Arc::new(|ctx_data: ContextData<SyncCtxData>| {
    ctx_data.with_read(|data| data.collection != Collection::Orders || data.new_orders.is_empty())
  });

  let mut p = Pipeline::<SyncCtxData, AppError>::new(
    "bulk_sync",
    &[
      ("fetch_pages", false, None),
      ("reconcile", false, None),
      ("notify_new_orders", true, Some(nothing_new)),
    ],
  );

  p.on("fetch_pages", fetch_pages);
  p.on("reconcile", reconcile);
  p.on("notify_new_orders", notify_new_orders);
  p
}

pub fn register_sync_pipeline(registry: &Registry<AppError>) {
  registry.register(build_sync_pipeline());
  info!("Bulk sync pipeline registered.");
}

/// Runs a full sync of `collection`. Any failure comes back as [`AppError::Sync`].
#[instrument(name = "sync::run", skip(app_state, collection), fields(collection = collection.as_str()))]
pub async fn run_sync(app_state: &AppState, collection: Collection) -> AppResult<SyncSummary> {
  let ctx_data = ContextData::new(SyncCtxData::new(app_state.clone(), collection));
  let outcome = app_state
    .flows
    .run(ctx_data.clone())
    .await
    .map_err(AppError::into_sync)?;

  let summary = ctx_data.read().summary.clone();
  match outcome {
    PipelineResult::Completed => info!(?summary, "Sync finished"),
    PipelineResult::Stopped => warn!(?summary, "Sync stopped early"),
  }
  Ok(summary)
}

// Pages are requested one after another until an empty or short page.
#[instrument(name = "sync::fetch_pages", skip_all)]
async fn fetch_pages(ctx_data: ContextData<SyncCtxData>) -> StepResult {
  let (commerce, collection, page_size) = {
    let guard = ctx_data.read();
    (guard.app_state.commerce.clone(), guard.collection, guard.page_size)
  };

  let mut records: Vec<JsonValue> = Vec::new();
  let mut pages = 0u32;
  let mut page = 1u32;
  loop {
    let batch = commerce.fetch_page(collection, page, page_size).await?;
    let batch_len = batch.len();
    if batch_len == 0 {
      break;
    }
    records.extend(batch);
    pages += 1;
    if batch_len < page_size as usize {
      break;
    }
    page += 1;
  }
  info!(collection = collection.as_str(), pages, fetched = records.len(), "Fetched upstream records");

  let mut guard = ctx_data.write();
  guard.summary.fetched = records.len();
  guard.summary.pages = pages;
  guard.records = records;
  Ok(PipelineControl::Continue)
}

/// Upstream records without a positive id cannot be keyed and are dropped.
fn keep_identified<T>(collection: Collection, mapped: Vec<T>, id_of: impl Fn(&T) -> i64) -> Vec<T> {
  mapped
    .into_iter()
    .filter(|item| {
      let id = id_of(item);
      if id <= 0 {
        warn!(collection = collection.as_str(), "Skipping upstream record without an id");
      }
      id > 0
    })
    .collect()
}

#[instrument(name = "sync::reconcile", skip_all)]
async fn reconcile(ctx_data: ContextData<SyncCtxData>) -> StepResult {
  let (app_state, collection, records) = {
    let mut guard = ctx_data.write();
    (guard.app_state.clone(), guard.collection, std::mem::take(&mut guard.records))
  };
  let repo = &app_state.repo;

  let mut new_orders: Vec<Order> = Vec::new();
  let result: BulkWriteResult = match collection {
    Collection::Orders => {
      let orders = keep_identified(collection, records.iter().map(map_order).collect(), |o| o.order_id);
      let patches: Vec<OrderPatch> = orders.iter().cloned().map(OrderPatch::from).collect();
      let result = repo.bulk_upsert_orders(&patches).await?;

      // A batch can list the same order twice; it is new only once.
      let mut seen = HashSet::new();
      new_orders = orders
        .into_iter()
        .filter(|o| result.upserted_ids.contains(&o.order_id) && seen.insert(o.order_id))
        .collect();
      result
    }
    Collection::Products => {
      let products = keep_identified(collection, records.iter().map(map_product).collect(), |p| p.woo_id);
      repo.bulk_upsert_products(&products).await?
    }
    Collection::Vendors => {
      let vendors = keep_identified(collection, records.iter().map(map_vendor).collect(), |v| v.id);
      repo.bulk_upsert_vendors(&vendors).await?
    }
  };

  info!(
    collection = collection.as_str(),
    matched = result.matched,
    modified = result.modified,
    upserted = result.upserted,
    "Reconciled upstream records"
  );

  let mut guard = ctx_data.write();
  guard.summary.matched = result.matched;
  guard.summary.modified = result.modified;
  guard.summary.upserted = result.upserted;
  guard.new_orders = new_orders;
  Ok(PipelineControl::Continue)
}

// Orders only, and only those this run created.
#[instrument(name = "sync::notify_new_orders", skip_all)]
async fn notify_new_orders(ctx_data: ContextData<SyncCtxData>) -> StepResult {
  let (app_state, new_orders) = {
    let guard = ctx_data.read();
    (guard.app_state.clone(), guard.new_orders.clone())
  };

  let mut notified = 0usize;
  let mut failures = 0usize;
  for order in &new_orders {
    let report = common_steps::notify_new_order(&app_state, order).await;
    notified += 1;
    failures += report.failed_count();
  }
  if failures > 0 {
    warn!(notified, failures, "Some new-order notifications failed during sync");
  }

  let mut guard = ctx_data.write();
  guard.summary.notified = notified;
  guard.summary.notification_failures = failures;
  Ok(PipelineControl::Continue)
}
