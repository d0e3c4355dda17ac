// storelink/app/src/pipelines/common_steps.rs

//! Pieces shared by the webhook and sync pipelines.

use crate::models::{Order, Vendor};
use crate::services::notifier::NotificationReport;
use crate::state::AppState;
use tracing::{instrument, warn};

/// Looks up the vendor an order belongs to. Lookup failures only cost the
/// vendor its SMS, so they are logged and treated as "no vendor".
pub async fn resolve_vendor(app_state: &AppState, order: &Order) -> Option<Vendor> {
  let vendor_id = order.vendor_id?;
  match app_state.repo.find_vendor(vendor_id).await {
    Ok(found) => {
      if found.is_none() {
        warn!(order_id = order.order_id, vendor_id, "Vendor not mirrored locally; skipping vendor SMS");
      }
      found
    }
    Err(e) => {
      warn!(order_id = order.order_id, vendor_id, error = %e, "Vendor lookup failed; skipping vendor SMS");
      None
    }
  }
}

/// New-order fan-out for one order, vendor included when known.
#[instrument(name = "common_step::notify_new_order", skip_all, fields(order_id = order.order_id))]
pub async fn notify_new_order(app_state: &AppState, order: &Order) -> NotificationReport {
  let vendor = resolve_vendor(app_state, order).await;
  app_state.notifier.notify_new_order(order, vendor.as_ref()).await
}
