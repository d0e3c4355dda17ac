// storelink/app/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use storelink::config::AppConfig;
use storelink::errors::{AppError, Result as AppResult};
use storelink::services::commerce::CommerceApi;
use storelink::services::email::{EmailMessage, EmailSender};
use storelink::services::notifier::Notifier;
use storelink::services::signature::compute_signature;
use storelink::services::sms::{SmsError, SmsService, SmsTransport};
use storelink::state::AppState;
use storelink::store::{Collection, MemoryStore, Repository};
use tracing::Level;

pub const SECRET: &str = "whsec_test_secret";

pub static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

// --- Fakes ---

/// Serves canned pages per collection; page numbers start at 1.
#[derive(Default)]
pub struct FakeCommerce {
  pages: Mutex<HashMap<Collection, Vec<Vec<JsonValue>>>>,
  pub page_requests: Mutex<Vec<(Collection, u32, u32)>>,
  pub status_updates: Mutex<Vec<(i64, String)>>,
  /// (operation, product id, request body) for every product write.
  pub product_writes: Mutex<Vec<(&'static str, i64, JsonValue)>>,
  pub fail_fetch: Mutex<Option<String>>,
}

pub const CREATED_PRODUCT_ID: i64 = 900;

/// Echoes a product write back the way upstream does: the body plus id and price.
fn echo_product(woo_id: i64, body: &JsonValue) -> JsonValue {
  let mut product = body.clone();
  if let Some(fields) = product.as_object_mut() {
    fields.insert("id".into(), json!(woo_id));
    if let Some(price) = fields.get("regular_price").cloned() {
      fields.insert("price".into(), price);
    }
  }
  product
}

impl FakeCommerce {
  pub fn with_pages(self, collection: Collection, pages: Vec<Vec<JsonValue>>) -> Self {
    self.pages.lock().insert(collection, pages);
    self
  }
}

#[async_trait]
impl CommerceApi for FakeCommerce {
  async fn fetch_page(&self, collection: Collection, page: u32, per_page: u32) -> AppResult<Vec<JsonValue>> {
    self.page_requests.lock().push((collection, page, per_page));
    if let Some(msg) = self.fail_fetch.lock().clone() {
      return Err(AppError::Upstream(msg));
    }
    let pages = self.pages.lock();
    Ok(pages
      .get(&collection)
      .and_then(|p| p.get(page as usize - 1))
      .cloned()
      .unwrap_or_default())
  }

  async fn update_order_status(&self, order_id: i64, status: &str) -> AppResult<JsonValue> {
    self.status_updates.lock().push((order_id, status.to_string()));
    Ok(json!({
      "id": order_id,
      "status": status,
      "total": "250.00",
      "date_modified": "2024-05-02T09:30:00",
    }))
  }

  async fn create_product(&self, body: &JsonValue) -> AppResult<JsonValue> {
    self.product_writes.lock().push(("create", CREATED_PRODUCT_ID, body.clone()));
    Ok(echo_product(CREATED_PRODUCT_ID, body))
  }

  async fn update_product(&self, woo_id: i64, body: &JsonValue) -> AppResult<JsonValue> {
    self.product_writes.lock().push(("update", woo_id, body.clone()));
    Ok(echo_product(woo_id, body))
  }

  async fn delete_product(&self, woo_id: i64) -> AppResult<JsonValue> {
    self.product_writes.lock().push(("delete", woo_id, JsonValue::Null));
    Ok(json!({ "id": woo_id }))
  }
}

/// Records every message; when `fail` holds a reason, each send is rejected with it instead.
#[derive(Default)]
pub struct RecordingEmail {
  pub sent: Mutex<Vec<EmailMessage>>,
  pub fail: Mutex<Option<String>>,
}

#[async_trait]
impl EmailSender for RecordingEmail {
  async fn send(&self, message: &EmailMessage) -> AppResult<String> {
    if let Some(reason) = self.fail.lock().clone() {
      return Err(AppError::Upstream(reason));
    }
    let mut sent = self.sent.lock();
    sent.push(message.clone());
    Ok(format!("email-{}", sent.len()))
  }
}

#[derive(Default)]
pub struct RecordingSms {
  pub sent: Mutex<Vec<(String, String)>>,
  pub fail: Mutex<Option<String>>,
}

#[async_trait]
impl SmsTransport for RecordingSms {
  async fn deliver(&self, to: &str, body: &str) -> Result<String, SmsError> {
    if let Some(reason) = self.fail.lock().clone() {
      return Err(SmsError::Permanent(reason));
    }
    let mut sent = self.sent.lock();
    sent.push((to.to_string(), body.to_string()));
    Ok(format!("SM{}", sent.len()))
  }
}

pub struct TestHarness {
  pub state: AppState,
  pub commerce: Arc<FakeCommerce>,
  pub email: Arc<RecordingEmail>,
  pub sms: Arc<RecordingSms>,
}

impl TestHarness {
  pub fn new(commerce: FakeCommerce) -> Self {
    Self::with_config(commerce, AppConfig::for_tests(SECRET))
  }

  pub fn with_config(commerce: FakeCommerce, config: AppConfig) -> Self {
    setup_tracing();
    let commerce = Arc::new(commerce);
    let email = Arc::new(RecordingEmail::default());
    let sms = Arc::new(RecordingSms::default());
    let sms_service = Arc::new(SmsService::new(sms.clone(), config.sms.default_country_code.clone()));
    let notifier = Arc::new(Notifier::new(email.clone(), sms_service, config.owner.clone()));
    let state = AppState::new(
      Repository::new(Arc::new(MemoryStore::new())),
      commerce.clone(),
      notifier,
      Arc::new(config),
    );
    Self {
      state,
      commerce,
      email,
      sms,
    }
  }

  pub fn emails_to(&self) -> Vec<String> {
    self.email.sent.lock().iter().map(|m| m.to.clone()).collect()
  }

  pub fn sms_to(&self) -> Vec<String> {
    self.sms.sent.lock().iter().map(|(to, _)| to.clone()).collect()
  }

  pub fn fail_notifications(&self) {
    *self.email.fail.lock() = Some("Brevo rejected the message".to_string());
    *self.sms.fail.lock() = Some("Twilio rejected the number".to_string());
  }
}

// --- Payloads ---

pub fn sign(body: &[u8]) -> String {
  compute_signature(body, SECRET).unwrap_or_default()
}

pub fn order_payload(id: i64, status: &str, total: &str) -> JsonValue {
  json!({
    "id": id,
    "status": status,
    "total": total,
    "currency": "INR",
    "billing": {
      "first_name": "A",
      "last_name": "B",
      "email": "a@b.com",
      "phone": "9999999999"
    },
    "line_items": [
      { "product_id": 7, "name": "Item", "quantity": 2, "price": "100", "total": "200", "sku": "SKU1" }
    ]
  })
}
