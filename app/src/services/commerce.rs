// storelink/app/src/services/commerce.rs

//! Client for the upstream commerce platform (WooCommerce REST API, Dokan stores endpoint).

use crate::config::WooConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::store::Collection;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[async_trait]
pub trait CommerceApi: Send + Sync {
  /// One page of raw records. An empty vector means there are no more pages.
  async fn fetch_page(&self, collection: Collection, page: u32, per_page: u32) -> AppResult<Vec<JsonValue>>;

  /// Sets the status of an upstream order and returns the updated order payload.
  async fn update_order_status(&self, order_id: i64, status: &str) -> AppResult<JsonValue>;

  /// Creates an upstream product from a WooCommerce product body; returns the created product.
  async fn create_product(&self, body: &JsonValue) -> AppResult<JsonValue>;

  async fn update_product(&self, woo_id: i64, body: &JsonValue) -> AppResult<JsonValue>;

  /// Permanently deletes the upstream product (no trash).
  async fn delete_product(&self, woo_id: i64) -> AppResult<JsonValue>;
}

pub struct WooClient {
  client: reqwest::Client,
  config: WooConfig,
}

impl WooClient {
  pub fn new(config: WooConfig, timeout: Duration) -> AppResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .connect_timeout(timeout)
      .build()?;
    Ok(Self { client, config })
  }

  fn collection_request(&self, collection: Collection) -> AppResult<reqwest::RequestBuilder> {
    let request = match collection {
      Collection::Orders | Collection::Products => self
        .client
        .get(format!("{}/{}", self.config.base_url, collection.as_str()))
        .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret)),
      // The Dokan stores endpoint is public.
      Collection::Vendors => {
        let url = self
          .config
          .dokan_api_url
          .as_deref()
          .ok_or_else(|| AppError::Config("Missing DOKAN_API_URL in environment variables.".to_string()))?;
        self.client.get(url)
      }
    };
    Ok(request)
  }

  fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request.basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
  }
}

async fn read_json(response: reqwest::Response, what: &str) -> AppResult<JsonValue> {
  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<JsonValue>(&body)
      .ok()
      .and_then(|v| v.get("message").and_then(JsonValue::as_str).map(str::to_string))
      .unwrap_or(body);
    warn!(%status, what, detail = %detail, "Commerce API call failed");
    return Err(AppError::Upstream(format!("{} returned {}: {}", what, status, detail)));
  }
  Ok(response.json::<JsonValue>().await?)
}

#[async_trait]
impl CommerceApi for WooClient {
  #[instrument(name = "commerce::fetch_page", skip(self, collection), fields(collection = %collection.as_str()))]
  async fn fetch_page(&self, collection: Collection, page: u32, per_page: u32) -> AppResult<Vec<JsonValue>> {
    let response = self
      .collection_request(collection)?
      .query(&[("page", page), ("per_page", per_page)])
      .send()
      .await?;

    match read_json(response, collection.as_str()).await? {
      JsonValue::Array(records) => {
        debug!(count = records.len(), "Fetched page");
        Ok(records)
      }
      other => Err(AppError::Upstream(format!(
        "{} page {} was not a JSON array (got {})",
        collection.as_str(),
        page,
        kind_of(&other)
      ))),
    }
  }

  #[instrument(name = "commerce::update_order_status", skip(self))]
  async fn update_order_status(&self, order_id: i64, status: &str) -> AppResult<JsonValue> {
    let response = self
      .client
      .put(format!("{}/orders/{}", self.config.base_url, order_id))
      .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
      .json(&json!({ "status": status }))
      .send()
      .await?;
    read_json(response, "order update").await
  }

  #[instrument(name = "commerce::create_product", skip(self, body))]
  async fn create_product(&self, body: &JsonValue) -> AppResult<JsonValue> {
    let response = self
      .authed(self.client.post(format!("{}/products", self.config.base_url)))
      .json(body)
      .send()
      .await?;
    read_json(response, "product create").await
  }

  #[instrument(name = "commerce::update_product", skip(self, body))]
  async fn update_product(&self, woo_id: i64, body: &JsonValue) -> AppResult<JsonValue> {
    let response = self
      .authed(self.client.put(format!("{}/products/{}", self.config.base_url, woo_id)))
      .json(body)
      .send()
      .await?;
    read_json(response, "product update").await
  }

  #[instrument(name = "commerce::delete_product", skip(self))]
  async fn delete_product(&self, woo_id: i64) -> AppResult<JsonValue> {
    let response = self
      .authed(self.client.delete(format!("{}/products/{}", self.config.base_url, woo_id)))
      .query(&[("force", "true")])
      .send()
      .await?;
    read_json(response, "product delete").await
  }
}

fn kind_of(value: &JsonValue) -> &'static str {
  match value {
    JsonValue::Null => "null",
    JsonValue::Bool(_) => "bool",
    JsonValue::Number(_) => "number",
    JsonValue::String(_) => "string",
    JsonValue::Array(_) => "array",
    JsonValue::Object(_) => "object",
  }
}
