// storelink/app/tests/sync_tests.rs

mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::{order_payload, FakeCommerce, TestHarness, SECRET};
use serde_json::{json, Value as JsonValue};
use storelink::config::AppConfig;
use storelink::models::OrderPatch;
use storelink::pipelines::sync_pipeline::run_sync;
use storelink::store::Collection;
use storelink::web::configure_app_routes;

#[actix_web::test]
async fn only_new_orders_get_the_fan_out() {
  let commerce = FakeCommerce::default().with_pages(
    Collection::Orders,
    vec![vec![
      order_payload(1, "processing", "10.00"),
      order_payload(2, "processing", "20.00"),
      order_payload(3, "processing", "30.00"),
    ]],
  );
  let harness = TestHarness::new(commerce);
  for id in [1, 2] {
    harness.state.repo.upsert_order(&OrderPatch::new(id)).await.unwrap();
  }

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(harness.state.clone()))
      .configure(configure_app_routes),
  )
  .await;
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/orders/sync").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: JsonValue = test::read_body_json(resp).await;

  assert_eq!(body["success"], json!(true));
  assert_eq!(body["summary"]["fetched"], json!(3));
  assert_eq!(body["summary"]["matched"], json!(2));
  assert_eq!(body["summary"]["upserted"], json!(1));
  assert_eq!(body["summary"]["notified"], json!(1));

  // One fan-out: the customer's email and SMS for order 3.
  assert_eq!(harness.emails_to().len(), 1);
  assert_eq!(harness.sms_to().len(), 1);
  let stored = harness.state.repo.find_order(1).await.unwrap().unwrap();
  assert_eq!(stored.total, "10.00");
}

#[tokio::test]
async fn pagination_stops_on_short_or_empty_page() {
  let mut config = AppConfig::for_tests(SECRET);
  config.sync_page_size = 2;

  let short_last = FakeCommerce::default().with_pages(
    Collection::Products,
    vec![
      vec![json!({"id": 1}), json!({"id": 2})],
      vec![json!({"id": 3})],
    ],
  );
  let harness = TestHarness::with_config(short_last, config.clone());
  let summary = run_sync(&harness.state, Collection::Products).await.unwrap();
  assert_eq!(summary.pages, 2);
  assert_eq!(summary.fetched, 3);
  assert_eq!(summary.upserted, 3);
  assert_eq!(harness.commerce.page_requests.lock().len(), 2);

  let exact_fit = FakeCommerce::default().with_pages(
    Collection::Products,
    vec![
      vec![json!({"id": 1}), json!({"id": 2})],
      vec![json!({"id": 3}), json!({"id": 4})],
    ],
  );
  let harness = TestHarness::with_config(exact_fit, config);
  let summary = run_sync(&harness.state, Collection::Products).await.unwrap();
  assert_eq!(summary.pages, 2);
  assert_eq!(summary.fetched, 4);
  assert_eq!(harness.commerce.page_requests.lock().len(), 3);
}

#[tokio::test]
async fn empty_upstream_yields_zero_summary() {
  let harness = TestHarness::new(FakeCommerce::default());
  let summary = run_sync(&harness.state, Collection::Orders).await.unwrap();
  assert_eq!(summary.fetched, 0);
  assert_eq!(summary.upserted, 0);
  assert_eq!(summary.notified, 0);
}

#[tokio::test]
async fn records_without_id_are_skipped() {
  let commerce = FakeCommerce::default().with_pages(
    Collection::Vendors,
    vec![vec![json!({"id": 5, "store_name": "Spice Hub"}), json!({"store_name": "No id"})]],
  );
  let harness = TestHarness::new(commerce);
  let summary = run_sync(&harness.state, Collection::Vendors).await.unwrap();
  assert_eq!(summary.fetched, 2);
  assert_eq!(summary.upserted, 1);
  assert_eq!(harness.state.repo.list_vendors().await.unwrap().len(), 1);
  // Vendors page with their own size.
  assert_eq!(harness.commerce.page_requests.lock()[0].2, 50);
}

#[actix_web::test]
async fn upstream_failure_surfaces_as_sync_error() {
  let commerce = FakeCommerce::default();
  *commerce.fail_fetch.lock() = Some("HTTP 503".to_string());
  let harness = TestHarness::new(commerce);

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(harness.state.clone()))
      .configure(configure_app_routes),
  )
  .await;
  let resp = test::call_service(&app, test::TestRequest::post().uri("/api/products/sync").to_request()).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: JsonValue = test::read_body_json(resp).await;
  assert_eq!(body["success"], json!(false));
  assert!(body["message"].as_str().unwrap().contains("HTTP 503"));
}
