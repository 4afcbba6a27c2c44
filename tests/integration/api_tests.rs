//! Integration tests for the read API
//!
//! Routes are driven in-process with `tower::ServiceExt::oneshot`; the
//! refresh endpoint scrapes a wiremock page into a temporary database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use garden_stock::config::ScraperConfig;
use garden_stock::schedule::{AdaptiveScheduler, SchedulePolicy};
use garden_stock::scrape::StockScraper;
use garden_stock::server::{build_router, AppState};
use garden_stock::storage::{open_shared_storage, SharedStorage, Storage};
use garden_stock::{Category, StockItem};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREFIX: &str = "/api/grow-a-garden";

struct TestApp {
    router: Router,
    storage: SharedStorage,
    _temp_dir: TempDir,
}

fn create_app(target_url: &str, api_prefix: &str) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_shared_storage(&temp_dir.path().join("stock.db")).unwrap();

    let config = ScraperConfig {
        target_url: target_url.to_string(),
        user_agent: "GardenStockTest/1.0".to_string(),
        timeout_secs: 5,
    };
    let scraper = StockScraper::new(config, storage.clone()).unwrap();
    let scheduler = AdaptiveScheduler::new(scraper, SchedulePolicy::default());

    let router = build_router(AppState {
        scheduler,
        storage: storage.clone(),
        api_prefix: api_prefix.to_string(),
    });

    TestApp {
        router,
        storage,
        _temp_dir: temp_dir,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn mount_stock_page(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/stock"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_home_lists_endpoints() {
    let app = create_app("http://127.0.0.1:9/stock", PREFIX);

    let (status, body) = get(&app.router, "/").await;

    assert_eq!(status, StatusCode::OK);
    let endpoints = body["endpoints"].as_object().unwrap();
    assert!(endpoints.contains_key("/api/grow-a-garden/stock"));
    assert!(endpoints.contains_key("/api/grow-a-garden/stock/refresh"));
    assert_eq!(
        body["categories"],
        serde_json::json!(["seeds", "gear", "egg_shop", "honey", "cosmetics"])
    );
}

#[tokio::test]
async fn test_stock_before_any_scrape() {
    let app = create_app("http://127.0.0.1:9/stock", PREFIX);

    let (status, body) = get(&app.router, "/api/grow-a-garden/stock").await;

    assert_eq!(status, StatusCode::OK);
    for key in ["seeds", "gear", "egg_shop", "honey", "cosmetics"] {
        assert_eq!(body[key], serde_json::json!([]), "category {}", key);
    }
    assert!(body["last_updated"].is_null());
}

#[tokio::test]
async fn test_category_lookup() {
    let app = create_app("http://127.0.0.1:9/stock", PREFIX);
    app.storage
        .lock()
        .unwrap()
        .replace_category(
            Category::Gear,
            &[StockItem::new("Trowel", 2), StockItem::new("Sprinkler", 1)],
            Utc::now(),
        )
        .unwrap();

    let (status, body) = get(&app.router, "/api/grow-a-garden/stock?category=gear").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gear"][0]["name"], "Trowel");
    assert_eq!(body["gear"][0]["stock"], 2);
    assert_eq!(body["gear"][1]["name"], "Sprinkler");
    assert!(body["last_updated"].is_string());
    assert!(body.get("seeds").is_none());
}

#[tokio::test]
async fn test_unknown_or_empty_category_is_not_found() {
    let app = create_app("http://127.0.0.1:9/stock", PREFIX);

    let (status, body) = get(&app.router, "/api/grow-a-garden/stock?category=fruit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("fruit"));

    let (status, _) = get(&app.router, "/api/grow-a-garden/stock?category=honey").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_sets_last_updated() {
    let mock_server = MockServer::start().await;
    mount_stock_page(
        &mock_server,
        200,
        r#"<html><body><div class="grid">
            <div><h2>Seeds Stock</h2><p>UPDATES IN: 02m 00s</p>
                <ul><li>Carrot x10</li><li>Potato</li></ul></div>
            <div><h2>Cosmetics Stock</h2><p>UPDATES IN: 1h 13m 56s</p>
                <ul><li>Garden Gnome</li></ul></div>
        </div></body></html>"#,
    )
    .await;
    let app = create_app(&format!("{}/stock", mock_server.uri()), PREFIX);

    let before = Utc::now() - chrono::Duration::seconds(1);
    let (status, body) = get(&app.router, "/api/grow-a-garden/stock/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    let last_updated: DateTime<Utc> = body["last_updated"].as_str().unwrap().parse().unwrap();
    assert!(last_updated >= before);

    let (status, body) = get(&app.router, "/api/grow-a-garden/stock?category=seeds").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seeds"].as_array().unwrap().len(), 2);
    assert_eq!(body["seeds"][1]["name"], "Potato");
    assert_eq!(body["seeds"][1]["stock"], 1);

    let (_, body) = get(&app.router, "/api/grow-a-garden/stock").await;
    assert_eq!(body["cosmetics"][0]["name"], "Garden Gnome");
    assert_eq!(body["gear"], serde_json::json!([]));
}

#[tokio::test]
async fn test_failed_refresh_still_answers() {
    let mock_server = MockServer::start().await;
    mount_stock_page(&mock_server, 500, "boom").await;
    let app = create_app(&format!("{}/stock", mock_server.uri()), PREFIX);

    let (status, body) = get(&app.router, "/api/grow-a-garden/stock/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["last_updated"].is_null());
}

#[tokio::test]
async fn test_empty_prefix_serves_at_root() {
    let app = create_app("http://127.0.0.1:9/stock", "");

    let (status, _) = get(&app.router, "/stock").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app.router, "/api/grow-a-garden/stock").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
