//! Integration tests for the scrape cycle
//!
//! These tests use wiremock to serve stock pages and run full cycles
//! (fetch, extract, persist, reschedule) against an SQLite file.

use chrono::Utc;
use garden_stock::config::ScraperConfig;
use garden_stock::schedule::{AdaptiveScheduler, SchedulePolicy, SchedulerState};
use garden_stock::scrape::{StockScraper, MAX_DELAY_SECS};
use garden_stock::storage::{open_shared_storage, SharedStorage, Storage};
use garden_stock::{Category, StockError, StockItem};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STOCK_PATH: &str = "/grow-a-garden/stock";

/// Creates a scraper config pointing at the mock server
fn create_test_config(base_url: &str) -> ScraperConfig {
    ScraperConfig {
        target_url: format!("{}{}", base_url, STOCK_PATH),
        user_agent: "GardenStockTest/1.0".to_string(),
        timeout_secs: 5,
    }
}

fn create_storage(dir: &TempDir) -> SharedStorage {
    open_shared_storage(&dir.path().join("stock.db")).expect("Failed to open storage")
}

async fn mount_page(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(STOCK_PATH))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

const SEEDS_PAGE: &str = r#"<html><body>
    <div class="grid grid-cols-1 md:grid-cols-3 gap-6 px-6 text-left max-w-screen-lg mx-auto">
        <div>
            <h2>Seeds</h2>
            <p>UPDATES IN: 02m 00s</p>
            <ul><li>Carrot x10</li><li>Potato</li></ul>
        </div>
    </div>
</body></html>"#;

#[tokio::test]
async fn test_single_section_cycle() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, SEEDS_PAGE).await;

    let temp_dir = TempDir::new().unwrap();
    let storage = create_storage(&temp_dir);
    let scraper = StockScraper::new(create_test_config(&mock_server.uri()), storage.clone())
        .expect("Failed to build scraper");

    let before = Utc::now();
    let report = scraper.scrape_once().await.expect("Cycle failed");

    assert_eq!(report.hypothesis, "expected-grid");
    assert_eq!(report.sections_found, 1);
    assert_eq!(report.next_run.delay_secs, 120);
    assert_eq!(report.next_run.category, Some(Category::Seeds));
    assert_eq!(report.next_delay(), Duration::from_secs(120));

    let storage = storage.lock().unwrap();
    let seeds = storage
        .load_category(Category::Seeds)
        .unwrap()
        .expect("Seeds should be stored");
    assert_eq!(
        seeds.items,
        vec![StockItem::new("Carrot", 10), StockItem::new("Potato", 1)]
    );
    assert!(seeds.captured_at >= before - chrono::Duration::seconds(1));

    let all = storage.load_all().unwrap();
    assert_eq!(all.total_items(), 2);
    assert!(all.items(Category::Gear).is_empty());
}

#[tokio::test]
async fn test_fallback_container_still_persists() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        200,
        r#"<html><body><main>
            <div>
                <h2>Gear Stock</h2>
                <p>UPDATES IN: 03m 30s</p>
                <ul><li>Trowel x2</li><li>Watering Can x5</li></ul>
            </div>
            <div>
                <h2>Egg Stock</h2>
                <p>UPDATES IN: 25m</p>
                <ul><li>Common Egg x3</li></ul>
            </div>
        </main></body></html>"#,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let storage = create_storage(&temp_dir);
    let scraper =
        StockScraper::new(create_test_config(&mock_server.uri()), storage.clone()).unwrap();

    let report = scraper.scrape_once().await.expect("Fallback cycle failed");

    assert_eq!(report.hypothesis, "main");
    assert_eq!(report.sections_found, 2);
    assert_eq!(report.next_run.delay_secs, 210);
    assert_eq!(report.next_run.category, Some(Category::Gear));
    assert_eq!(report.next_updates.get(&Category::EggShop), Some(&1500));

    let storage = storage.lock().unwrap();
    assert_eq!(storage.count_items().unwrap(), 3);
    let eggs = storage.load_category(Category::EggShop).unwrap().unwrap();
    assert_eq!(eggs.items, vec![StockItem::new("Common Egg", 3)]);
}

#[tokio::test]
async fn test_missing_structure_writes_nothing() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        200,
        "<html><body><p>Down for maintenance</p></body></html>",
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let storage = create_storage(&temp_dir);
    storage
        .lock()
        .unwrap()
        .replace_category(Category::Honey, &[StockItem::new("Honey Comb", 4)], Utc::now())
        .unwrap();

    let scraper =
        StockScraper::new(create_test_config(&mock_server.uri()), storage.clone()).unwrap();
    let err = scraper.scrape_once().await.unwrap_err();

    assert!(matches!(err, StockError::StructureNotFound { .. }));

    let storage = storage.lock().unwrap();
    assert_eq!(storage.count_items().unwrap(), 1);
    let honey = storage.load_category(Category::Honey).unwrap().unwrap();
    assert_eq!(honey.items, vec![StockItem::new("Honey Comb", 4)]);
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 503, "Service Unavailable").await;

    let temp_dir = TempDir::new().unwrap();
    let scraper =
        StockScraper::new(create_test_config(&mock_server.uri()), create_storage(&temp_dir))
            .unwrap();

    let err = scraper.scrape_once().await.unwrap_err();
    assert!(matches!(err, StockError::HttpStatus { status: 503, .. }));
    assert!(err.is_fetch_failure());
}

#[tokio::test]
async fn test_fetch_failure_backs_off() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 500, "boom").await;

    let temp_dir = TempDir::new().unwrap();
    let scraper =
        StockScraper::new(create_test_config(&mock_server.uri()), create_storage(&temp_dir))
            .unwrap();
    let scheduler = AdaptiveScheduler::new(scraper, SchedulePolicy::default());

    let outcome = scheduler.refresh_now().await;
    assert!(outcome.is_err());

    match scheduler.state() {
        SchedulerState::Armed { delay, .. } => assert_eq!(delay, Duration::from_secs(120)),
        other => panic!("Expected an armed timer, got {:?}", other),
    }
    scheduler.stop();
}

#[tokio::test]
async fn test_huge_countdown_is_capped() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        200,
        r#"<html><body><div class="grid">
            <div><h2>Seeds Stock</h2><p>UPDATES IN: 9999999999999999h</p>
                <ul><li>Carrot x1</li></ul></div>
        </div></body></html>"#,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let scraper =
        StockScraper::new(create_test_config(&mock_server.uri()), create_storage(&temp_dir))
            .unwrap();
    let scheduler = AdaptiveScheduler::new(scraper, SchedulePolicy::default());

    let report = scheduler.refresh_now().await.expect("Cycle failed");
    assert_eq!(report.next_run.delay_secs, u64::MAX);

    match scheduler.state() {
        SchedulerState::Armed { delay, .. } => {
            assert_eq!(delay, Duration::from_secs(MAX_DELAY_SECS))
        }
        other => panic!("Expected an armed timer, got {:?}", other),
    }

    // Still able to run after the capped re-arm
    assert!(scheduler.refresh_now().await.is_ok());
    scheduler.stop();
}

#[tokio::test]
async fn test_scheduler_first_run_persists() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, SEEDS_PAGE).await;

    let temp_dir = TempDir::new().unwrap();
    let storage = create_storage(&temp_dir);
    let scraper =
        StockScraper::new(create_test_config(&mock_server.uri()), storage.clone()).unwrap();
    let scheduler = AdaptiveScheduler::new(scraper, SchedulePolicy::default());

    scheduler.start(true);

    let mut stored = 0;
    for _ in 0..50 {
        stored = storage.lock().unwrap().count_items().unwrap();
        if stored > 0 && matches!(scheduler.state(), SchedulerState::Armed { .. }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(stored, 2);
    match scheduler.state() {
        SchedulerState::Armed { delay, .. } => assert_eq!(delay, Duration::from_secs(120)),
        other => panic!("Expected an armed timer, got {:?}", other),
    }
    scheduler.stop();
}

#[tokio::test]
async fn test_rescrape_replaces_previous_snapshot() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let storage = create_storage(&temp_dir);
    let config = create_test_config(&mock_server.uri());

    mount_page(&mock_server, 200, SEEDS_PAGE).await;
    let scraper = StockScraper::new(config.clone(), storage.clone()).unwrap();
    scraper.scrape_once().await.unwrap();

    mock_server.reset().await;
    mount_page(
        &mock_server,
        200,
        r#"<html><body><div class="grid">
            <div><h2>Seeds Stock</h2><p>UPDATES IN: 04m</p><ul><li>Tomato x3</li></ul></div>
        </div></body></html>"#,
    )
    .await;
    let report = scraper.scrape_once().await.unwrap();

    assert_eq!(report.hypothesis, "grid-class");
    let seeds = storage
        .lock()
        .unwrap()
        .load_category(Category::Seeds)
        .unwrap()
        .unwrap();
    assert_eq!(seeds.items, vec![StockItem::new("Tomato", 3)]);
}
