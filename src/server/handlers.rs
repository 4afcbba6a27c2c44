//! Read API handlers

use crate::schedule::{AdaptiveScheduler, CycleRunner};
use crate::server::errors::ApiError;
use crate::stock::{Category, CategorySnapshot, StockSnapshot};
use crate::storage::{SharedStorage, SqliteStorage, Storage, StorageError};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::{Arc, MutexGuard};

/// State shared by every handler
pub struct AppState<R> {
    pub scheduler: Arc<AdaptiveScheduler<R>>,
    pub storage: SharedStorage,
    /// Path prefix of the stock routes, e.g. `/api/grow-a-garden`
    pub api_prefix: String,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            storage: Arc::clone(&self.storage),
            api_prefix: self.api_prefix.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StockQuery {
    pub category: Option<String>,
}

/// `GET /`: static listing of the endpoints and category keys
pub async fn home<R: CycleRunner>(State(state): State<AppState<R>>) -> Json<Value> {
    let prefix = state.api_prefix.as_str();
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.to_db_string()).collect();

    Json(json!({
        "message": "Grow a Garden stock API",
        "endpoints": {
            (format!("{}/stock", prefix)): "GET - all stock data",
            (format!("{}/stock?category=CATEGORY", prefix)): "GET - stock data for one category",
            (format!("{}/stock/refresh", prefix)): "GET - force a refresh",
        },
        "categories": categories,
    }))
}

/// `GET <prefix>/stock[?category=C]`
///
/// An empty `category` parameter is treated as absent.
pub async fn stock<R: CycleRunner>(
    State(state): State<AppState<R>>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Value>, ApiError> {
    match query.category.filter(|key| !key.is_empty()) {
        Some(key) => {
            let snapshot = match Category::from_db_string(&key) {
                Some(category) => load_category(&state.storage, category)?,
                None => None,
            };
            let snapshot = snapshot.ok_or(ApiError::CategoryNotFound(key))?;
            Ok(Json(category_body(&snapshot)))
        }
        None => {
            let snapshot = load_all(&state.storage)?;
            Ok(Json(snapshot_body(&snapshot)))
        }
    }
}

/// `GET <prefix>/stock/refresh`
///
/// Runs one cycle through the scheduler, so it never overlaps a timer run.
/// A failed cycle is logged and the stored (possibly stale) data is reported.
pub async fn refresh<R: CycleRunner>(
    State(state): State<AppState<R>>,
) -> Result<Json<Value>, ApiError> {
    match state.scheduler.refresh_now().await {
        Ok(report) => tracing::info!(
            "Forced refresh stored {} items",
            report.total_items()
        ),
        Err(e) => tracing::warn!("Forced refresh failed, serving stored data: {}", e),
    }

    let snapshot = load_all(&state.storage)?;
    Ok(Json(json!({
        "message": "Stock data refreshed",
        "last_updated": snapshot.last_updated,
    })))
}

fn lock_storage(storage: &SharedStorage) -> Result<MutexGuard<'_, SqliteStorage>, StorageError> {
    storage.lock().map_err(|_| StorageError::LockPoisoned)
}

fn load_all(storage: &SharedStorage) -> Result<StockSnapshot, StorageError> {
    lock_storage(storage)?.load_all()
}

fn load_category(
    storage: &SharedStorage,
    category: Category,
) -> Result<Option<CategorySnapshot>, StorageError> {
    lock_storage(storage)?.load_category(category)
}

/// `{seeds: [..], gear: [..], .., last_updated}`
fn snapshot_body(snapshot: &StockSnapshot) -> Value {
    let mut body = Map::new();
    for (category, items) in &snapshot.categories {
        body.insert(category.to_db_string().to_string(), json!(items));
    }
    body.insert("last_updated".to_string(), json!(snapshot.last_updated));
    Value::Object(body)
}

/// `{<category>: [..], last_updated}`
fn category_body(snapshot: &CategorySnapshot) -> Value {
    let mut body = Map::new();
    body.insert(
        snapshot.category.to_db_string().to_string(),
        json!(snapshot.items),
    );
    body.insert("last_updated".to_string(), json!(snapshot.captured_at));
    Value::Object(body)
}
