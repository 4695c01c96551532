/*!
 * HTTP surface of the exporter
 *
 * - GET /metrics        : one collection cycle, rendered as Prometheus gauges
 * - GET /health         : liveness, always "ok"
 * - GET /system/health  : scrape counters and last error as JSON
 *
 * A failed collection still answers 200 with an empty body: the scraper sees
 * a gap in the series, never an error status.
 */

use crate::collector::LockStatsCollector;
use crate::exposition;
use crate::health::{ExporterHealth, ScrapeTracker};
use crate::smartthings::Connector;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use prometheus::TEXT_FORMAT;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

pub struct AppState<C> {
    pub collector: Arc<LockStatsCollector<C>>,
    pub device_name: String,
    pub metric_prefix: String,
    pub tracker: ScrapeTracker,
    /// Held for a whole scrape: collections never overlap.
    pub scrape_lock: Arc<Mutex<()>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            device_name: self.device_name.clone(),
            metric_prefix: self.metric_prefix.clone(),
            tracker: self.tracker.clone(),
            scrape_lock: self.scrape_lock.clone(),
        }
    }
}

impl<C: Connector> AppState<C> {
    pub fn new(collector: LockStatsCollector<C>, device_name: &str, metric_prefix: &str) -> Self {
        Self {
            collector: Arc::new(collector),
            device_name: device_name.to_string(),
            metric_prefix: metric_prefix.to_string(),
            tracker: ScrapeTracker::new(),
            scrape_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn build_router<C: Connector>(app_state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health::<C>))
        .route("/metrics", get(get_metrics::<C>))
        .with_state(app_state)
}

// GET /metrics
async fn get_metrics<C: Connector>(State(app): State<AppState<C>>) -> impl IntoResponse {
    let _scrape = app.scrape_lock.lock().await;
    let stats = app.collector.poll(&app.tracker).await;

    let body = exposition::render(&stats, &app.device_name, &app.metric_prefix).unwrap_or_else(|e| {
        error!("unable to render lock stats: {}", e);
        String::new()
    });
    if stats.is_empty() {
        debug!("scrape served no samples");
    } else {
        debug!("scrape served {} samples", stats.len());
    }
    ([(CONTENT_TYPE, TEXT_FORMAT)], body)
}

// GET /system/health
async fn get_system_health<C: Connector>(State(app): State<AppState<C>>) -> Json<ExporterHealth> {
    Json(app.tracker.get_health(app.collector.device_id()))
}
