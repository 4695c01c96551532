use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct ExporterHealth {
    pub uptime_seconds: u64,
    pub device_id: String,
    pub scrapes_total: u64,
    pub scrape_failures_total: u64,
    pub last_success: Option<String>,
    pub last_error: Option<String>,
}

/// Scrape bookkeeping for `/system/health`. Never feeds back into metric values.
#[derive(Clone)]
pub struct ScrapeTracker {
    start_time: Instant,
    scrapes: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
    last_success: Arc<Mutex<Option<OffsetDateTime>>>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl ScrapeTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            scrapes: Arc::new(AtomicU64::new(0)),
            failures: Arc::new(AtomicU64::new(0)),
            last_success: Arc::new(Mutex::new(None)),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn record_success(&self) {
        self.scrapes.fetch_add(1, Ordering::Relaxed);
        *self.last_success.lock() = Some(OffsetDateTime::now_utc());
    }

    pub fn record_failure(&self, error: &str) {
        self.scrapes.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock() = Some(error.to_string());
    }

    pub fn get_health(&self, device_id: &str) -> ExporterHealth {
        ExporterHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            device_id: device_id.to_string(),
            scrapes_total: self.scrapes.load(Ordering::Relaxed),
            scrape_failures_total: self.failures.load(Ordering::Relaxed),
            last_success: (*self.last_success.lock()).and_then(|t| t.format(&Rfc3339).ok()),
            last_error: self.last_error.lock().clone(),
        }
    }
}

impl Default for ScrapeTracker {
    fn default() -> Self {
        Self::new()
    }
}
