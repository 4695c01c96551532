//! Lock Stats Collector: one locate / refresh / translate cycle per call.
//!
//! Each cycle opens its own API session and drops it before returning, on
//! success and on every error. A translation error aborts the whole cycle:
//! callers either get every tracked attribute the lock reported or nothing.

use crate::health::ScrapeTracker;
use crate::normalizer::{self, TrackedAttribute, TranslationError};
use crate::smartthings::{ClientError, Connector, DeviceStatusClient};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("unable to open API session: {0}")]
    Connect(#[source] ClientError),
    #[error("unable to list devices: {0}")]
    ListDevices(#[source] ClientError),
    #[error("unable to find lock device {0}")]
    DeviceNotFound(String),
    #[error("unable to refresh lock device {device_id}: {source}")]
    Refresh { device_id: String, source: ClientError },
    #[error("attribute {attribute}: {source}")]
    Translation { attribute: String, source: TranslationError },
}

/// Tracked attribute -> gauge value for one collection cycle.
///
/// Every key is optional: an attribute the lock did not report is absent,
/// never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockStats {
    values: BTreeMap<TrackedAttribute, f64>,
}

impl LockStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attribute: TrackedAttribute, value: f64) {
        self.values.insert(attribute, value);
    }

    #[cfg(test)]
    pub fn get(&self, attribute: TrackedAttribute) -> Option<f64> {
        self.values.get(&attribute).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackedAttribute, f64)> + '_ {
        self.values.iter().map(|(a, v)| (*a, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for LockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (attribute, value) in self.iter() {
            writeln!(f, "{attribute} {value}")?;
        }
        Ok(())
    }
}

pub struct LockStatsCollector<C> {
    connector: C,
    device_id: String,
}

impl<C: Connector> LockStatsCollector<C> {
    pub fn new(connector: C, device_id: impl Into<String>) -> Self {
        Self { connector, device_id: device_id.into() }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub async fn collect(&self) -> Result<LockStats, CollectError> {
        let client = self.connector.connect().map_err(CollectError::Connect)?;

        let devices = client.list_devices().await.map_err(CollectError::ListDevices)?;
        let mut device = devices
            .into_iter()
            .find(|d| d.device_id == self.device_id)
            .ok_or_else(|| CollectError::DeviceNotFound(self.device_id.clone()))?;

        client.refresh(&mut device).await.map_err(|source| CollectError::Refresh {
            device_id: self.device_id.clone(),
            source,
        })?;

        let mut stats = LockStats::new();
        for (name, attribute) in client.read_attributes(&device) {
            let translated = normalizer::normalize(name, &attribute.value).map_err(|source| {
                CollectError::Translation { attribute: name.clone(), source }
            })?;
            match translated {
                Some((tracked, reading)) => stats.insert(tracked, reading.value()),
                None => trace!(
                    "skipping {} = {} {}",
                    name,
                    attribute.value,
                    attribute.unit.as_deref().unwrap_or("")
                ),
            }
        }

        debug!(
            "collected {} of {} tracked attributes from {}",
            stats.len(),
            TrackedAttribute::ALL.len(),
            device.display_name()
        );
        Ok(stats)
    }

    /// Cycle boundary: failures are logged, recorded in `tracker` and yield
    /// an empty mapping.
    pub async fn poll(&self, tracker: &ScrapeTracker) -> LockStats {
        match self.collect().await {
            Ok(stats) => {
                tracker.record_success();
                stats
            }
            Err(e) => {
                match &e {
                    CollectError::DeviceNotFound(_) => warn!("{}", e),
                    _ => error!("lock stats collection failed: {}", e),
                }
                tracker.record_failure(&e.to_string());
                LockStats::new()
            }
        }
    }
}
