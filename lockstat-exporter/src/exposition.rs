//! Prometheus rendering of one collection cycle.
//!
//! A fresh registry is built per scrape so nothing survives between cycles:
//! an attribute missing from this cycle's stats has no sample at all.

use crate::collector::LockStats;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

pub const DEFAULT_PREFIX: &str = "smartthings_doorlock";
pub const DEVICE_LABEL: &str = "device";

/// clap value parser: the prefix must itself be a valid metric name.
pub fn parse_prefix(prefix: &str) -> Result<String, String> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if valid {
        Ok(prefix.to_string())
    } else {
        Err(format!("{prefix:?} is not a valid metric name prefix ([a-zA-Z_:][a-zA-Z0-9_:]*)"))
    }
}

pub fn metric_name(prefix: &str, attribute: &str) -> String {
    format!("{}_{}", prefix, attribute.replace(' ', "_"))
}

/// Renders every entry of `stats` as a gauge labelled with `device_name`.
pub fn render(stats: &LockStats, device_name: &str, prefix: &str) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    for (attribute, value) in stats.iter() {
        let opts = Opts::new(metric_name(prefix, attribute.name()), attribute.help());
        let gauge = GaugeVec::new(opts, &[DEVICE_LABEL])?;
        gauge.with_label_values(&[device_name]).set(value);
        registry.register(Box::new(gauge))?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
