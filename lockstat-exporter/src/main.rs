/**
 * LOCKSTAT EXPORTER - SmartThings door lock to Prometheus
 *
 * ROLE: Bootstrap of every module: config, logging, SmartThings connector,
 * collector and HTTP server.
 *
 * FLOW: scrape -> /metrics -> collector (list devices, refresh lock, normalize
 * attributes) -> gauges. No background polling: each scrape is one cycle.
 */

mod collector;
mod config;
mod exposition;
mod health;
mod http;
mod models;
mod normalizer;
mod smartthings;

use crate::collector::LockStatsCollector;
use crate::config::ExporterConfig;
use crate::http::AppState;
use crate::smartthings::{Connector, SmartThingsConnector};

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cfg = ExporterConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.log_filter())),
        )
        .init();

    let connector = SmartThingsConnector::new(&cfg.api_token, &cfg.api_url);
    let collector = LockStatsCollector::new(connector, &cfg.device_id);

    if cfg.print_only {
        let stdout = io::stdout();
        return print_once(&collector, &mut stdout.lock())
            .await
            .context("unable to write lock stats to stdout");
    }

    let app = http::build_router(AppState::new(collector, &cfg.device_name, &cfg.metric_prefix));

    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("unable to listen on {addr}"))?;
    info!(
        "exporting lock {} as {:?} on http://{}/metrics",
        cfg.device_id, cfg.device_name, addr
    );
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(ExitCode::SUCCESS)
}

/// One cycle written as `name value` lines; exit status reflects the cycle.
async fn print_once<C: Connector>(
    collector: &LockStatsCollector<C>,
    out: &mut impl Write,
) -> io::Result<ExitCode> {
    match collector.collect().await {
        Ok(stats) => {
            write!(out, "{stats}")?;
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::tests::{schlage_attributes, FakeConnector, LOCK_ID};

    #[tokio::test]
    async fn print_once_writes_stats() {
        let collector = LockStatsCollector::new(FakeConnector::with_lock(&schlage_attributes()), LOCK_ID);
        let mut out = Vec::new();

        let code = print_once(&collector, &mut out).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "battery 47\ncodeLength 4\nlock 0\nlockCodes 3\nmaxCodes 30\n"
        );
    }

    #[tokio::test]
    async fn print_once_fails_without_lock() {
        let collector = LockStatsCollector::new(FakeConnector::with_lock(&schlage_attributes()), "gone");
        let mut out = Vec::new();

        let code = print_once(&collector, &mut out).await.unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
    }
}
