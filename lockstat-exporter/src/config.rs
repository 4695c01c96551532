use crate::exposition::{self, DEFAULT_PREFIX};
use crate::smartthings::DEFAULT_API_URL;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// Schlage door lock Prometheus exporter via the Samsung SmartThings API.
#[derive(Debug, Clone, Parser)]
#[command(name = "lockstat-exporter", version)]
pub struct ExporterConfig {
    /// SmartThings personal access token.
    #[arg(long, env = "SMARTTHINGS_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// deviceId of the lock to export.
    #[arg(long, env = "SMARTTHINGS_DEVICE_ID")]
    pub device_id: String,

    /// Value of the `device` label on every sample.
    #[arg(long, env = "SMARTTHINGS_DEVICE_NAME", default_value = "front_door")]
    pub device_name: String,

    #[arg(long, env = "SSDE_PORT", default_value_t = 6970)]
    pub port: u16,

    #[arg(long, env = "SSDE_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Base URL of the SmartThings REST API.
    #[arg(long, env = "SMARTTHINGS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Prefix of every gauge name, `[a-zA-Z_:][a-zA-Z0-9_:]*`.
    #[arg(
        long,
        env = "SSDE_METRIC_PREFIX",
        default_value = DEFAULT_PREFIX,
        value_parser = exposition::parse_prefix
    )]
    pub metric_prefix: String,

    /// Verbose logging.
    #[arg(short, long, env = "SSDE_DEBUG")]
    pub debug: bool,

    /// Collect once, print the stats and exit.
    #[arg(short, long = "print")]
    pub print_only: bool,
}

impl ExporterConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "lockstat_exporter=debug,info"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ExporterConfig {
        let mut argv = vec!["lockstat-exporter", "--api-token", "t0k3n", "--device-id", "lock-1"];
        argv.extend_from_slice(args);
        ExporterConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let cfg = parse(&[]);
        assert_eq!(cfg.device_name, "front_door");
        assert_eq!(cfg.listen_addr(), "0.0.0.0:6970".parse().unwrap());
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.metric_prefix, DEFAULT_PREFIX);
        assert!(!cfg.debug);
        assert!(!cfg.print_only);
        assert_eq!(cfg.log_filter(), "info");
    }

    #[test]
    fn flags() {
        let cfg = parse(&["-d", "-p", "--port", "9999", "--bind", "127.0.0.1", "--device-name", "garage"]);
        assert!(cfg.debug);
        assert!(cfg.print_only);
        assert_eq!(cfg.listen_addr(), "127.0.0.1:9999".parse().unwrap());
        assert_eq!(cfg.device_name, "garage");
        assert!(cfg.log_filter().contains("debug"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let argv = ["lockstat-exporter", "--api-token", "t", "--device-id", "d", "--port", "http"];
        assert!(ExporterConfig::try_parse_from(argv).is_err());
    }

    #[test]
    fn invalid_metric_prefix_is_rejected() {
        let argv = ["lockstat-exporter", "--api-token", "t", "--device-id", "d", "--metric-prefix", "smartthings-doorlock"];
        assert!(ExporterConfig::try_parse_from(argv).is_err());
        assert_eq!(parse(&["--metric-prefix", "ssde"]).metric_prefix, "ssde");
    }
}
