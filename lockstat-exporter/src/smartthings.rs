//! Device Status Client for the SmartThings cloud API.
//!
//! A [`Connector`] holds the credentials and hands out one
//! [`DeviceStatusClient`] session per collection cycle. The session owns its
//! HTTP connection pool, so dropping it releases every connection.

use crate::models::{AttributeMap, Device, DeviceListPage, DeviceStatusResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.smartthings.com/v1";
const MAIN_COMPONENT: &str = "main";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered {status}")]
    Status { status: StatusCode, url: String },
    #[error("invalid API token")]
    InvalidToken,
}

#[async_trait]
pub trait DeviceStatusClient: Send + Sync {
    /// Every device visible with the configured credentials.
    async fn list_devices(&self) -> Result<Vec<Device>, ClientError>;

    /// Re-reads the current attribute values of `device` from the API.
    async fn refresh(&self, device: &mut Device) -> Result<(), ClientError>;

    fn read_attributes<'a>(&self, device: &'a Device) -> &'a AttributeMap {
        &device.attributes
    }
}

/// Opens one client session per collection cycle.
pub trait Connector: Send + Sync + 'static {
    type Client: DeviceStatusClient;

    fn connect(&self) -> Result<Self::Client, ClientError>;
}

#[derive(Clone)]
pub struct SmartThingsConnector {
    api_token: String,
    api_url: String,
}

impl SmartThingsConnector {
    pub fn new(api_token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Connector for SmartThingsConnector {
    type Client = SmartThingsClient;

    fn connect(&self) -> Result<SmartThingsClient, ClientError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_token))
            .map_err(|_| ClientError::InvalidToken)?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("lockstat-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(SmartThingsClient { http, api_url: self.api_url.clone() })
    }
}

pub struct SmartThingsClient {
    http: reqwest::Client,
    api_url: String,
}

impl SmartThingsClient {
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status, url: url.to_string() });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeviceStatusClient for SmartThingsClient {
    async fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
        let mut devices = Vec::new();
        let mut next = Some(format!("{}/devices", self.api_url));

        while let Some(url) = next.take() {
            let page: DeviceListPage = self.get_json(&url).await?;
            devices.extend(page.items.into_iter().map(Device::from));
            next = page.links.and_then(|l| l.next).map(|l| l.href);
        }

        debug!("listed {} devices", devices.len());
        Ok(devices)
    }

    async fn refresh(&self, device: &mut Device) -> Result<(), ClientError> {
        let url = format!("{}/devices/{}/status", self.api_url, device.device_id);
        let status: DeviceStatusResponse = self.get_json(&url).await?;
        device.attributes = status.into_attributes(MAIN_COMPONENT);
        debug!(
            "refreshed {} ({} attributes)",
            device.display_name(),
            device.attributes.len()
        );
        Ok(())
    }
}
