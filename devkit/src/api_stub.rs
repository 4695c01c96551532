/*!
Fake SmartThings cloud API for development without an account.

Serves `GET /devices` (paginated, `_links.next`) and
`GET /devices/{id}/status` on `127.0.0.1:<ephemeral>`, checks the bearer
token, records every request path and can be told to fail.
*/

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Default)]
struct ApiState {
    token: String,
    base_url: String,
    devices: Vec<Value>,
    statuses: HashMap<String, Value>,
    page_size: Option<usize>,
    fail_list: bool,
    fail_status: bool,
    requests: Vec<String>,
}

#[derive(Clone)]
pub struct FakeSmartThings {
    state: Arc<Mutex<ApiState>>,
    addr: SocketAddr,
}

impl FakeSmartThings {
    /// Binds an ephemeral port and serves until the runtime shuts down.
    pub async fn spawn(token: &str) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            token: token.to_string(),
            base_url: format!("http://{addr}"),
            ..ApiState::default()
        }));
        let api = Self { state, addr };

        let app = Router::new()
            .route("/devices", get(list_devices))
            .route("/devices/{id}/status", get(device_status))
            .with_state(api.clone());

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("[FAKE] SmartThings stub stopped: {}", e);
            }
        });

        log::info!("[FAKE] SmartThings API listening on http://{}", addr);
        Ok(api)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_device(&self, device: Value) {
        self.state.lock().unwrap().devices.push(device);
    }

    pub fn remove_device(&self, device_id: &str) {
        self.state
            .lock()
            .unwrap()
            .devices
            .retain(|d| d["deviceId"] != device_id);
    }

    pub fn set_status(&self, device_id: &str, status: Value) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(device_id.to_string(), status);
    }

    pub fn set_page_size(&self, size: usize) {
        self.state.lock().unwrap().page_size = Some(size.max(1));
    }

    /// `GET /devices` answers 503 while set.
    pub fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    /// `GET /devices/{id}/status` answers 500 while set.
    pub fn fail_status(&self, fail: bool) {
        self.state.lock().unwrap().fail_status = fail;
    }

    /// Number of requests received for `path` (query string excluded).
    pub fn request_count(&self, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    fn record(&self, path: String, headers: &HeaderMap) -> Result<(), StatusCode> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(path);
        let expected = format!("Bearer {}", state.token);
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == expected)
            .unwrap_or(false);
        if authorized {
            Ok(())
        } else {
            log::warn!("[FAKE] rejected request with bad token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<usize>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    let body = json!({ "requestId": "fake", "error": { "code": status.as_u16().to_string(), "message": message } });
    (status, Json(body)).into_response()
}

async fn list_devices(
    State(api): State<FakeSmartThings>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    if let Err(status) = api.record("/devices".to_string(), &headers) {
        return error_body(status, "Unauthorized");
    }

    let state = api.state.lock().unwrap();
    if state.fail_list {
        return error_body(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable");
    }

    let page = params.page.unwrap_or(0);
    let size = state.page_size.unwrap_or(state.devices.len().max(1));
    let items: Vec<Value> = state.devices.iter().skip(page * size).take(size).cloned().collect();
    let has_more = (page + 1) * size < state.devices.len();

    let mut links = json!({});
    if has_more {
        links["next"] = json!({ "href": format!("{}/devices?page={}", state.base_url, page + 1) });
    }
    Json(json!({ "items": items, "_links": links })).into_response()
}

async fn device_status(
    State(api): State<FakeSmartThings>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(status) = api.record(format!("/devices/{id}/status"), &headers) {
        return error_body(status, "Unauthorized");
    }

    let state = api.state.lock().unwrap();
    if state.fail_status {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
    }
    match state.statuses.get(&id) {
        Some(status) => Json(status.clone()).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Device not found"),
    }
}
