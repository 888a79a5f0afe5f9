//! RPC client: JSON-RPC 2.0 over HTTP POST against `type='json'` routes.
//!
//! One request per call, no retries. Timeouts and transport failures are
//! surfaced as [`FetchError`] and left to the caller.

use reqwest::header::{HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::types::{JsonRpcRequest, JsonRpcResponse};
use crate::config::Config;
use crate::errors::{DashboardError, FetchError};

pub struct RpcClient {
    base_url: String,
    session_id: Option<String>,
    http: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(
        base_url: impl Into<String>,
        session_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DashboardError> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("kh-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashboardError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id,
            http,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, DashboardError> {
        Self::new(cfg.server_url.clone(), cfg.session_id.clone(), cfg.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    fn url_for(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }

    /// Call a JSON route and return its `result` member.
    pub async fn query(&self, route: &str, params: Value) -> Result<Value, FetchError> {
        let id = self.next_id();
        let req = JsonRpcRequest::call(id, params);
        let url = self.url_for(route);

        let mut http_req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(sid) = &self.session_id {
            http_req = http_req.header(COOKIE, format!("session_id={}", sid));
        }

        tracing::debug!(url = %url, rpc_id = id, "issuing rpc call");

        let resp = http_req.json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = resp.text().await?;
        let rpc_resp: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::InvalidPayload(format!(
                "not a JSON-RPC response: {} (body: {})",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })?;

        if let Some(err) = rpc_resp.error {
            return Err(FetchError::Rpc(err));
        }

        rpc_resp
            .result
            .ok_or_else(|| FetchError::InvalidPayload("response missing both result and error".into()))
    }
}

// ── Tests ──────────────────────────────────────────────────────
