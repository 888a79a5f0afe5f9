use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::rpc::types::JsonRpcError;
use crate::view::ViewStatus;

/// Failure at the fetch boundary: anything between issuing the read call
/// and holding a well-formed rule sequence.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Rpc(JsonRpcError),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("view is not ready to render (status: {0:?})")]
    NotReady(ViewStatus),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("activation cancelled: view was disposed")]
    Cancelled,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("action already registered: {0}")]
    DuplicateAction(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            DashboardError::Fetch(FetchError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "fetch_error",
                "fetch_timeout",
                "approval rules request timed out".to_string(),
            ),
            DashboardError::Fetch(e) => (
                StatusCode::BAD_GATEWAY,
                "fetch_error",
                "fetch_failed",
                e.to_string(),
            ),
            DashboardError::UnknownAction(tag) => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "unknown_action",
                format!("no action registered under '{}'", tag),
            ),
            DashboardError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "cancelled",
                "activation_cancelled",
                "view was torn down before it finished loading".to_string(),
            ),
            DashboardError::Render(e) => {
                tracing::error!("Render error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "render_error",
                    "render_failed",
                    e.to_string(),
                )
            }
            DashboardError::DuplicateAction(_) | DashboardError::Config(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
