//! JSON-RPC 2.0 envelope used by the server's `type='json'` HTTP routes.
//!
//! Every route is invoked with method `call`; the route itself is selected
//! by the URL path, not by the method name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CALL_METHOD: &str = "call";

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn call(id: u64, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: CALL_METHOD,
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[allow(dead_code)]
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Server-side exception text, when the server attached one
    /// (`data.message`).
    pub fn detail(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "JSON-RPC error {}: {} ({})", self.code, self.message, detail),
            None => write!(f, "JSON-RPC error {}: {}", self.code, self.message),
        }
    }
}
