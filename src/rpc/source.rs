use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::RpcClient;
use crate::errors::FetchError;
use crate::models::rule::ApprovalRule;

/// Route serving the dashboard's rule snapshot.
pub const DASHBOARD_ROUTE: &str = "/kh_approvals/dashboard";

/// Where a dashboard gets its approval rules from.
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch_rules(&self) -> Result<Vec<ApprovalRule>, FetchError>;
}

/// Reads rules over JSON-RPC from [`DASHBOARD_ROUTE`].
#[derive(Clone)]
pub struct HttpRuleSource {
    client: Arc<RpcClient>,
    route: String,
}

impl HttpRuleSource {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self {
            client,
            route: DASHBOARD_ROUTE.to_string(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }
}

#[async_trait]
impl RuleSource for HttpRuleSource {
    async fn fetch_rules(&self) -> Result<Vec<ApprovalRule>, FetchError> {
        let result = self.client.query(&self.route, json!({})).await?;
        parse_rules(result)
    }
}

/// The payload must be an array; its elements are taken as-is, in order.
pub fn parse_rules(result: Value) -> Result<Vec<ApprovalRule>, FetchError> {
    match result {
        Value::Array(items) => Ok(items.into_iter().map(ApprovalRule::new).collect()),
        other => Err(FetchError::InvalidPayload(format!(
            "expected an array of rules, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
