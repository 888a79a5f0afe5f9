use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One record from the dashboard endpoint.
///
/// The record is opaque: whatever the server sends is kept verbatim and
/// handed to the template. The accessors below only peek at the fields the
/// server currently emits (`id`, `name`) and never validate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalRule(Value);

impl ApprovalRule {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ApprovalRule {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The `widget` entry of the template context.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetInfo {
    pub id: Uuid,
    pub action: String,
    pub title: String,
    pub rule_count: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Context handed to the dashboard template: `{ widget, rules }`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardContext<'a> {
    pub widget: WidgetInfo,
    pub rules: &'a [ApprovalRule],
}
