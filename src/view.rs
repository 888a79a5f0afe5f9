//! Dashboard view: fetch the rule snapshot, hold it, render it.
//!
//! Lifecycle:
//! - `Uninitialized → Loading → Ready` on a successful activation
//! - `Loading → Failed` when the fetch errors; held rules stay untouched
//! - any state `→ Disposed` on teardown
//!
//! The only suspension point is the fetch inside [`DashboardView::activate`].
//! Rendering is synchronous and writes nothing but the view's own region.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::{DashboardError, RenderError};
use crate::models::rule::{ApprovalRule, DashboardContext, WidgetInfo};
use crate::registry::DASHBOARD_ACTION;
use crate::render::{TemplateEngine, DASHBOARD_TEMPLATE};
use crate::rpc::source::RuleSource;

pub const DEFAULT_TITLE: &str = "Approval Rules";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
    Disposed,
}

/// Capability interface the host drives. Implementors own their display
/// region; the host never reaches into it except through `render`.
#[async_trait]
pub trait Component: Send {
    async fn activate(&mut self) -> Result<(), DashboardError>;
    fn render(&mut self) -> Result<&str, DashboardError>;
    fn dispose(&mut self);
}

/// Tears a view down from outside, e.g. while its activation is pending.
#[derive(Clone)]
pub struct DisposeHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl DisposeHandle {
    pub fn dispose(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_disposed(&self) -> bool {
        *self.tx.borrow()
    }
}

pub struct DashboardView {
    id: Uuid,
    action: String,
    title: String,
    template: String,
    source: Arc<dyn RuleSource>,
    templates: Arc<TemplateEngine>,
    status: ViewStatus,
    rules: Vec<ApprovalRule>,
    fetched_at: Option<DateTime<Utc>>,
    region: String,
    disposed: Arc<watch::Sender<bool>>,
}

impl DashboardView {
    pub fn new(source: Arc<dyn RuleSource>, templates: Arc<TemplateEngine>) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            action: DASHBOARD_ACTION.to_string(),
            title: DEFAULT_TITLE.to_string(),
            template: DASHBOARD_TEMPLATE.to_string(),
            source,
            templates,
            status: ViewStatus::Uninitialized,
            rules: Vec::new(),
            fetched_at: None,
            region: String::new(),
            disposed: Arc::new(tx),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn rules(&self) -> &[ApprovalRule] {
        &self.rules
    }

    /// Markup from the last successful render; empty before the first one.
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn dispose_handle(&self) -> DisposeHandle {
        DisposeHandle {
            tx: Arc::clone(&self.disposed),
        }
    }

    fn is_disposed(&self) -> bool {
        *self.disposed.borrow()
    }

    /// The `{ widget, rules }` context the template receives.
    pub fn context(&self) -> DashboardContext<'_> {
        DashboardContext {
            widget: WidgetInfo {
                id: self.id,
                action: self.action.clone(),
                title: self.title.clone(),
                rule_count: self.rules.len(),
                fetched_at: self.fetched_at,
            },
            rules: &self.rules,
        }
    }

    /// Fetch the rule snapshot and replace the held sequence with it.
    ///
    /// A failed or cancelled fetch leaves the held sequence as it was.
    pub async fn activate(&mut self) -> Result<(), DashboardError> {
        if self.is_disposed() {
            self.teardown();
            return Err(DashboardError::Cancelled);
        }

        let disposed = self.disposed.subscribe();
        let source = Arc::clone(&self.source);
        self.status = ViewStatus::Loading;
        tracing::debug!(view = %self.id, action = %self.action, "fetching approval rules");

        let fetched = tokio::select! {
            biased;
            _ = wait_disposed(disposed) => None,
            res = source.fetch_rules() => Some(res),
        };

        match fetched {
            None => {
                tracing::debug!(view = %self.id, "view disposed while fetching; dropping response");
                self.teardown();
                Err(DashboardError::Cancelled)
            }
            Some(Ok(rules)) => {
                self.rules = rules;
                self.fetched_at = Some(Utc::now());
                self.status = ViewStatus::Ready;
                tracing::info!(
                    view = %self.id,
                    rule_count = self.rules.len(),
                    "approval rules loaded"
                );
                Ok(())
            }
            Some(Err(e)) => {
                self.status = ViewStatus::Failed;
                tracing::warn!(view = %self.id, error = %e, "failed to fetch approval rules");
                Err(e.into())
            }
        }
    }

    /// Render the held rules into the view's region, replacing what was there.
    pub fn render(&mut self) -> Result<&str, RenderError> {
        if self.is_disposed() {
            self.teardown();
        }
        if self.status != ViewStatus::Ready {
            return Err(RenderError::NotReady(self.status));
        }

        let markup = self.templates.render(&self.template, &self.context())?;
        self.region = markup;
        tracing::debug!(
            view = %self.id,
            template = %self.template,
            bytes = self.region.len(),
            "dashboard rendered"
        );
        Ok(&self.region)
    }

    pub fn dispose(&mut self) {
        self.disposed.send_replace(true);
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.status != ViewStatus::Disposed {
            tracing::debug!(view = %self.id, "view disposed");
        }
        self.status = ViewStatus::Disposed;
        self.rules.clear();
        self.region.clear();
        self.fetched_at = None;
    }
}

async fn wait_disposed(mut rx: watch::Receiver<bool>) {
    // A closed channel means the view itself is gone.
    let _ = rx.wait_for(|d| *d).await;
}

#[async_trait]
impl Component for DashboardView {
    async fn activate(&mut self) -> Result<(), DashboardError> {
        DashboardView::activate(self).await
    }

    fn render(&mut self) -> Result<&str, DashboardError> {
        Ok(DashboardView::render(self)?)
    }

    fn dispose(&mut self) {
        DashboardView::dispose(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Hands out queued responses in order, one per fetch.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Value, FetchError>>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Value, FetchError>>) -> Arc<Self> {
            Self::delayed(responses, Duration::ZERO)
        }

        fn delayed(responses: Vec<Result<Value, FetchError>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                delay,
            })
        }
    }

    #[async_trait]
    impl RuleSource for ScriptedSource {
        async fn fetch_rules(&self) -> Result<Vec<ApprovalRule>, FetchError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left");
            next.and_then(crate::rpc::source::parse_rules)
        }
    }

    fn view(source: Arc<ScriptedSource>) -> DashboardView {
        let templates = Arc::new(TemplateEngine::with_builtin().unwrap());
        DashboardView::new(source, templates)
    }

    fn row_count(markup: &str) -> usize {
        markup.matches("class=\"o_kh_approval_rule\"").count()
    }

    #[test]
    fn test_new_view_is_uninitialized_and_empty() {
        let v = view(ScriptedSource::new(vec![]));
        assert_eq!(v.status(), ViewStatus::Uninitialized);
        assert!(v.rules().is_empty());
        assert!(v.region().is_empty());
    }

    #[test]
    fn test_render_before_activate_is_refused() {
        let mut v = view(ScriptedSource::new(vec![]));
        let err = v.render().unwrap_err();
        assert!(matches!(err, RenderError::NotReady(ViewStatus::Uninitialized)));
    }

    #[tokio::test]
    async fn test_activate_holds_rules_in_server_order() {
        let mut v = view(ScriptedSource::new(vec![Ok(json!([
            { "id": 3, "name": "C" },
            { "id": 1, "name": "A" },
            { "id": 2, "name": "B" }
        ]))]));

        v.activate().await.unwrap();

        assert_eq!(v.status(), ViewStatus::Ready);
        let ids: Vec<_> = v.rules().iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_render_emits_one_row_per_rule() {
        let mut v = view(ScriptedSource::new(vec![Ok(json!([
            { "id": 1, "name": "Rule A" },
            { "id": 2, "name": "Rule B" }
        ]))]));

        v.activate().await.unwrap();
        let markup = v.render().unwrap().to_string();

        assert_eq!(row_count(&markup), 2);
        assert!(markup.find("Rule A").unwrap() < markup.find("Rule B").unwrap());
        assert_eq!(v.region(), markup);
    }

    #[tokio::test]
    async fn test_empty_response_renders_empty_state() {
        let mut v = view(ScriptedSource::new(vec![Ok(json!([]))]));

        v.activate().await.unwrap();
        let markup = v.render().unwrap();

        assert_eq!(row_count(markup), 0);
        assert!(markup.contains("o_kh_approvals_empty"));
    }

    #[tokio::test]
    async fn test_second_activation_replaces_rules() {
        let mut v = view(ScriptedSource::new(vec![
            Ok(json!([{ "id": 1, "name": "Old" }, { "id": 2, "name": "Older" }])),
            Ok(json!([{ "id": 9, "name": "New" }])),
        ]));

        v.activate().await.unwrap();
        v.render().unwrap();
        v.activate().await.unwrap();
        let markup = v.render().unwrap().to_string();

        assert_eq!(v.rules().len(), 1);
        assert_eq!(row_count(&markup), 1);
        assert!(markup.contains("New"));
        assert!(!markup.contains("Old"));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_rules_and_refuses_render() {
        let mut v = view(ScriptedSource::new(vec![
            Ok(json!([{ "id": 1, "name": "Kept" }])),
            Err(FetchError::Status { status: 500, body: "boom".into() }),
        ]));

        v.activate().await.unwrap();
        let before = v.render().unwrap().to_string();

        let err = v.activate().await.unwrap_err();
        assert!(matches!(err, DashboardError::Fetch(FetchError::Status { status: 500, .. })));
        assert_eq!(v.status(), ViewStatus::Failed);
        assert_eq!(v.rules().len(), 1);
        assert_eq!(v.rules()[0].name(), Some("Kept"));

        assert!(matches!(v.render(), Err(RenderError::NotReady(ViewStatus::Failed))));
        assert_eq!(v.region(), before);
    }

    #[tokio::test]
    async fn test_malformed_payload_does_not_partially_populate() {
        let mut v = view(ScriptedSource::new(vec![Ok(json!({ "id": 1 }))]));

        let err = v.activate().await.unwrap_err();
        assert!(matches!(err, DashboardError::Fetch(FetchError::InvalidPayload(_))));
        assert!(v.rules().is_empty());
    }

    #[tokio::test]
    async fn test_dispose_during_fetch_cancels_activation() {
        let mut v = view(ScriptedSource::delayed(
            vec![Ok(json!([{ "id": 1, "name": "Late" }]))],
            Duration::from_secs(30),
        ));
        let handle = v.dispose_handle();

        let disposer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.dispose();
        });

        let err = v.activate().await.unwrap_err();
        disposer.await.unwrap();

        assert!(matches!(err, DashboardError::Cancelled));
        assert_eq!(v.status(), ViewStatus::Disposed);
        assert!(v.rules().is_empty());
        assert!(matches!(v.render(), Err(RenderError::NotReady(ViewStatus::Disposed))));
    }

    #[tokio::test]
    async fn test_activate_after_dispose_is_cancelled() {
        let mut v = view(ScriptedSource::new(vec![Ok(json!([]))]));
        v.dispose();

        assert!(matches!(v.activate().await, Err(DashboardError::Cancelled)));
        assert!(v.dispose_handle().is_disposed());
    }

    #[tokio::test]
    async fn test_missing_template_surfaces_render_error() {
        let templates = Arc::new(TemplateEngine::with_builtin().unwrap());
        let mut v = DashboardView::new(ScriptedSource::new(vec![Ok(json!([]))]), templates)
            .with_template("kh_approvals.nope");

        v.activate().await.unwrap();
        assert!(matches!(v.render(), Err(RenderError::TemplateNotFound(_))));
        assert!(v.region().is_empty());
    }

    #[tokio::test]
    async fn test_context_carries_widget_info() {
        let mut v = view(ScriptedSource::new(vec![Ok(json!([{ "id": 1 }]))]))
            .with_title("Company approvals");
        v.activate().await.unwrap();

        let ctx = v.context();
        assert_eq!(ctx.widget.title, "Company approvals");
        assert_eq!(ctx.widget.action, DASHBOARD_ACTION);
        assert_eq!(ctx.widget.rule_count, 1);
        assert!(ctx.widget.fetched_at.is_some());
    }
}
