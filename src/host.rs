//! Page host: drives registered actions over HTTP.
//!
//! `GET /actions/:tag` instantiates the action, activates it, renders it
//! and tears it down again. Errors are not handled here; they become the
//! generic JSON error response from [`DashboardError`]'s `IntoResponse`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::errors::DashboardError;
use crate::registry::{ActionContext, ActionRegistry};

/// Shared state passed to handlers.
pub struct HostState {
    pub registry: ActionRegistry,
    pub ctx: ActionContext,
}

pub fn router(state: Arc<HostState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/actions", get(list_actions))
        .route("/actions/:tag", get(run_action))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
        .with_state(state)
}

pub async fn serve(state: Arc<HostState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("dashboard host listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run one full lifecycle of `tag` and return the rendered markup.
///
/// The component is disposed whether activation succeeds or not.
pub async fn run_action_once(state: &HostState, tag: &str) -> Result<String, DashboardError> {
    let mut component = state.registry.instantiate(tag, &state.ctx)?;

    let outcome = match component.activate().await {
        Ok(()) => component.render().map(str::to_string),
        Err(e) => Err(e),
    };
    component.dispose();

    outcome
}

async fn run_action(
    State(state): State<Arc<HostState>>,
    Path(tag): Path<String>,
) -> Result<Html<String>, DashboardError> {
    run_action_once(&state, &tag).await.map(Html)
}

async fn list_actions(State(state): State<Arc<HostState>>) -> Json<Vec<String>> {
    Json(state.registry.tags())
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
