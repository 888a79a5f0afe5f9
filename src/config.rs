use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::DashboardError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8069";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the server exposing the dashboard route.
    pub server_url: String,
    /// Session cookie value sent with every RPC. Optional for public test servers.
    pub session_id: Option<String>,
    /// Total per-request timeout in seconds.
    /// Set via KH_DASHBOARD_TIMEOUT_SECS. Default: 30.
    pub timeout_secs: u64,
    /// Port the page host binds to.
    pub port: u16,
    /// Directory of `*.hbs` files overriding the built-in templates.
    pub template_dir: Option<PathBuf>,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            session_id: None,
            timeout_secs: 30,
            port: 8080,
            template_dir: None,
        }
    }
}

pub fn load() -> Result<Config, DashboardError> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Builds a config from an arbitrary key lookup so tests need not touch the
/// process environment.
pub fn from_lookup<F>(lookup: F) -> Result<Config, DashboardError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let server_url = lookup("KH_DASHBOARD_SERVER_URL")
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(defaults.server_url);

    url::Url::parse(&server_url).map_err(|e| {
        DashboardError::Config(format!("invalid KH_DASHBOARD_SERVER_URL '{}': {}", server_url, e))
    })?;

    Ok(Config {
        server_url,
        session_id: lookup("KH_DASHBOARD_SESSION_ID").filter(|s| !s.is_empty()),
        timeout_secs: lookup("KH_DASHBOARD_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs),
        port: lookup("KH_DASHBOARD_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port),
        template_dir: lookup("KH_DASHBOARD_TEMPLATE_DIR")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from),
    })
}
