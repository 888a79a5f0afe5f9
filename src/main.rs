use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard::config::{self, Config};
use dashboard::host::{self, HostState};
use dashboard::registry::{self, ActionContext, ActionRegistry};
use dashboard::render::TemplateEngine;
use dashboard::rpc::client::RpcClient;
use dashboard::rpc::source::HttpRuleSource;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dashboard=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            let state = build_state(&cfg)?;
            host::serve(state, port).await
        }
        Some(cli::Commands::Render { action }) => {
            let state = build_state(&cfg)?;
            let markup = host::run_action_once(&state, &action)
                .await
                .with_context(|| format!("failed to render action '{}'", action))?;
            println!("{}", markup);
            Ok(())
        }
        Some(cli::Commands::Actions) => {
            let state = build_state(&cfg)?;
            for tag in state.registry.tags() {
                println!("{}", tag);
            }
            Ok(())
        }
        None => {
            let state = build_state(&cfg)?;
            host::serve(state, cfg.port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

/// Composition root: builds the shared collaborators and registers actions.
fn build_state(cfg: &Config) -> anyhow::Result<Arc<HostState>> {
    let client = RpcClient::from_config(cfg)?;
    tracing::info!(server = %client.base_url(), "using rule server");

    let mut templates = TemplateEngine::with_builtin()?;
    if let Some(dir) = &cfg.template_dir {
        let loaded = templates.load_dir(dir)?;
        tracing::info!(dir = %dir.display(), templates = ?loaded, "loaded template overrides");
    }

    let mut actions = ActionRegistry::new();
    registry::register_defaults(&mut actions)?;

    Ok(Arc::new(HostState {
        registry: actions,
        ctx: ActionContext {
            source: Arc::new(HttpRuleSource::new(Arc::new(client))),
            templates: Arc::new(templates),
        },
    }))
}
