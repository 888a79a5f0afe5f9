use clap::{Parser, Subcommand};

use dashboard::registry::DASHBOARD_ACTION;

/// kh-dashboard: approval rules dashboard
#[derive(Parser)]
#[command(name = "kh-dashboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the page host
    Serve {
        /// Port to bind (defaults to KH_DASHBOARD_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Activate an action once and print its markup to stdout
    Render {
        /// Registered action tag
        #[arg(long, default_value = DASHBOARD_ACTION)]
        action: String,
    },

    /// List registered action tags
    Actions,
}
