//! content-engine CLI entrypoint
//!
//! Exits 0 when a batch completes, even with per-record failures, and when
//! there is no pending work. A non-zero exit means a fatal error: invalid
//! configuration, an unreadable pending table, or a failed ledger commit.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use content_engine::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Errors surfacing here are fatal to the run
    let cli = Cli::parse();
    cli.execute().await
}
