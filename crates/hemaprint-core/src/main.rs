//! `hemaprint` binary
//!
//! - `hemaprint serve`: open the session store (startup sweep) and serve the
//!   download route
//! - `hemaprint sweep`: run the expiry sweep once and print the report

use anyhow::Context;
use clap::{Parser, Subcommand};
use hemaprint_core::{server, ScreeningConfig};
use hemaprint_session::keys::TOKEN_PREFIX;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Hemaprint screening services
#[derive(Parser, Debug)]
#[command(name = "hemaprint")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (falls back to $HEMAPRINT_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the download route
    Serve,
    /// Remove expired and corrupt session entries
    Sweep,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config =
        ScreeningConfig::resolve(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve => {
            let _session = server::open_session(&config).context("failed to open session store")?;
            let (_, server) = server::bind(config.server.bind, shutdown_signal())
                .with_context(|| format!("failed to bind {}", config.server.bind))?;
            server.await;
        }
        Command::Sweep => {
            let store = server::open_store(&config).context("failed to open session store")?;
            let report = store
                .sweep_expired(TOKEN_PREFIX)
                .context("sweep failed")?;
            println!(
                "scanned {} entries, removed {} expired and {} corrupt",
                report.scanned, report.expired, report.corrupt
            );
        }
    }

    Ok(())
}
