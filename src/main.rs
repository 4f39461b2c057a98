use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use quiz_catalog::config::Config;
use quiz_catalog::logging;
use quiz_catalog::metrics;
use quiz_catalog::server;
use quiz_catalog::state::AppState;
use quiz_catalog::storage::{CatalogStore, InMemoryStore, SqliteStore};

#[derive(Parser)]
#[command(name = "quiz-catalog")]
#[command(about = "HTTP backend for the quiz catalog")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./catalog.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file (overrides config and CATALOG_DATABASE_PATH)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Keep the catalog in memory; nothing survives a restart
    #[arg(long)]
    in_memory: bool,

    /// Do not start the Prometheus exporter
    #[arg(long)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if cli.in_memory {
        config.database.in_memory = true;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    let _log_guard = logging::init_logging(&config.logging);
    metrics::init_metrics(&config.metrics);

    let store: Arc<dyn CatalogStore> = if config.database.in_memory {
        info!("Using in-memory catalog storage");
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(
            SqliteStore::open(&config.database.path).with_context(|| {
                format!("opening database {}", config.database.path.display())
            })?,
        )
    };

    let state = AppState::new(store, &config.admin.secret);
    server::start_server(state, &config.server).await?;

    Ok(())
}
