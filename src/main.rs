//! Internal Transfers - account ledger service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Storage  │───▶│  Ledger  │───▶│ Gateway  │
//! │  (YAML)  │    │(PG / mem)│    │ (Engine) │    │  (HTTP)  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use internal_transfers::config::{AppConfig, StorageKind};
use internal_transfers::db::{Database, MemoryDb};
use internal_transfers::gateway::{self, state::AppState};
use internal_transfers::service::{Ledger, LedgerService};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config environment; loads `<config-dir>/<env>.yaml`
    #[arg(short, long, default_value = "dev")]
    env: String,

    /// Directory holding the YAML config files
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Override `gateway.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut app_config = AppConfig::load(&cli.config_dir, &cli.env)?;
    if let Some(port) = cli.port {
        app_config.gateway.port = port;
    }
    let _log_guard = internal_transfers::logging::init_logging(&app_config);

    tracing::info!(
        env = %cli.env,
        storage = ?app_config.database.storage,
        "Starting internal-transfers"
    );

    let ledger: Arc<dyn LedgerService> = match app_config.database.storage {
        StorageKind::Postgres => {
            let url = app_config.database_url()?;
            let db = Database::connect(url, &app_config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;

            if app_config.database.run_migrations {
                db.migrate().await.context("Failed to apply migrations")?;
            }
            Arc::new(Ledger::postgres(&db))
        }
        StorageKind::Memory => {
            tracing::warn!("In-memory storage selected; state is lost on exit");
            Arc::new(Ledger::in_memory(MemoryDb::new(
                app_config.database.lock_timeout(),
            )))
        }
    };

    let state = Arc::new(AppState::new(ledger, app_config.gateway.request_timeout()));
    gateway::run_server(&app_config.gateway, state).await
}
