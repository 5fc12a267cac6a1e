//! habit-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) and `HABITS_*`
//! environment variables, opens the configured store, and serves the JSON API
//! under `/api`.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use habit_server::{StoreBackend, load_config, serve};
use habit_store_postgres::PgStore;
use habit_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Habit tracker API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = load_config(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  let keys = cfg.token_keys();
  let address = cfg.address();

  let served = match cfg.store_backend {
    StoreBackend::Sqlite => {
      let store = SqliteStore::open(&cfg.store_path)
        .await
        .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
      tracing::info!(path = ?cfg.store_path, "using sqlite store");
      serve(store, keys, &address).await
    }
    StoreBackend::Postgres => {
      let url = cfg
        .database_url
        .as_deref()
        .context("store_backend = \"postgres\" requires database_url")?;
      let store = PgStore::connect(url)
        .await
        .context("failed to connect to postgres")?;
      tracing::info!("using postgres store");
      serve(store, keys, &address).await
    }
  };
  served.with_context(|| format!("server error on {address}"))
}
