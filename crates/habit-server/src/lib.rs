//! Configuration and startup for the habit tracker server.
//!
//! Settings come from an optional TOML file layered under `HABITS_*`
//! environment variables:
//!
//! ```toml
//! host          = "0.0.0.0"
//! port          = 5000
//! store_backend = "sqlite"        # or "postgres"
//! store_path    = "~/.local/share/habits/habits.db"
//! database_url  = "postgres://habits@localhost/habits"
//! jwt_secret    = "change-me"
//! token_ttl_days = 7
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use habit_api::{
  AppState,
  token::{DEFAULT_TTL, TokenKeys},
};
use habit_core::store::HabitStore;
use serde::Deserialize;
use tokio::net::TcpListener;

/// Signing secret used when none is configured. Only fit for local
/// development.
pub const DEV_SECRET: &str = "your-secret-key";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`HabitStore`] implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  Sqlite,
  Postgres,
}

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_backend:  StoreBackend,
  pub store_path:     PathBuf,
  pub database_url:   Option<String>,
  pub jwt_secret:     Option<String>,
  pub token_ttl_days: i64,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Token keys for the configured secret, falling back to [`DEV_SECRET`].
  pub fn token_keys(&self) -> TokenKeys {
    let secret = match self.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
      Some(secret) => secret,
      None => {
        tracing::warn!("jwt_secret not set; using the development secret");
        DEV_SECRET
      }
    };
    let ttl = if self.token_ttl_days > 0 {
      Duration::days(self.token_ttl_days)
    } else {
      DEFAULT_TTL
    };
    TokenKeys::new(secret.as_bytes(), ttl)
  }
}

/// Read `path` (if it exists) and `HABITS_*` environment variables.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  load_from(path, config::Environment::with_prefix("HABITS"))
}

fn load_from(
  path: &Path,
  env:  config::Environment,
) -> Result<ServerConfig, config::ConfigError> {
  let mut cfg: ServerConfig = config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 5000)?
    .set_default("store_backend", "sqlite")?
    .set_default("store_path", "habits.db")?
    .set_default("token_ttl_days", 7)?
    .add_source(config::File::from(path).required(false))
    .add_source(env)
    .build()?
    .try_deserialize()?;

  cfg.store_path = expand_tilde(&cfg.store_path);
  Ok(cfg)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Serving ──────────────────────────────────────────────────────────────────

/// Bind `address` and serve the application over `store` until the process
/// is stopped.
pub async fn serve<S>(store: S, keys: TokenKeys, address: &str) -> std::io::Result<()>
where
  S: HabitStore + Clone + 'static,
{
  let app = habit_api::app(AppState::new(store, keys));

  let listener = TcpListener::bind(address).await?;
  tracing::info!("Listening on http://{address}");
  axum::serve(listener, app).await
}
