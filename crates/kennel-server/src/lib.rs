//! Kennel HTTP server: configuration and application assembly.
//!
//! The binary in `main.rs` reads a [`ServerConfig`], opens a SQLite store and
//! serves [`app`]. Everything here is runtime-independent so it can be
//! exercised without binding a socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use kennel_api::ApiConfig;
use kennel_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix under which the API is mounted.
pub const API_PREFIX: &str = "/api";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Top-level server configuration, deserialised from `config.toml` layered
/// under `KENNEL_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
  pub api:        ApiConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("kennel.db"),
      api:        ApiConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Load from an optional TOML file, then let the environment override it.
  /// Nested keys use `__`, e.g. `KENNEL_API__HIDE_EXISTENCE=true`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("KENNEL")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }
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

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full application: the API under [`API_PREFIX`] with request tracing.
pub fn app(store: Arc<SqliteStore>, config: ApiConfig) -> Router {
  Router::new()
    .nest(API_PREFIX, kennel_api::api_router(store, config))
    .layer(TraceLayer::new_for_http())
}
