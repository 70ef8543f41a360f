//! Server assembly for Beacon: configuration, engine wiring and the HTTP
//! application.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use beacon_core::{
  AssignmentEngine,
  notify::{NotificationComposer, NotificationConfig},
  scoring::ScoringSettings,
  store::CampaignStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, read from `beacon.toml` and `BEACON_*` variables.
/// Every field has a default, so no file is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  pub scoring:       ScoringSettings,
  pub notifications: NotificationConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".into(),
      port:          8080,
      store_path:    PathBuf::from("beacon.db"),
      scoring:       ScoringSettings::default(),
      notifications: NotificationConfig::default(),
    }
  }
}

/// Layer the optional TOML file at `path` under `BEACON_*` environment
/// variables. Nested keys use `__`, e.g. `BEACON_SCORING__WEIGHTS__LOYALTY`.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("BEACON")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?
    .try_deserialize()
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

/// Build the engine for `store` with the configured scoring and notification
/// tables.
pub fn build_engine<S: CampaignStore>(
  store: Arc<S>,
  config: &ServerConfig,
) -> beacon_core::Result<AssignmentEngine<S>> {
  let composer = NotificationComposer::from_config(&config.notifications);
  Ok(AssignmentEngine::new(store, config.scoring.clone())?.with_composer(composer))
}

/// The full HTTP application: the JSON API under `/api`, with request tracing.
pub fn app<S>(engine: Arc<AssignmentEngine<S>>) -> Router
where
  S: CampaignStore + 'static,
{
  Router::new()
    .nest("/api", beacon_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}
