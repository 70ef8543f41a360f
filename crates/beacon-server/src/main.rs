//! `beacon` binary.
//!
//! Reads `beacon.toml` (or the path given with `--config`) plus `BEACON_*`
//! environment variables, opens the SQLite store and either serves the JSON
//! API over HTTP or runs a single engine operation and prints the result.
//!
//! ```text
//! beacon serve
//! beacon assign U-1
//! beacon set-status 1b4e28ba-2fa1-11d2-883f-0016d3cca427 USED
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use beacon_core::{AssignmentEngine, assignment::AssignmentStatus};
use beacon_server::{ServerConfig, app, build_engine, load_config};
use beacon_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Beacon campaign assignment service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "beacon.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Assign the best campaign to a subscriber.
  Assign { subscriber_id: String },
  /// Print a subscriber's score under the configured settings.
  Score { subscriber_id: String },
  /// Move an assignment to USED or EXPIRED.
  SetStatus {
    assignment_id: Uuid,
    status:        AssignmentStatus,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let server_cfg = load_config(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let engine = open_engine(&server_cfg).await?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(engine, &server_cfg).await,
    Command::Assign { subscriber_id } => print_json(&engine.assign(&subscriber_id).await?),
    Command::Score { subscriber_id } => print_json(&engine.score(&subscriber_id).await?),
    Command::SetStatus { assignment_id, status } => {
      print_json(&engine.update_status(assignment_id, status).await?)
    }
  }
}

async fn open_engine(server_cfg: &ServerConfig) -> anyhow::Result<Arc<AssignmentEngine<SqliteStore>>> {
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let engine = build_engine(Arc::new(store), server_cfg).context("invalid scoring configuration")?;
  Ok(Arc::new(engine))
}

async fn serve(engine: Arc<AssignmentEngine<SqliteStore>>, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(engine)).await.context("server error")?;

  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value).context("failed to encode result")?);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
