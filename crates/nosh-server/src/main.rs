//! nosh server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, optionally seeds the dish catalog, and serves the JSON API.
//!
//! ```
//! cargo run -p nosh-server -- --seed demos/dishes.json
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use nosh_core::{coordinator::SessionCoordinator, store::DishCatalog};
use nosh_server::{ServerConfig, expand_tilde, load_seed};
use nosh_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "nosh group dish-voting server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// JSON file of dishes to upsert into the catalog before serving.
  #[arg(long, value_name = "FILE")]
  seed: Option<PathBuf>,
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
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(seed) = &cli.seed {
    let dishes = load_seed(seed)?;
    let count = dishes.len();
    for dish in dishes {
      store
        .upsert_dish(dish)
        .await
        .context("failed to seed dish catalog")?;
    }
    tracing::info!(count, path = %seed.display(), "dish catalog seeded");
  }

  let coordinator = Arc::new(
    SessionCoordinator::new(Arc::new(store))
      .with_lookups(server_cfg.lookups())
      .with_policy(server_cfg.policy()),
  );

  let app = nosh_api::api_router(coordinator).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
