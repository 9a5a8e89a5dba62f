//! Runtime configuration and startup helpers for the nosh server binary.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use nosh_core::{
  coordinator::CoordinatorPolicy,
  dish::Dish,
  lookup::{Lookups, StaticTable},
  ranking::DEFAULT_TOP_N,
};
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NOSH_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_top_n")]
  pub top_n:              usize,
  #[serde(default)]
  pub allow_early_swipes: bool,
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms:   u64,
  /// Cuisine → number of nearby restaurants.
  #[serde(default)]
  pub restaurant_counts:  HashMap<String, u32>,
  /// Dish name → cuisine, for catalog entries without one.
  #[serde(default)]
  pub cuisines:           HashMap<String, String>,
  /// Dish name → image URL.
  #[serde(default)]
  pub images:             HashMap<String, String>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("nosh.db") }
fn default_top_n() -> usize { DEFAULT_TOP_N }
fn default_poll_interval_ms() -> u64 { 2_000 }

impl ServerConfig {
  /// Layer an optional TOML file under `NOSH_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("NOSH"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn policy(&self) -> CoordinatorPolicy {
    CoordinatorPolicy {
      top_n:              self.top_n,
      allow_early_swipes: self.allow_early_swipes,
      poll_interval_ms:   self.poll_interval_ms,
    }
  }

  /// Lookup tables answered from the configured maps.
  pub fn lookups(&self) -> Lookups {
    Lookups {
      cuisines:  Arc::new(StaticTable::new(self.cuisines.clone())),
      locations: Arc::new(StaticTable::new(self.restaurant_counts.clone())),
      images:    Arc::new(StaticTable::new(self.images.clone())),
    }
  }
}

// ─── Startup helpers ──────────────────────────────────────────────────────────

/// Read a JSON array of dishes to upsert into the catalog.
pub fn load_seed(path: &Path) -> anyhow::Result<Vec<Dish>> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading seed file {}", path.display()))?;
  serde_json::from_str(&raw)
    .with_context(|| format!("parsing seed file {}", path.display()))
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

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.policy(), CoordinatorPolicy::default());
    assert!(cfg.restaurant_counts.is_empty());
  }

  #[test]
  fn tables_and_policy_are_read() {
    let cfg = from_toml(
      r#"
      port = 8080
      top_n = 3
      allow_early_swipes = true

      [restaurant_counts]
      Thai = 8
      Chinese = 12
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.policy().top_n, 3);
    assert!(cfg.policy().allow_early_swipes);
    assert_eq!(cfg.restaurant_counts.len(), 2);
  }

  #[tokio::test]
  async fn lookups_come_from_config_tables() {
    let cfg = from_toml(
      r#"
      [restaurant_counts]
      Korean = 6
      "#,
    );
    let lookups = cfg.lookups();
    assert_eq!(lookups.restaurant_count_or_default("korean").await, 6);
    assert_eq!(lookups.restaurant_count_or_default("Malay").await, 0);
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/nosh.db")), PathBuf::from(home).join("nosh.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/nosh.db")), PathBuf::from("/tmp/nosh.db"));
  }

  #[test]
  fn seed_file_parses_dishes() {
    let path = std::env::temp_dir().join(format!("nosh-seed-{}.json", std::process::id()));
    std::fs::write(
      &path,
      r#"[{"id":"dish6","name":"Laksa","restaurant":"Local Hawker"}]"#,
    )
    .unwrap();

    let dishes = load_seed(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(dishes.len(), 1);
    assert_eq!(dishes[0].id, "dish6");
    assert_eq!(dishes[0].cuisine, "");
    assert_eq!(dishes[0].restaurant.as_deref(), Some("Local Hawker"));
  }
}
