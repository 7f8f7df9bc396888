//! Server configuration.
//!
//! Loaded from an optional TOML file, then overridden by `ABON_`-prefixed
//! environment variables. Nested keys use `__`, e.g.
//! `ABON_OBJECTS__ROOT=/var/lib/abon/objects`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Top-level configuration of the `abon-server` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
  #[serde(default)]
  pub objects:       ObjectsConfig,
  /// Absent: vendor archival is disabled.
  #[serde(default)]
  pub stripe:        Option<StripeConfig>,
  /// Absent: abonements are listed without services.
  #[serde(default)]
  pub services:      Option<ServicesConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectsConfig {
  #[serde(default = "default_objects_root")]
  pub root:       PathBuf,
  /// Base URL under which `/objects/{key}` is reachable.
  #[serde(default = "default_public_url")]
  pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
  pub secret_key: String,
  #[serde(default)]
  pub api_base:   Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
  /// Base URL of the service catalog.
  pub url: String,
}

impl Default for ObjectsConfig {
  fn default() -> Self {
    Self { root: default_objects_root(), public_url: default_public_url() }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_database_path() -> PathBuf { PathBuf::from("abon.db") }

fn default_objects_root() -> PathBuf { PathBuf::from("objects") }

fn default_public_url() -> String { "http://localhost:8080/objects".to_string() }

impl ServerConfig {
  /// Layer `path` (if it exists) under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ABON")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    cfg.database_path = expand_tilde(&cfg.database_path);
    cfg.objects.root = expand_tilde(&cfg.objects.root);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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
