//! abon-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite repository and the filesystem object store, and serves the
//! abonement API over HTTP.
//!
//! ```text
//! ABON_STRIPE__SECRET_KEY=sk_live_... abon-server --config /etc/abon/config.toml
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use abon_catalog::HttpServiceCatalog;
use abon_core::AbonementService;
use abon_objects::FsObjectStore;
use abon_store_sqlite::SqliteStore;
use abon_stripe::StripeVendor;
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, StripeConfig};

#[derive(Parser)]
#[command(author, version, about = "Abonement catalogue server")]
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
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.database_path))?;

  let objects = FsObjectStore::new(&cfg.objects.root, cfg.objects.public_url.clone())
    .await
    .with_context(|| format!("failed to open object store at {:?}", cfg.objects.root))?;

  let vendor = cfg.stripe.as_ref().map(stripe_vendor).transpose()?;
  if vendor.is_none() {
    tracing::warn!("no [stripe] section configured, vendor products will not be archived");
  }

  let catalog = cfg
    .services
    .as_ref()
    .map(|services| HttpServiceCatalog::new(&services.url))
    .transpose()
    .context("failed to build service catalog client")?;
  if catalog.is_none() {
    tracing::warn!("no [services] section configured, abonements are listed without services");
  }

  let service = AbonementService::new(store, objects, vendor, catalog);
  let app = abon_api::api_router(Arc::new(service)).layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

fn stripe_vendor(cfg: &StripeConfig) -> anyhow::Result<StripeVendor> {
  match &cfg.api_base {
    Some(base) => StripeVendor::with_api_base(cfg.secret_key.clone(), base)
      .context("failed to build Stripe client"),
    None => Ok(StripeVendor::new(cfg.secret_key.clone())),
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
