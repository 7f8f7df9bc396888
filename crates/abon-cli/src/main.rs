//! `abon`: command-line client for the abonement server.
//!
//! # Usage
//!
//! ```text
//! abon list
//! abon list --with-services
//! abon create --title Monthly --validity 30d --visiting-time any --price 1000 --photo card.jpg
//! abon update <id> --title Monthly --validity 30d --visiting-time any --price 1200
//! abon delete <id>
//! ```

mod client;
mod upload;

use std::{num::NonZeroUsize, path::PathBuf};

use abon_core::chunk::{AbonementData, AbonementDataForUpdate};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client::ApiClient;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "abon", about = "Manage abonements on an abon server")]
struct Cli {
  /// Base URL of the abon server.
  #[arg(long, env = "ABON_URL", default_value = "http://localhost:8080")]
  url: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List abonements, optionally restricted to the given ids.
  List {
    #[arg(long, value_delimiter = ',', conflicts_with = "with_services")]
    ids:           Vec<Uuid>,
    /// Attach the services each abonement offers.
    #[arg(long)]
    with_services: bool,
  },
  /// Show one abonement.
  Get { id: Uuid },
  /// Create an abonement, streaming its photo.
  Create {
    #[command(flatten)]
    fields: Fields,
    /// Vendor price id the product is billed under.
    #[arg(long, default_value = "")]
    price_reference: String,
  },
  /// Replace an abonement's fields and, optionally, its photo.
  Update {
    id: Uuid,
    #[command(flatten)]
    fields: Fields,
  },
  /// Delete an abonement and archive its vendor product.
  Delete { id: Uuid },
}

#[derive(Args, Debug)]
struct Fields {
  #[arg(long)]
  title:         String,
  #[arg(long)]
  validity:      String,
  #[arg(long)]
  visiting_time: String,
  #[arg(long)]
  price:         u32,
  /// Photo file to upload.
  #[arg(long, value_name = "FILE")]
  photo:         Option<PathBuf>,
  /// Photo bytes per streamed chunk.
  #[arg(long, default_value_t = upload::DEFAULT_CHUNK_SIZE)]
  chunk_size:    NonZeroUsize,
}

impl Fields {
  async fn read_photo(&self) -> Result<Vec<u8>> {
    match &self.photo {
      Some(path) => tokio::fs::read(path)
        .await
        .with_context(|| format!("reading photo {}", path.display())),
      None => Ok(Vec::new()),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let client = ApiClient::new(&cli.url)?;

  match cli.command {
    Command::List { with_services: true, .. } => print(&client.list_with_services().await?),
    Command::List { ids, .. } => print(&client.list(&ids).await?),
    Command::Get { id } => print(&client.get(id).await?),
    Command::Create { fields, price_reference } => {
      let photo = fields.read_photo().await?;
      let data = AbonementData {
        title: fields.title,
        validity: fields.validity,
        visiting_time: fields.visiting_time,
        price: fields.price,
        price_reference,
      };
      let chunks = upload::create_chunks(data, &photo, fields.chunk_size);
      tracing::debug!(chunks = chunks.len(), bytes = photo.len(), "streaming create");
      print(&client.create(upload::ndjson(&chunks)?).await?)
    }
    Command::Update { id, fields } => {
      let photo = fields.read_photo().await?;
      let data = AbonementDataForUpdate {
        id: id.to_string(),
        title: fields.title,
        validity: fields.validity,
        visiting_time: fields.visiting_time,
        price: fields.price,
      };
      let chunks = upload::update_chunks(data, &photo, fields.chunk_size);
      tracing::debug!(chunks = chunks.len(), bytes = photo.len(), "streaming update");
      print(&client.update(upload::ndjson(&chunks)?).await?)
    }
    Command::Delete { id } => print(&client.delete(id).await?),
  }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value).context("serialising response")?;
  println!("{out}");
  Ok(())
}
