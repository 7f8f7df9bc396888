//! [`HttpServiceCatalog`]: a JSON client for the service catalog.

use std::time::Duration;

use abon_core::{abonement::AbonementServices, store::ServiceCatalog};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result};

/// Looks up abonement services over HTTP.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpServiceCatalog {
  client:   Client,
  base_url: String,
}

#[derive(Serialize)]
struct ServicesRequest<'a> {
  abonement_ids: &'a [Uuid],
}

impl HttpServiceCatalog {
  pub fn new(base_url: &str) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }
}

impl ServiceCatalog for HttpServiceCatalog {
  type Error = Error;

  /// `POST /abonement-services`
  async fn services_for_abonements(
    &self,
    abonement_ids: &[Uuid],
  ) -> Result<Vec<AbonementServices>> {
    let resp = self
      .client
      .post(self.url("/abonement-services"))
      .json(&ServicesRequest { abonement_ids })
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    let entries: Vec<AbonementServices> = resp.json().await?;
    debug!(requested = abonement_ids.len(), entries = entries.len(), "fetched abonement services");
    Ok(entries)
  }
}
