//! Async HTTP client wrapping the abonement API.

use std::time::Duration;

use abon_core::abonement::{Abonement, AbonementWithServices};
use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::Deserialize;
use uuid::Uuid;

/// Async HTTP client for the abonement REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

/// Error body returned by the server.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
  kind:  String,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  // ── Queries ───────────────────────────────────────────────────────────────

  /// `GET /abonements[?ids=<id>,<id>]`
  pub async fn list(&self, ids: &[Uuid]) -> Result<Vec<Abonement>> {
    let mut req = self.client.get(self.url("/abonements"));
    if !ids.is_empty() {
      let joined = ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",");
      req = req.query(&[("ids", joined)]);
    }
    let resp = req.send().await.context("GET /abonements failed")?;
    decode(resp, "GET /abonements").await
  }

  /// `GET /abonements/services`
  pub async fn list_with_services(&self) -> Result<Vec<AbonementWithServices>> {
    let resp = self
      .client
      .get(self.url("/abonements/services"))
      .send()
      .await
      .context("GET /abonements/services failed")?;
    decode(resp, "GET /abonements/services").await
  }

  /// `GET /abonements/<id>`
  pub async fn get(&self, id: Uuid) -> Result<Abonement> {
    let resp = self
      .client
      .get(self.url(&format!("/abonements/{id}")))
      .send()
      .await
      .context("GET /abonements/<id> failed")?;
    decode(resp, "GET /abonements/<id>").await
  }

  // ── Streaming writes ──────────────────────────────────────────────────────

  /// `POST /abonements` with the given NDJSON lines.
  pub async fn create(&self, lines: Vec<Bytes>) -> Result<Abonement> {
    let resp = self
      .client
      .post(self.url("/abonements"))
      .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
      .body(stream_body(lines))
      .send()
      .await
      .context("POST /abonements failed")?;
    decode(resp, "POST /abonements").await
  }

  /// `PUT /abonements` with the given NDJSON lines.
  pub async fn update(&self, lines: Vec<Bytes>) -> Result<Abonement> {
    let resp = self
      .client
      .put(self.url("/abonements"))
      .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
      .body(stream_body(lines))
      .send()
      .await
      .context("PUT /abonements failed")?;
    decode(resp, "PUT /abonements").await
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// `DELETE /abonements/<id>`
  pub async fn delete(&self, id: Uuid) -> Result<Abonement> {
    let resp = self
      .client
      .delete(self.url(&format!("/abonements/{id}")))
      .send()
      .await
      .context("DELETE /abonements/<id> failed")?;
    decode(resp, "DELETE /abonements/<id>").await
  }
}

/// Send each line as its own body frame.
fn stream_body(lines: Vec<Bytes>) -> reqwest::Body {
  let frames = futures::stream::iter(lines.into_iter().map(Ok::<_, std::io::Error>));
  reqwest::Body::wrap_stream(frames)
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return resp.json().await.with_context(|| format!("deserialising {what} response"));
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) => Err(anyhow!("{what} → {status} ({}): {}", body.kind, body.error)),
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, num::NonZeroUsize, sync::Arc};

  use abon_core::{
    AbonementService,
    chunk::{AbonementData, AbonementDataForUpdate},
    store::{PriceVendor, ServiceCatalog},
  };
  use abon_objects::MemoryObjectStore;
  use abon_store_sqlite::SqliteStore;

  use super::*;
  use crate::upload::{create_chunks, ndjson, update_chunks};

  struct NoVendor;

  impl PriceVendor for NoVendor {
    type Error = Infallible;

    async fn archive_product(&self, _price_reference: &str) -> Result<(), Infallible> {
      Ok(())
    }
  }

  async fn spawn_server() -> ApiClient {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = AbonementService::new(store, MemoryObjectStore::new(), NoVendor, NoCatalog);
    let app = abon_api::api_router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    ApiClient::new(&format!("http://{addr}/")).unwrap()
  }

  struct NoCatalog;

  impl ServiceCatalog for NoCatalog {
    type Error = Infallible;

    async fn services_for_abonements(
      &self,
      _abonement_ids: &[Uuid],
    ) -> Result<Vec<abon_core::abonement::AbonementServices>, Infallible> {
      Ok(Vec::new())
    }
  }

  fn size(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

  #[tokio::test]
  async fn full_lifecycle_against_a_live_server() {
    let client = spawn_server().await;
    let data = AbonementData {
      title: "Monthly".into(),
      validity: "30d".into(),
      visiting_time: "any".into(),
      price: 1000,
      price_reference: String::new(),
    };
    let photo = vec![3u8; 8315];

    let lines = ndjson(&create_chunks(data, &photo, size(4096))).unwrap();
    let created = client.create(lines).await.unwrap();
    assert_eq!(created.price, 1000);
    assert!(!created.photo.is_empty());

    let update = AbonementDataForUpdate {
      id: created.id.to_string(),
      title: "Monthly+".into(),
      validity: "31d".into(),
      visiting_time: "any".into(),
      price: 1100,
    };
    let lines = ndjson(&update_chunks(update, &[], size(4096))).unwrap();
    let updated = client.update(lines).await.unwrap();
    assert_eq!(updated.title, "Monthly+");
    assert_eq!(updated.photo, created.photo);

    assert_eq!(client.get(created.id).await.unwrap(), updated);
    assert_eq!(client.list(&[created.id]).await.unwrap().len(), 1);

    let with_services = client.list_with_services().await.unwrap();
    assert_eq!(with_services.len(), 1);
    assert!(with_services[0].services.is_empty());

    client.delete(created.id).await.unwrap();
    let err = client.get(created.id).await.unwrap_err();
    assert!(err.to_string().contains("not_found"), "{err}");
  }
}
