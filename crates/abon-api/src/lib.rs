//! HTTP API for the abonement service.
//!
//! Exposes an axum [`Router`] backed by an [`AbonementService`]. Streaming
//! create and update calls take newline-delimited JSON chunks (see
//! [`stream`]). Auth and TLS are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(abon_api::api_router(Arc::new(service)))
//! ```

pub mod abonements;
pub mod error;
pub mod stream;

use std::sync::Arc;

use abon_core::{
  AbonementService,
  store::{AbonementRepository, ObjectStore, PriceVendor, ServiceCatalog},
};
use axum::{Router, routing::get};

pub use error::ApiError;

/// Build the API router for `service`.
pub fn api_router<R, O, V, C>(service: Arc<AbonementService<R, O, V, C>>) -> Router<()>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  Router::new()
    .route(
      "/abonements",
      get(abonements::list::<R, O, V, C>)
        .post(abonements::create::<R, O, V, C>)
        .put(abonements::update::<R, O, V, C>),
    )
    .route(
      "/abonements/services",
      get(abonements::list_with_services::<R, O, V, C>),
    )
    .route(
      "/abonements/{id}",
      get(abonements::get_one::<R, O, V, C>).delete(abonements::delete_one::<R, O, V, C>),
    )
    .route("/objects/abonement/{id}", get(abonements::photo::<R, O, V, C>))
    .with_state(service)
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use abon_core::{
    abonement::{Abonement, AbonementServices, ServiceSummary},
    chunk::AbonementData,
  };
  use abon_objects::MemoryObjectStore;
  use abon_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  struct NoVendor;

  impl PriceVendor for NoVendor {
    type Error = Infallible;

    async fn archive_product(&self, _price_reference: &str) -> Result<(), Infallible> {
      Ok(())
    }
  }

  /// Offers one "Pool" service for every requested abonement.
  struct PoolCatalog;

  impl ServiceCatalog for PoolCatalog {
    type Error = Infallible;

    async fn services_for_abonements(
      &self,
      abonement_ids: &[Uuid],
    ) -> Result<Vec<AbonementServices>, Infallible> {
      Ok(
        abonement_ids
          .iter()
          .map(|&abonement_id| AbonementServices {
            abonement_id,
            services: vec![ServiceSummary {
              id:    Uuid::nil(),
              title: "Pool".into(),
              photo: String::new(),
            }],
          })
          .collect(),
      )
    }
  }

  async fn make_router() -> (Router, MemoryObjectStore) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let objects = MemoryObjectStore::new();
    let service = AbonementService::new(store, objects.clone(), NoVendor, PoolCatalog);
    (api_router(Arc::new(service)), objects)
  }

  async fn send(router: &Router, method: &str, uri: &str, body: String) -> Response {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/x-ndjson")
      .body(Body::from(body))
      .unwrap();
    router.clone().oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  fn monthly() -> AbonementData {
    AbonementData {
      title:           "Monthly".into(),
      validity:        "30d".into(),
      visiting_time:   "any".into(),
      price:           1000,
      price_reference: String::new(),
    }
  }

  /// One NDJSON line per photo fragment; the metadata rides on the first.
  fn ndjson(metadata: Value, fragments: &[Vec<u8>]) -> String {
    let mut lines = Vec::new();
    for (i, fragment) in fragments.iter().enumerate() {
      let mut line = json!({ "photo": B64.encode(fragment) });
      if i == 0 {
        line["abonement"] = metadata.clone();
      }
      lines.push(line.to_string());
    }
    if fragments.is_empty() {
      lines.push(json!({ "abonement": metadata }).to_string());
    }
    lines.join("\n") + "\n"
  }

  async fn create(router: &Router, fragments: &[Vec<u8>]) -> Abonement {
    let body = ndjson(serde_json::to_value(monthly()).unwrap(), fragments);
    let resp = send(router, "POST", "/abonements", body).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_with_three_chunk_photo_end_to_end() {
    let (router, objects) = make_router().await;
    let fragments = vec![vec![0xAA; 4096], vec![0xBB; 4096], vec![0xCC; 123]];

    let created = create(&router, &fragments).await;

    assert!(!created.id.is_nil());
    assert_eq!(created.price, 1000);
    assert_eq!(created.title, "Monthly");
    assert_eq!(created.photo, format!("memory://abonement/{}", created.id));
    assert_eq!(created.created_time, created.updated_time);
    assert_eq!(objects.len().await, 1);

    let resp = send(&router, "GET", &format!("/objects/abonement/{}", created.id), String::new()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let photo = body_bytes(resp).await;
    assert_eq!(photo, fragments.concat());
  }

  #[tokio::test]
  async fn create_without_photo_has_empty_photo() {
    let (router, objects) = make_router().await;
    let created = create(&router, &[]).await;

    assert!(created.photo.is_empty());
    assert!(objects.is_empty().await);
  }

  #[tokio::test]
  async fn create_without_metadata_is_bad_request() {
    let (router, objects) = make_router().await;
    let body = json!({ "photo": B64.encode([1, 2, 3]) }).to_string();

    let resp = send(&router, "POST", "/abonements", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["kind"], "invalid_input");
    assert!(objects.is_empty().await);
  }

  #[tokio::test]
  async fn create_with_malformed_chunk_is_bad_request() {
    let (router, _objects) = make_router().await;
    let body = format!("{}\n{{\"photo\": 12}}\n", json!({ "abonement": monthly() }));

    let resp = send(&router, "POST", "/abonements", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&router, "GET", "/abonements", String::new()).await;
    assert_eq!(body_json(resp).await, json!([]));
  }

  // ── Read ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_one_and_list_by_ids() {
    let (router, _objects) = make_router().await;
    let a = create(&router, &[]).await;
    let b = create(&router, &[]).await;
    create(&router, &[]).await;

    let resp = send(&router, "GET", &format!("/abonements/{}", a.id), String::new()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["id"], a.id.to_string());

    let uri = format!("/abonements?ids={},{}", a.id, b.id);
    let resp = send(&router, "GET", &uri, String::new()).await;
    let listed: Vec<Abonement> = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(listed.len(), 2);

    let resp = send(&router, "GET", "/abonements", String::new()).await;
    let listed: Vec<Abonement> = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(listed.len(), 3);
  }

  #[tokio::test]
  async fn malformed_and_missing_ids() {
    let (router, _objects) = make_router().await;

    let resp = send(&router, "GET", "/abonements/not-a-uuid", String::new()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&router, "GET", "/abonements?ids=zzz", String::new()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&router, "GET", &format!("/abonements/{}", Uuid::new_v4()), String::new()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["kind"], "not_found");

    let resp = send(&router, "GET", &format!("/objects/abonement/{}", Uuid::new_v4()), String::new()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_with_services_route_is_not_an_id() {
    let (router, _objects) = make_router().await;
    let created = create(&router, &[]).await;

    let resp = send(&router, "GET", "/abonements/services", String::new()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body[0]["abonement"]["id"], created.id.to_string());
    assert_eq!(body[0]["services"][0]["title"], "Pool");
  }

  #[tokio::test]
  async fn photo_of_record_without_photo_is_not_found() {
    let (router, _objects) = make_router().await;
    let created = create(&router, &[]).await;

    let uri = format!("/objects/abonement/{}", created.id);
    let resp = send(&router, "GET", &uri, String::new()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["kind"], "not_found");
    assert!(body["error"].as_str().unwrap().contains("no photo stored"));
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_replaces_fields_and_photo() {
    let (router, _objects) = make_router().await;
    let created = create(&router, &[b"old".to_vec()]).await;

    let metadata = json!({
      "id": created.id.to_string(),
      "title": "Quarterly",
      "validity": "90d",
      "visiting_time": "mornings",
      "price": 2500,
    });
    let body = ndjson(metadata, &[b"new ".to_vec(), b"photo".to_vec()]);
    let resp = send(&router, "PUT", "/abonements", body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: Abonement = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Quarterly");
    assert_eq!(updated.price, 2500);
    assert_eq!(updated.created_time, created.created_time);
    assert!(updated.updated_time >= created.updated_time);

    let resp = send(&router, "GET", &format!("/objects/abonement/{}", created.id), String::new()).await;
    assert_eq!(body_bytes(resp).await, b"new photo");
  }

  #[tokio::test]
  async fn update_unknown_id_is_not_found() {
    let (router, objects) = make_router().await;
    let metadata = json!({
      "id": Uuid::new_v4().to_string(),
      "title": "Ghost",
      "validity": "1d",
      "visiting_time": "never",
      "price": 1,
    });

    let resp = send(&router, "PUT", "/abonements", ndjson(metadata, &[b"x".to_vec()])).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(objects.is_empty().await);
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_twice_is_not_found_the_second_time() {
    let (router, _objects) = make_router().await;
    let created = create(&router, &[]).await;
    let uri = format!("/abonements/{}", created.id);

    let resp = send(&router, "DELETE", &uri, String::new()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let snapshot: Abonement = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(snapshot, created);

    let resp = send(&router, "DELETE", &uri, String::new()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
