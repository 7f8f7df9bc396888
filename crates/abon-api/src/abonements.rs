//! Handlers for `/abonements` and `/objects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/abonements` | Optional `?ids=<uuid>,<uuid>` |
//! | `GET`    | `/abonements/services` | Every record with its catalog services |
//! | `POST`   | `/abonements` | NDJSON [`CreateChunk`] stream; 201 + record |
//! | `PUT`    | `/abonements` | NDJSON [`UpdateChunk`] stream; id in metadata |
//! | `GET`    | `/abonements/:id` | 404 if not found |
//! | `DELETE` | `/abonements/:id` | Returns the deleted record |
//! | `GET`    | `/objects/abonement/:id` | Photo bytes; outlives a deleted record |

use std::sync::Arc;

use abon_core::{
  AbonementService,
  abonement::{Abonement, AbonementWithServices, parse_id, parse_ids},
  chunk::{CreateChunk, UpdateChunk},
  store::{AbonementRepository, ObjectStore, PriceVendor, ServiceCatalog},
};
use axum::{
  Json,
  body::Body,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{error::ApiError, stream::chunk_stream};

type Service<R, O, V, C> = State<Arc<AbonementService<R, O, V, C>>>;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Comma-separated ids; when present only these records are returned.
  pub ids: Option<String>,
}

/// `GET /abonements[?ids=<id>,<id>]`
pub async fn list<R, O, V, C>(
  State(service): Service<R, O, V, C>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Abonement>>, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  let abonements = match params.ids.as_deref() {
    Some(raw) => service.get_many(&parse_ids(raw)?).await?,
    None => service.list().await?,
  };
  Ok(Json(abonements))
}

/// `GET /abonements/services`
pub async fn list_with_services<R, O, V, C>(
  State(service): Service<R, O, V, C>,
) -> Result<Json<Vec<AbonementWithServices>>, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  Ok(Json(service.list_with_services().await?))
}

// ─── Streaming writes ─────────────────────────────────────────────────────────

/// `POST /abonements`: body is a stream of [`CreateChunk`] lines.
pub async fn create<R, O, V, C>(
  State(service): Service<R, O, V, C>,
  body: Body,
) -> Result<impl IntoResponse, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  let abonement = service
    .create_streamed(chunk_stream::<CreateChunk>(body))
    .await?;
  Ok((StatusCode::CREATED, Json(abonement)))
}

/// `PUT /abonements`: body is a stream of [`UpdateChunk`] lines.
pub async fn update<R, O, V, C>(
  State(service): Service<R, O, V, C>,
  body: Body,
) -> Result<Json<Abonement>, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  let abonement = service
    .update_streamed(chunk_stream::<UpdateChunk>(body))
    .await?;
  Ok(Json(abonement))
}

// ─── Single record ────────────────────────────────────────────────────────────

/// `GET /abonements/:id`
pub async fn get_one<R, O, V, C>(
  State(service): Service<R, O, V, C>,
  Path(id): Path<String>,
) -> Result<Json<Abonement>, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  let abonement = service.get(parse_id(&id)?).await?;
  Ok(Json(abonement))
}

/// `DELETE /abonements/:id`
pub async fn delete_one<R, O, V, C>(
  State(service): Service<R, O, V, C>,
  Path(id): Path<String>,
) -> Result<Json<Abonement>, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  let abonement = service.delete(parse_id(&id)?).await?;
  Ok(Json(abonement))
}

/// `GET /objects/abonement/:id`
pub async fn photo<R, O, V, C>(
  State(service): Service<R, O, V, C>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  R: AbonementRepository + 'static,
  O: ObjectStore + 'static,
  V: PriceVendor + 'static,
  C: ServiceCatalog + 'static,
{
  let bytes = service.photo(parse_id(&id)?).await?;
  Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}
