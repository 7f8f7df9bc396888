//! API error type and [`axum::response::IntoResponse`] implementation.

use abon_core::{Error, ErrorKind};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0.kind() {
      ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Internal | ErrorKind::InternalRollbackFailed => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let kind = self.0.kind();
    if status.is_server_error() {
      tracing::error!(kind = kind.as_str(), error = %self.0, "request failed");
    }
    let body = json!({ "error": self.0.to_string(), "kind": kind.as_str() });
    (status, Json(body)).into_response()
  }
}
