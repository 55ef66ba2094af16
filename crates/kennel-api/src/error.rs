//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kennel_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing or malformed x-user-id header")]
  Unauthenticated,

  #[error("activity feed timed out")]
  Timeout,

  #[error(transparent)]
  Core(#[from] kennel_core::Error),

  #[error(transparent)]
  Body(#[from] JsonRejection),

  #[error(transparent)]
  Query(#[from] QueryRejection),

  #[error(transparent)]
  Path(#[from] PathRejection),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
      ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
      ApiError::Body(e) => e.status(),
      ApiError::Query(e) => e.status(),
      ApiError::Path(e) => e.status(),
      ApiError::Core(e) => match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidOperation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::Infrastructural => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
