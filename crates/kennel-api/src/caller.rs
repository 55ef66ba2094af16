//! The authenticated caller, as asserted by the upstream gateway.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the caller's user id.
pub const CALLER_HEADER: &str = "x-user-id";

/// Present in a handler means the request named a well-formed caller id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(CALLER_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| Uuid::parse_str(v.trim()).ok())
      .map(Caller)
      .ok_or(ApiError::Unauthenticated)
  }
}
