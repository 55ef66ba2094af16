//! Handlers for the per-kind record collections, generic over [`Record`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dogs/{id}/{kind}` | Viewer; newest first, `?limit=<n>` |
//! | `POST` | `/dogs/{id}/{kind}` | Editor; body is the kind's draft |
//!
//! `{kind}` is one of `potty`, `tasks`, `vaccines`, `weights`.

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use kennel_core::{
  record::Record,
  source::{RecordSource as _, StoreSource},
  store::{KennelStore, RecordStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState, Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  pub limit: Option<usize>,
}

/// `GET /dogs/{id}/{kind}`
pub async fn recent<S, R>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<R>>, ApiError>
where
  S: KennelStore + RecordStore<R>,
  R: Record,
{
  let limit = state
    .config
    .clamp_limit(params.limit, state.config.default_record_limit);
  let records = StoreSource::<R, S>::new(Arc::clone(&state.store))
    .find_recent(id, caller, limit)
    .await
    .map_err(|e| state.reject(e))?;
  Ok(Json(records))
}

/// `POST /dogs/{id}/{kind}`
pub async fn create<S, R>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(draft): Json<R::Draft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KennelStore + RecordStore<R>,
  R: Record,
{
  let record = StoreSource::<R, S>::new(Arc::clone(&state.store))
    .record(id, caller, draft)
    .await
    .map_err(|e| state.reject(e))?;
  Ok((StatusCode::CREATED, Json(record)))
}
