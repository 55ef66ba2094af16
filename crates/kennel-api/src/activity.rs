//! `GET /dogs/{id}/activity[?limit=<n>]`: the merged recent-activity feed.
//!
//! `limit` is the per-kind bound, so the feed holds at most four times as
//! many items. The whole fan-out runs under the configured timeout; on expiry
//! every in-flight query is dropped and the request answers 504.

use axum::extract::State;
use kennel_core::{activity::ActivityItem, store::KennelStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState, Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  pub limit: Option<usize>,
}

/// `GET /dogs/{id}/activity`
pub async fn feed<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<FeedParams>,
) -> Result<Json<Vec<ActivityItem>>, ApiError> {
  let limit = state
    .config
    .clamp_limit(params.limit, state.config.default_activity_limit);

  let items = tokio::time::timeout(
    state.config.activity_timeout(),
    state.activity.get_recent_activity(id, caller, limit),
  )
  .await
  .map_err(|_| {
    tracing::warn!(dog_id = %id, "activity feed timed out");
    ApiError::Timeout
  })?
  .map_err(|e| state.reject(e))?;

  Ok(Json(items))
}
