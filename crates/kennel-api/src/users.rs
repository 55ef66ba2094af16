//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"email":"…","display_name":"…"}`; no caller required |
//! | `GET`  | `/users/{id}` | 404 if not found |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use kennel_core::{
  store::KennelStore,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{
  ApiState, Caller,
  error::ApiError,
  extract::{Json, Path},
};

/// `POST /users`
pub async fn register<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
  let user = state.profiles.register_user(body).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`
pub async fn get_one<S: KennelStore>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
  Ok(Json(state.profiles.get_user(id).await?))
}
