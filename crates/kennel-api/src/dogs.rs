//! Handlers for `/dogs` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/dogs` | Dogs the caller owns or collaborates on |
//! | `POST`  | `/dogs` | Body: `{"name":"Rex","breed":null,"birth_date":"2020-01-31"}` |
//! | `GET`   | `/dogs/{id}` | Viewer |
//! | `PATCH` | `/dogs/{id}` | Editor; `null` clears `breed` / `birth_date` |
//! | `GET`   | `/dogs/{id}/permission` | `?role=viewer\|editor\|owner` (default `viewer`) |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use kennel_core::{
  dog::{Dog, DogPatch, NewDog},
  role::Role,
  store::KennelStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ApiState, Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── List / create ───────────────────────────────────────────────────────────

/// `GET /dogs`
pub async fn list<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<Dog>>, ApiError> {
  Ok(Json(state.profiles.list_dogs(caller).await?))
}

/// `POST /dogs`
pub async fn create<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Json(body): Json<NewDog>,
) -> Result<impl IntoResponse, ApiError> {
  let dog = state.profiles.create_dog(caller, body).await?;
  Ok((StatusCode::CREATED, Json(dog)))
}

// ─── Single dog ──────────────────────────────────────────────────────────────

/// `GET /dogs/{id}`
pub async fn get_one<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Dog>, ApiError> {
  let dog = state
    .profiles
    .get_dog(id, caller)
    .await
    .map_err(|e| state.reject(e))?;
  Ok(Json(dog))
}

/// `PATCH /dogs/{id}`
pub async fn update<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(patch): Json<DogPatch>,
) -> Result<Json<Dog>, ApiError> {
  let dog = state
    .profiles
    .update_dog(id, caller, patch)
    .await
    .map_err(|e| state.reject(e))?;
  Ok(Json(dog))
}

// ─── Permission check ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PermissionParams {
  pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct PermissionBody {
  pub dog_id:   Uuid,
  /// The role the check was made against.
  pub required: Role,
  /// The caller's effective role on the dog.
  pub role:     Role,
}

/// `GET /dogs/{id}/permission[?role=<role>]`
///
/// 200 with the caller's effective role if it satisfies `role`; otherwise the
/// same 404 / 403 an operation requiring `role` would answer.
pub async fn permission<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<PermissionParams>,
) -> Result<Json<PermissionBody>, ApiError> {
  let required = params.role.unwrap_or(Role::Viewer);
  let grant = state
    .access
    .authorize(id, caller, required)
    .await
    .map_err(|e| state.reject(e))?;
  Ok(Json(PermissionBody { dog_id: id, required, role: grant.role }))
}
