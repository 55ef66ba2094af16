//! Handlers for `/dogs/{id}/collaborators` endpoints. All are owner-only and
//! answer with the updated dog.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/dogs/{id}/collaborators` | Body: `{"user":"<uuid or email>","role":"viewer"}` |
//! | `PUT`    | `/dogs/{id}/collaborators/{user_id}` | Body: `{"role":"editor"}` |
//! | `DELETE` | `/dogs/{id}/collaborators/{user_id}` | |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use kennel_core::{dog::Dog, role::CollaboratorRole, store::KennelStore, user::UserRef};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState, Caller,
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub user: UserRef,
  pub role: CollaboratorRole,
}

/// `POST /dogs/{id}/collaborators`
pub async fn add<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<AddBody>,
) -> Result<impl IntoResponse, ApiError> {
  let dog = state
    .access
    .add_collaborator(id, caller, &body.user, body.role)
    .await
    .map_err(|e| state.reject(e))?;
  Ok((StatusCode::CREATED, Json(dog)))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: CollaboratorRole,
}

/// `PUT /dogs/{id}/collaborators/{user_id}`
pub async fn change_role<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path((id, user_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<RoleBody>,
) -> Result<Json<Dog>, ApiError> {
  let dog = state
    .access
    .change_collaborator_role(id, caller, user_id, body.role)
    .await
    .map_err(|e| state.reject(e))?;
  Ok(Json(dog))
}

/// `DELETE /dogs/{id}/collaborators/{user_id}`
pub async fn remove<S: KennelStore>(
  State(state): State<ApiState<S>>,
  Caller(caller): Caller,
  Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Dog>, ApiError> {
  let dog = state
    .access
    .remove_collaborator(id, caller, user_id)
    .await
    .map_err(|e| state.reject(e))?;
  Ok(Json(dog))
}
