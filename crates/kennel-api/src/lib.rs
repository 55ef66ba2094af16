//! JSON REST API for Kennel.
//!
//! Exposes an axum [`Router`] backed by any [`KennelStore`]. The caller's
//! identity arrives in the `x-user-id` header, set by an upstream gateway;
//! TLS and authentication proper are the deployment's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kennel_api::api_router(store.clone(), config))
//! ```

pub mod activity;
pub mod caller;
pub mod collaborators;
pub mod dogs;
pub mod error;
pub mod extract;
pub mod records;
pub mod users;

#[cfg(test)]
mod tests;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post, put},
};
use kennel_core::{
  access::AccessControl,
  activity::{DEFAULT_PER_KIND_LIMIT, StoreAggregator},
  profile::Profiles,
  record::{PottyRecord, TaskRecord, VaccineRecord, WeightRecord},
  store::KennelStore,
};
use serde::Deserialize;

pub use caller::Caller;
pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tunables for the HTTP surface, read from the `[api]` table of the server
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Report `403 Forbidden` as `404 Not Found` to callers holding no role
  /// on the dog, hiding which dog ids exist.
  pub hide_existence:         bool,
  /// Per-kind limit for `/activity` when `?limit=` is absent.
  pub default_activity_limit: usize,
  /// Upper bound applied to every `?limit=`.
  pub max_activity_limit:     usize,
  /// Default `?limit=` for the single-kind record listings.
  pub default_record_limit:   usize,
  pub activity_timeout_ms:    u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      hide_existence:         false,
      default_activity_limit: DEFAULT_PER_KIND_LIMIT,
      max_activity_limit:     50,
      default_record_limit:   20,
      activity_timeout_ms:    5_000,
    }
  }
}

impl ApiConfig {
  pub fn activity_timeout(&self) -> Duration {
    Duration::from_millis(self.activity_timeout_ms)
  }

  /// Resolve a requested limit against `default`, capped at the maximum.
  pub fn clamp_limit(&self, requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).min(self.max_activity_limit)
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub config:   Arc<ApiConfig>,
  pub profiles: Profiles<S>,
  pub access:   AccessControl<S>,
  pub activity: Arc<StoreAggregator<S>>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      config:   Arc::clone(&self.config),
      profiles: self.profiles.clone(),
      access:   self.access.clone(),
      activity: Arc::clone(&self.activity),
    }
  }
}

impl<S: KennelStore> ApiState<S> {
  pub fn new(store: Arc<S>, config: ApiConfig) -> Self {
    Self {
      config:   Arc::new(config),
      profiles: Profiles::new(Arc::clone(&store)),
      access:   AccessControl::new(Arc::clone(&store)),
      activity: Arc::new(StoreAggregator::from_store(Arc::clone(&store))),
      store,
    }
  }

  /// Convert a core error into a response. When existence is hidden, a
  /// caller holding no role on the dog sees `NotFound` instead of
  /// `Forbidden`; collaborators already know the dog exists.
  pub fn reject(&self, err: kennel_core::Error) -> ApiError {
    match err {
      kennel_core::Error::Forbidden { dog_id, held: None, .. }
        if self.config.hide_existence =>
      {
        ApiError::Core(kennel_core::Error::DogNotFound(dog_id))
      }
      err => ApiError::Core(err),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: KennelStore>(store: Arc<S>, config: ApiConfig) -> Router<()> {
  Router::new()
    // Users
    .route("/users", post(users::register::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Dogs
    .route("/dogs", get(dogs::list::<S>).post(dogs::create::<S>))
    .route("/dogs/{id}", get(dogs::get_one::<S>).patch(dogs::update::<S>))
    .route("/dogs/{id}/permission", get(dogs::permission::<S>))
    // Collaborators
    .route("/dogs/{id}/collaborators", post(collaborators::add::<S>))
    .route(
      "/dogs/{id}/collaborators/{user_id}",
      put(collaborators::change_role::<S>).delete(collaborators::remove::<S>),
    )
    // Activity feed
    .route("/dogs/{id}/activity", get(activity::feed::<S>))
    // Records
    .route(
      "/dogs/{id}/potty",
      get(records::recent::<S, PottyRecord>).post(records::create::<S, PottyRecord>),
    )
    .route(
      "/dogs/{id}/tasks",
      get(records::recent::<S, TaskRecord>).post(records::create::<S, TaskRecord>),
    )
    .route(
      "/dogs/{id}/vaccines",
      get(records::recent::<S, VaccineRecord>).post(records::create::<S, VaccineRecord>),
    )
    .route(
      "/dogs/{id}/weights",
      get(records::recent::<S, WeightRecord>).post(records::create::<S, WeightRecord>),
    )
    .with_state(ApiState::new(store, config))
}
