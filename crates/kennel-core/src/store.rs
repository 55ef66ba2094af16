//! Storage traits implemented by backends (e.g. `kennel-store-sqlite`).
//!
//! Higher layers depend on these abstractions, not on any concrete backend.
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).
//!
//! The stores perform no authorization. Every caller-facing path goes through
//! [`AccessControl`](crate::access::AccessControl) first.

use std::future::Future;

use uuid::Uuid;

use crate::{
  dog::{Collaborator, Dog, DogPatch, NewDog},
  record::{PottyRecord, Record, TaskRecord, VaccineRecord, WeightRecord},
  role::CollaboratorRole,
  user::{NewUser, User},
};

/// The outcome of an atomic conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional<T> {
  /// The condition held and the update was written.
  Applied(T),
  /// The target exists but the condition did not hold; nothing was written.
  Rejected,
  /// The target does not exist.
  Missing,
}

/// Common supertrait carrying the backend's error type, so that a single
/// backend implementing several store traits has one unambiguous `Error`.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Store {
  /// Persist a new user. Returns `None` if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by normalized email.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;
}

// ─── Dogs ────────────────────────────────────────────────────────────────────

pub trait DogStore: Store {
  /// Create and persist a dog owned by `owner_id` with no collaborators.
  fn create_dog(
    &self,
    owner_id: Uuid,
    input: NewDog,
  ) -> impl Future<Output = Result<Dog, Self::Error>> + Send + '_;

  /// Point lookup of a dog including its collaborator list.
  fn get_dog(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Dog>, Self::Error>> + Send + '_;

  /// Every dog `user_id` owns or collaborates on, oldest first.
  fn list_dogs_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Dog>, Self::Error>> + Send + '_;

  /// Apply a profile patch. Returns `None` if the dog does not exist.
  fn update_dog(
    &self,
    id: Uuid,
    patch: DogPatch,
  ) -> impl Future<Output = Result<Option<Dog>, Self::Error>> + Send + '_;

  // ── Collaborators: atomic conditional updates ─────────────────────────

  /// Insert `collaborator` iff the user is neither the owner nor already
  /// present. `Rejected` means one of those conditions failed.
  fn insert_collaborator(
    &self,
    dog_id: Uuid,
    collaborator: Collaborator,
  ) -> impl Future<Output = Result<Conditional<Dog>, Self::Error>> + Send + '_;

  /// Delete the entry for `user_id`. `Rejected` means there was none.
  fn delete_collaborator(
    &self,
    dog_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Conditional<Dog>, Self::Error>> + Send + '_;

  /// Change the role on an existing entry. `Rejected` means there was none.
  fn update_collaborator_role(
    &self,
    dog_id: Uuid,
    user_id: Uuid,
    role: CollaboratorRole,
  ) -> impl Future<Output = Result<Conditional<Dog>, Self::Error>> + Send + '_;
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One collection of records of kind `R`.
pub trait RecordStore<R: Record>: Store {
  /// Persist a fully-built record.
  fn insert_record(
    &self,
    record: R,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// The `limit` most recent records for `dog_id`, newest first.
  fn recent_records(
    &self,
    dog_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + '_;
}

// ─── Full backend ────────────────────────────────────────────────────────────

/// A backend serving users, dogs and every record collection.
///
/// Implemented automatically for any type providing all the store traits.
pub trait KennelStore:
  UserStore
  + DogStore
  + RecordStore<PottyRecord>
  + RecordStore<TaskRecord>
  + RecordStore<VaccineRecord>
  + RecordStore<WeightRecord>
  + 'static
{
}

impl<S> KennelStore for S where
  S: UserStore
    + DogStore
    + RecordStore<PottyRecord>
    + RecordStore<TaskRecord>
    + RecordStore<VaccineRecord>
    + RecordStore<WeightRecord>
    + 'static
{
}
