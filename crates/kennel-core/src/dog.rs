//! The dog profile: the shared resource every permission is scoped to.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  role::{CollaboratorRole, Role},
};

/// A non-owner granted access to a dog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
  pub user_id:  Uuid,
  pub role:     CollaboratorRole,
  pub added_at: DateTime<Utc>,
}

/// A dog profile together with its sharing state.
///
/// `owner_id` is fixed at creation and never appears in `collaborators`;
/// `collaborators` holds at most one entry per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
  pub dog_id:        Uuid,
  pub owner_id:      Uuid,
  pub name:          String,
  pub breed:         Option<String>,
  pub birth_date:    Option<NaiveDate>,
  pub created_at:    DateTime<Utc>,
  pub collaborators: Vec<Collaborator>,
}

impl Dog {
  pub fn collaborator(&self, user_id: Uuid) -> Option<&Collaborator> {
    self.collaborators.iter().find(|c| c.user_id == user_id)
  }

  /// The effective role `user_id` holds on this dog, if any.
  pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
    if user_id == self.owner_id {
      return Some(Role::Owner);
    }
    self.collaborator(user_id).map(|c| c.role.into())
  }
}

/// Input for creating a dog. The owner is always the creating caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDog {
  pub name:       String,
  pub breed:      Option<String>,
  pub birth_date: Option<NaiveDate>,
}

impl NewDog {
  pub fn validate(&self) -> Result<()> { validate_name(&self.name) }
}

/// Partial update of a dog's profile fields.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears an optional one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DogPatch {
  pub name:       Option<String>,
  #[serde(default, with = "double_option")]
  pub breed:      Option<Option<String>>,
  #[serde(default, with = "double_option")]
  pub birth_date: Option<Option<NaiveDate>>,
}

impl DogPatch {
  pub fn validate(&self) -> Result<()> {
    match &self.name {
      Some(name) => validate_name(name),
      None => Ok(()),
    }
  }

  pub fn apply(self, dog: &mut Dog) {
    if let Some(name) = self.name {
      dog.name = name.trim().to_owned();
    }
    if let Some(breed) = self.breed {
      dog.breed = breed;
    }
    if let Some(birth_date) = self.birth_date {
      dog.birth_date = birth_date;
    }
  }
}

fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::InvalidInput("dog name must not be empty".into()));
  }
  Ok(())
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
  use serde::{Deserialize, Deserializer};

  pub fn deserialize<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
  where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
  {
    Option::<T>::deserialize(d).map(Some)
  }
}
