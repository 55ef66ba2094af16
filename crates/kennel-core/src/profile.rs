//! Dog profiles and the user directory.
//!
//! Every dog operation goes through [`AccessControl`]; user registration is
//! the only path that needs no caller.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessControl,
  dog::{Dog, DogPatch, NewDog},
  role::Role,
  store::{DogStore, UserStore},
  user::{NewUser, User},
};

pub struct Profiles<S> {
  access: AccessControl<S>,
}

impl<S> Clone for Profiles<S> {
  fn clone(&self) -> Self { Self { access: self.access.clone() } }
}

impl<S: DogStore + UserStore> Profiles<S> {
  pub fn new(store: Arc<S>) -> Self { Self { access: AccessControl::new(store) } }

  fn store(&self) -> &S { self.access.store() }

  // ── Users ─────────────────────────────────────────────────────────────

  pub async fn register_user(&self, input: NewUser) -> Result<User> {
    let input = input.normalized()?;
    let email = input.email.clone();
    let user = self
      .store()
      .create_user(input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EmailTaken(email))?;
    tracing::info!(user_id = %user.user_id, "user registered");
    Ok(user)
  }

  pub async fn get_user(&self, id: Uuid) -> Result<User> {
    self
      .store()
      .get_user(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(id.to_string()))
  }

  // ── Dogs ──────────────────────────────────────────────────────────────

  /// Create a dog owned by `caller`, who must be a registered user.
  pub async fn create_dog(&self, caller: Uuid, input: NewDog) -> Result<Dog> {
    input.validate()?;
    self.get_user(caller).await?;

    let input = NewDog { name: input.name.trim().to_owned(), ..input };
    let dog = self
      .store()
      .create_dog(caller, input)
      .await
      .map_err(Error::store)?;
    tracing::info!(dog_id = %dog.dog_id, owner_id = %caller, "dog created");
    Ok(dog)
  }

  /// Fetch a dog. Requires [`Role::Viewer`].
  pub async fn get_dog(&self, dog_id: Uuid, caller: Uuid) -> Result<Dog> {
    Ok(self.access.authorize(dog_id, caller, Role::Viewer).await?.dog)
  }

  /// Every dog `caller` owns or collaborates on.
  pub async fn list_dogs(&self, caller: Uuid) -> Result<Vec<Dog>> {
    self
      .store()
      .list_dogs_for_user(caller)
      .await
      .map_err(Error::store)
  }

  /// Update profile fields. Requires [`Role::Editor`].
  pub async fn update_dog(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    patch: DogPatch,
  ) -> Result<Dog> {
    patch.validate()?;
    self.access.verify_permission(dog_id, caller, Role::Editor).await?;

    let patch = DogPatch { name: patch.name.map(|n| n.trim().to_owned()), ..patch };
    self
      .store()
      .update_dog(dog_id, patch)
      .await
      .map_err(Error::store)?
      .ok_or(Error::DogNotFound(dog_id))
  }
}
