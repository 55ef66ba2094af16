//! [`AccessControl`] is the single authorization gate for a dog and anything
//! that references it, plus management of the collaborator set.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  dog::{Collaborator, Dog},
  role::{CollaboratorRole, Role},
  store::{Conditional, DogStore, UserStore},
  user::{User, UserRef, normalize_email},
};

/// The result of a successful authorization: the dog as loaded for the
/// check, and the role the caller effectively holds on it.
#[derive(Debug, Clone)]
pub struct Grant {
  pub dog:  Dog,
  pub role: Role,
}

/// Authorization over dogs backed by a [`DogStore`].
///
/// Cloning is cheap; the store is reference-counted.
pub struct AccessControl<S> {
  store: Arc<S>,
}

impl<S> Clone for AccessControl<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: DogStore> AccessControl<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Check that `caller` holds at least `required` on `dog_id`.
  ///
  /// The owner passes every check. A collaborator passes iff their stored
  /// role ranks at or above `required`; requiring [`Role::Owner`] therefore
  /// admits the owner alone. Missing dogs fail with [`Error::DogNotFound`],
  /// insufficient roles with [`Error::Forbidden`].
  pub async fn authorize(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    required: Role,
  ) -> Result<Grant> {
    let dog = self
      .store
      .get_dog(dog_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::DogNotFound(dog_id))?;

    match dog.role_of(caller) {
      Some(role) if role.satisfies(required) => {
        tracing::debug!(%dog_id, %caller, %role, %required, "access granted");
        Ok(Grant { dog, role })
      }
      held => {
        tracing::debug!(%dog_id, %caller, ?held, %required, "access denied");
        Err(Error::Forbidden { dog_id, user_id: caller, required, held })
      }
    }
  }

  /// [`authorize`](Self::authorize) without the result.
  pub async fn verify_permission(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    required: Role,
  ) -> Result<()> {
    self.authorize(dog_id, caller, required).await.map(|_| ())
  }

  /// Remove `target`'s collaborator entry. Owner only.
  pub async fn remove_collaborator(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    target: Uuid,
  ) -> Result<Dog> {
    self.authorize(dog_id, caller, Role::Owner).await?;

    let outcome = self
      .store
      .delete_collaborator(dog_id, target)
      .await
      .map_err(Error::store)?;

    let dog = applied(outcome, dog_id, || Error::CollaboratorNotFound {
      dog_id,
      user_id: target,
    })?;
    tracing::info!(%dog_id, user_id = %target, "collaborator removed");
    Ok(dog)
  }

  /// Change the role held by an existing collaborator. Owner only.
  pub async fn change_collaborator_role(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    target: Uuid,
    role: CollaboratorRole,
  ) -> Result<Dog> {
    self.authorize(dog_id, caller, Role::Owner).await?;

    let outcome = self
      .store
      .update_collaborator_role(dog_id, target, role)
      .await
      .map_err(Error::store)?;

    let dog = applied(outcome, dog_id, || Error::CollaboratorNotFound {
      dog_id,
      user_id: target,
    })?;
    tracing::info!(%dog_id, user_id = %target, %role, "collaborator role changed");
    Ok(dog)
  }
}

impl<S: DogStore + UserStore> AccessControl<S> {
  /// Grant `target` a collaborator role on `dog_id`. Owner only.
  ///
  /// Fails with [`Error::UserNotFound`] if the target cannot be resolved,
  /// [`Error::OwnerAsCollaborator`] if it is the owner, and
  /// [`Error::AlreadyCollaborator`] if it already holds an entry.
  pub async fn add_collaborator(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    target: &UserRef,
    role: CollaboratorRole,
  ) -> Result<Dog> {
    let Grant { dog, .. } = self.authorize(dog_id, caller, Role::Owner).await?;

    let user = self
      .resolve_user(target)
      .await?
      .ok_or_else(|| Error::UserNotFound(target.to_string()))?;

    if user.user_id == dog.owner_id {
      return Err(Error::OwnerAsCollaborator(dog_id));
    }
    let already = Error::AlreadyCollaborator { dog_id, user_id: user.user_id };
    if dog.collaborator(user.user_id).is_some() {
      return Err(already);
    }

    let collaborator = Collaborator {
      user_id:  user.user_id,
      role,
      added_at: Utc::now(),
    };
    let outcome = self
      .store
      .insert_collaborator(dog_id, collaborator)
      .await
      .map_err(Error::store)?;

    // A concurrent add can still win between the check above and the write.
    let dog = applied(outcome, dog_id, || already)?;
    tracing::info!(%dog_id, user_id = %user.user_id, %role, "collaborator added");
    Ok(dog)
  }

  async fn resolve_user(&self, target: &UserRef) -> Result<Option<User>> {
    match target {
      UserRef::Id(id) => self.store.get_user(*id).await,
      UserRef::Email(email) => {
        self.store.find_user_by_email(&normalize_email(email)).await
      }
    }
    .map_err(Error::store)
  }
}

fn applied(
  outcome: Conditional<Dog>,
  dog_id: Uuid,
  rejected: impl FnOnce() -> Error,
) -> Result<Dog> {
  match outcome {
    Conditional::Applied(dog) => Ok(dog),
    Conditional::Rejected => Err(rejected()),
    Conditional::Missing => Err(Error::DogNotFound(dog_id)),
  }
}
