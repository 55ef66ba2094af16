//! Error types for `kennel-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Error)]
pub enum Error {
  #[error("dog not found: {0}")]
  DogNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("user {user_id} is not a collaborator on dog {dog_id}")]
  CollaboratorNotFound { dog_id: Uuid, user_id: Uuid },

  #[error("user {user_id} lacks {required} access to dog {dog_id}")]
  Forbidden {
    dog_id:   Uuid,
    user_id:  Uuid,
    required: Role,
    /// The role the caller does hold, if any.
    held:     Option<Role>,
  },

  #[error("the owner of dog {0} cannot be added as a collaborator")]
  OwnerAsCollaborator(Uuid),

  #[error("user {user_id} is already a collaborator on dog {dog_id}")]
  AlreadyCollaborator { dog_id: Uuid, user_id: Uuid },

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of an [`Error`], used by callers that only care
/// about how to surface a failure (e.g. the HTTP status to return).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Forbidden,
  InvalidOperation,
  AlreadyExists,
  Infrastructural,
}

impl Error {
  /// Wrap a storage backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::DogNotFound(_)
      | Self::UserNotFound(_)
      | Self::CollaboratorNotFound { .. } => ErrorKind::NotFound,
      Self::Forbidden { .. } => ErrorKind::Forbidden,
      Self::OwnerAsCollaborator(_) | Self::InvalidInput(_) => {
        ErrorKind::InvalidOperation
      }
      Self::AlreadyCollaborator { .. } | Self::EmailTaken(_) => {
        ErrorKind::AlreadyExists
      }
      Self::Store(_) => ErrorKind::Infrastructural,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
