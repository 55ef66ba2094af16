//! The role hierarchy shared by every authorization check.
//!
//! Roles are compared by rank only. `Owner` is never stored on a collaborator
//! entry; it is held implicitly through [`Dog::owner_id`](crate::dog::Dog).

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A capability level on a dog, ordered `Viewer < Editor < Owner`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Viewer,
  Editor,
  Owner,
}

impl Role {
  /// Position in the hierarchy. `Owner` sits above anything a collaborator
  /// can hold.
  pub const fn rank(self) -> u8 {
    match self {
      Self::Viewer => 0,
      Self::Editor => 1,
      Self::Owner => u8::MAX,
    }
  }

  /// Whether holding `self` is enough to act at `required`.
  pub const fn satisfies(self, required: Role) -> bool {
    self.rank() >= required.rank()
  }
}

/// The subset of [`Role`] that may be assigned to a non-owner.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollaboratorRole {
  Editor,
  Viewer,
}

impl From<CollaboratorRole> for Role {
  fn from(role: CollaboratorRole) -> Self {
    match role {
      CollaboratorRole::Editor => Role::Editor,
      CollaboratorRole::Viewer => Role::Viewer,
    }
  }
}
