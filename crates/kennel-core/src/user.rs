//! Users as known to Kennel.
//!
//! Authentication happens upstream; this directory only exists so that a
//! collaborator can be named by email as well as by id.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  pub email:        String,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

/// Input for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub email:        String,
  pub display_name: String,
}

impl NewUser {
  /// Trim and lower-case the email, rejecting values that cannot be one.
  pub fn normalized(self) -> Result<Self> {
    let email = normalize_email(&self.email);
    if email.is_empty() || !email.contains('@') {
      return Err(Error::InvalidInput(format!(
        "not an email address: {:?}",
        self.email
      )));
    }
    Ok(Self { email, display_name: self.display_name.trim().to_owned() })
  }
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// How a caller names another user: by id, or by registered email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
  Id(Uuid),
  Email(String),
}

impl fmt::Display for UserRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Id(id) => write!(f, "{id}"),
      Self::Email(email) => f.write_str(email),
    }
  }
}
