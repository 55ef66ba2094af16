//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with fixed nanosecond precision, so that
//! lexical order in SQL matches chronological order at full `chrono`
//! resolution. UUIDs are hyphenated
//! lowercase strings; record payloads are compact JSON.

use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use kennel_core::{
  dog::{Collaborator, Dog},
  record::ActivityKind,
  role::CollaboratorRole,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CollaboratorRole ────────────────────────────────────────────────────────

pub fn encode_role(role: CollaboratorRole) -> String { role.as_ref().to_owned() }

pub fn decode_role(s: &str) -> Result<CollaboratorRole> {
  CollaboratorRole::from_str(s).map_err(|_| Error::UnknownValue {
    column: "role",
    value:  s.to_owned(),
  })
}

// ─── ActivityKind ────────────────────────────────────────────────────────────

/// The table holding records of `kind`.
pub fn record_table(kind: ActivityKind) -> &'static str {
  match kind {
    ActivityKind::PottyRecord => "potty_records",
    ActivityKind::TaskRecord => "task_records",
    ActivityKind::VaccineRecord => "vaccine_records",
    ActivityKind::WeightRecord => "weight_records",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub email:        String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, email, display_name, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      email:        row.get(1)?,
      display_name: row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      email:        self.email,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `collaborators` row.
pub struct RawCollaborator {
  pub user_id:  String,
  pub role:     String,
  pub added_at: String,
}

impl RawCollaborator {
  fn into_collaborator(self) -> Result<Collaborator> {
    Ok(Collaborator {
      user_id:  decode_uuid(&self.user_id)?,
      role:     decode_role(&self.role)?,
      added_at: decode_dt(&self.added_at)?,
    })
  }
}

/// A `dogs` row together with its `collaborators` rows.
pub struct RawDog {
  pub dog_id:        String,
  pub owner_id:      String,
  pub name:          String,
  pub breed:         Option<String>,
  pub birth_date:    Option<String>,
  pub created_at:    String,
  pub collaborators: Vec<RawCollaborator>,
}

impl RawDog {
  pub fn into_dog(self) -> Result<Dog> {
    let collaborators = self
      .collaborators
      .into_iter()
      .map(RawCollaborator::into_collaborator)
      .collect::<Result<_>>()?;

    Ok(Dog {
      dog_id: decode_uuid(&self.dog_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      name: self.name,
      breed: self.breed,
      birth_date: self.birth_date.as_deref().map(decode_date).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      collaborators,
    })
  }
}

/// Load a dog and its collaborators on an open connection.
///
/// Synchronous so it can run inside `Connection::call` closures and
/// transactions.
pub fn load_dog(
  conn: &rusqlite::Connection,
  dog_id: &str,
) -> rusqlite::Result<Option<RawDog>> {
  use rusqlite::OptionalExtension as _;

  let dog = conn
    .query_row(
      "SELECT dog_id, owner_id, name, breed, birth_date, created_at
       FROM dogs WHERE dog_id = ?1",
      rusqlite::params![dog_id],
      |row| {
        Ok(RawDog {
          dog_id:        row.get(0)?,
          owner_id:      row.get(1)?,
          name:          row.get(2)?,
          breed:         row.get(3)?,
          birth_date:    row.get(4)?,
          created_at:    row.get(5)?,
          collaborators: Vec::new(),
        })
      },
    )
    .optional()?;

  let Some(mut dog) = dog else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT user_id, role, added_at FROM collaborators
     WHERE dog_id = ?1
     ORDER BY added_at, user_id",
  )?;
  dog.collaborators = stmt
    .query_map(rusqlite::params![dog_id], |row| {
      Ok(RawCollaborator {
        user_id:  row.get(0)?,
        role:     row.get(1)?,
        added_at: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(dog))
}
