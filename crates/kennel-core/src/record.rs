//! Record kinds that hang off a dog and feed the activity view.
//!
//! Each kind lives in its own collection. The only things the aggregator
//! needs from a record are the shared [`RecordMeta`] fields, exposed through
//! the [`Record`] trait.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Discriminant of the record kinds that make up the activity feed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
pub enum ActivityKind {
  PottyRecord,
  TaskRecord,
  VaccineRecord,
  WeightRecord,
}

// ─── Shared envelope ─────────────────────────────────────────────────────────

/// Fields every record carries regardless of kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
  pub record_id:  Uuid,
  pub dog_id:     Uuid,
  /// The user who wrote the record.
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
}

impl RecordMeta {
  pub fn new(dog_id: Uuid, created_by: Uuid, created_at: DateTime<Utc>) -> Self {
    Self { record_id: Uuid::new_v4(), dog_id, created_by, created_at }
  }
}

/// A record kind stored against a dog.
pub trait Record:
  Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
  const KIND: ActivityKind;

  /// Caller-supplied fields for a new record of this kind.
  type Draft: DeserializeOwned + Send + 'static;

  /// Validate `draft` and stamp it with `meta`.
  fn from_draft(draft: Self::Draft, meta: RecordMeta) -> Result<Self>;

  fn meta(&self) -> &RecordMeta;

  fn record_id(&self) -> Uuid { self.meta().record_id }

  fn created_at(&self) -> DateTime<Utc> { self.meta().created_at }
}

// ─── Potty ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PottyKind {
  Pee,
  Poop,
  Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PottyRecord {
  #[serde(flatten)]
  pub meta:     RecordMeta,
  pub kind:     PottyKind,
  pub location: Option<String>,
  pub notes:    Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PottyDraft {
  pub kind:     PottyKind,
  pub location: Option<String>,
  pub notes:    Option<String>,
}

impl Record for PottyRecord {
  const KIND: ActivityKind = ActivityKind::PottyRecord;
  type Draft = PottyDraft;

  fn from_draft(draft: PottyDraft, meta: RecordMeta) -> Result<Self> {
    Ok(Self {
      meta,
      kind: draft.kind,
      location: draft.location,
      notes: draft.notes,
    })
  }

  fn meta(&self) -> &RecordMeta { &self.meta }
}

// ─── Task ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
  #[serde(flatten)]
  pub meta:      RecordMeta,
  pub title:     String,
  pub due_at:    Option<DateTime<Utc>>,
  pub completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskDraft {
  pub title:     String,
  pub due_at:    Option<DateTime<Utc>>,
  #[serde(default)]
  pub completed: bool,
}

impl Record for TaskRecord {
  const KIND: ActivityKind = ActivityKind::TaskRecord;
  type Draft = TaskDraft;

  fn from_draft(draft: TaskDraft, meta: RecordMeta) -> Result<Self> {
    let title = require_text("task title", draft.title)?;
    Ok(Self { meta, title, due_at: draft.due_at, completed: draft.completed })
  }

  fn meta(&self) -> &RecordMeta { &self.meta }
}

// ─── Vaccine ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineRecord {
  #[serde(flatten)]
  pub meta:            RecordMeta,
  pub vaccine:         String,
  pub administered_on: NaiveDate,
  pub expires_on:      Option<NaiveDate>,
  pub veterinarian:    Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaccineDraft {
  pub vaccine:         String,
  pub administered_on: NaiveDate,
  pub expires_on:      Option<NaiveDate>,
  pub veterinarian:    Option<String>,
}

impl Record for VaccineRecord {
  const KIND: ActivityKind = ActivityKind::VaccineRecord;
  type Draft = VaccineDraft;

  fn from_draft(draft: VaccineDraft, meta: RecordMeta) -> Result<Self> {
    let vaccine = require_text("vaccine name", draft.vaccine)?;
    if let Some(expires_on) = draft.expires_on
      && expires_on < draft.administered_on
    {
      return Err(Error::InvalidInput(
        "vaccine cannot expire before it was administered".into(),
      ));
    }
    Ok(Self {
      meta,
      vaccine,
      administered_on: draft.administered_on,
      expires_on: draft.expires_on,
      veterinarian: draft.veterinarian,
    })
  }

  fn meta(&self) -> &RecordMeta { &self.meta }
}

// ─── Weight ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
  #[serde(flatten)]
  pub meta:      RecordMeta,
  pub weight_kg: f64,
  pub notes:     Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightDraft {
  pub weight_kg: f64,
  pub notes:     Option<String>,
}

impl Record for WeightRecord {
  const KIND: ActivityKind = ActivityKind::WeightRecord;
  type Draft = WeightDraft;

  fn from_draft(draft: WeightDraft, meta: RecordMeta) -> Result<Self> {
    if !draft.weight_kg.is_finite() || draft.weight_kg <= 0.0 {
      return Err(Error::InvalidInput(format!(
        "weight must be a positive number of kilograms, got {}",
        draft.weight_kg
      )));
    }
    Ok(Self { meta, weight_kg: draft.weight_kg, notes: draft.notes })
  }

  fn meta(&self) -> &RecordMeta { &self.meta }
}

fn require_text(field: &str, value: String) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(trimmed.to_owned())
}
