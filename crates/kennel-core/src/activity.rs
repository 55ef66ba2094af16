//! The recent-activity feed: one time-ordered view over every record kind.
//!
//! There is no shared event collection. Each request fans out one bounded
//! query per kind, tags the results, and merges them in memory with
//! [`merge_activity`].

use std::{cmp::Ordering, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Result,
  access::AccessControl,
  record::{
    ActivityKind, PottyRecord, Record, RecordMeta, TaskRecord, VaccineRecord,
    WeightRecord,
  },
  role::Role,
  source::{RecordSource, StoreSource},
  store::{DogStore, RecordStore},
};

/// Per-kind limit used when the caller does not supply one.
pub const DEFAULT_PER_KIND_LIMIT: usize = 3;

// ─── Items ───────────────────────────────────────────────────────────────────

/// A record of any kind, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload")]
pub enum ActivityPayload {
  PottyRecord(PottyRecord),
  TaskRecord(TaskRecord),
  VaccineRecord(VaccineRecord),
  WeightRecord(WeightRecord),
}

impl ActivityPayload {
  pub fn kind(&self) -> ActivityKind {
    match self {
      Self::PottyRecord(_) => ActivityKind::PottyRecord,
      Self::TaskRecord(_) => ActivityKind::TaskRecord,
      Self::VaccineRecord(_) => ActivityKind::VaccineRecord,
      Self::WeightRecord(_) => ActivityKind::WeightRecord,
    }
  }

  pub fn meta(&self) -> &RecordMeta {
    match self {
      Self::PottyRecord(r) => r.meta(),
      Self::TaskRecord(r) => r.meta(),
      Self::VaccineRecord(r) => r.meta(),
      Self::WeightRecord(r) => r.meta(),
    }
  }
}

macro_rules! payload_from {
  ($($variant:ident),* $(,)?) => {
    $(
      impl From<$variant> for ActivityPayload {
        fn from(record: $variant) -> Self { Self::$variant(record) }
      }
    )*
  };
}

payload_from!(PottyRecord, TaskRecord, VaccineRecord, WeightRecord);

/// One entry of the activity feed. Built per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
  /// The record's creation instant; used only for ordering.
  pub timestamp: DateTime<Utc>,
  #[serde(flatten)]
  pub payload:   ActivityPayload,
}

impl ActivityItem {
  pub fn kind(&self) -> ActivityKind { self.payload.kind() }

  pub fn record_id(&self) -> Uuid { self.payload.meta().record_id }

  /// Newest first; equal timestamps fall back to kind name, then record id.
  fn feed_order(&self, other: &Self) -> Ordering {
    other
      .timestamp
      .cmp(&self.timestamp)
      .then_with(|| self.kind().as_ref().cmp(other.kind().as_ref()))
      .then_with(|| self.record_id().cmp(&other.record_id()))
  }
}

fn tag<R>(records: Vec<R>) -> impl Iterator<Item = ActivityItem>
where
  R: Record + Into<ActivityPayload>,
{
  records.into_iter().map(|record| ActivityItem {
    timestamp: record.created_at(),
    payload:   record.into(),
  })
}

/// Tag four per-kind result lists and merge them into one feed ordered
/// newest first. The order is total, so equal inputs always produce equal
/// output regardless of how the lists were fetched.
pub fn merge_activity(
  potty: Vec<PottyRecord>,
  tasks: Vec<TaskRecord>,
  vaccines: Vec<VaccineRecord>,
  weights: Vec<WeightRecord>,
) -> Vec<ActivityItem> {
  let mut items: Vec<ActivityItem> = tag(potty)
    .chain(tag(tasks))
    .chain(tag(vaccines))
    .chain(tag(weights))
    .collect();
  items.sort_by(ActivityItem::feed_order);
  items
}

// ─── Aggregator ──────────────────────────────────────────────────────────────

/// Builds the activity feed for a dog from four [`RecordSource`]s.
pub struct ActivityAggregator<S, P, T, V, W> {
  access:   AccessControl<S>,
  potty:    P,
  tasks:    T,
  vaccines: V,
  weights:  W,
}

/// An aggregator whose sources all read from the same backend.
pub type StoreAggregator<S> = ActivityAggregator<
  S,
  StoreSource<PottyRecord, S>,
  StoreSource<TaskRecord, S>,
  StoreSource<VaccineRecord, S>,
  StoreSource<WeightRecord, S>,
>;

impl<S> StoreAggregator<S>
where
  S: DogStore
    + RecordStore<PottyRecord>
    + RecordStore<TaskRecord>
    + RecordStore<VaccineRecord>
    + RecordStore<WeightRecord>,
{
  pub fn from_store(store: Arc<S>) -> Self {
    Self::new(
      AccessControl::new(Arc::clone(&store)),
      StoreSource::new(Arc::clone(&store)),
      StoreSource::new(Arc::clone(&store)),
      StoreSource::new(Arc::clone(&store)),
      StoreSource::new(store),
    )
  }
}

impl<S, P, T, V, W> ActivityAggregator<S, P, T, V, W>
where
  S: DogStore,
  P: RecordSource<Record = PottyRecord>,
  T: RecordSource<Record = TaskRecord>,
  V: RecordSource<Record = VaccineRecord>,
  W: RecordSource<Record = WeightRecord>,
{
  pub fn new(
    access: AccessControl<S>,
    potty: P,
    tasks: T,
    vaccines: V,
    weights: W,
  ) -> Self {
    Self { access, potty, tasks, vaccines, weights }
  }

  /// The `per_kind_limit` most recent records of every kind for `dog_id`,
  /// merged newest first. At most `4 * per_kind_limit` items are returned.
  ///
  /// The caller must hold [`Role::Viewer`]; otherwise no source is queried.
  /// The four queries run concurrently and the first failure fails the whole
  /// call, dropping the queries still in flight. Dropping the returned
  /// future cancels all of them together.
  #[tracing::instrument(skip(self))]
  pub async fn get_recent_activity(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    per_kind_limit: usize,
  ) -> Result<Vec<ActivityItem>> {
    self.access.verify_permission(dog_id, caller, Role::Viewer).await?;

    let (potty, tasks, vaccines, weights) = tokio::try_join!(
      self.potty.find_recent(dog_id, caller, per_kind_limit),
      self.tasks.find_recent(dog_id, caller, per_kind_limit),
      self.vaccines.find_recent(dog_id, caller, per_kind_limit),
      self.weights.find_recent(dog_id, caller, per_kind_limit),
    )
    .inspect_err(|e| tracing::warn!(error = %e, "activity source failed"))?;

    let items = merge_activity(potty, tasks, vaccines, weights);
    tracing::debug!(count = items.len(), "activity merged");
    Ok(items)
  }
}
