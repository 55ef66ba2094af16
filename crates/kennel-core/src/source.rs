//! Record sources: the authorization-checked entry points to each record
//! collection.
//!
//! A source may be invoked directly (e.g. to list a dog's weight history) as
//! well as by the [`ActivityAggregator`](crate::activity::ActivityAggregator),
//! so it always performs its own permission check.

use std::{future::Future, marker::PhantomData, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessControl,
  record::{Record, RecordMeta},
  role::Role,
  store::{DogStore, RecordStore},
};

/// Read access to the most recent records of one kind.
pub trait RecordSource: Send + Sync {
  type Record: Record;

  /// The `limit` most recent records for `dog_id`, newest first, after
  /// verifying that `caller` holds at least [`Role::Viewer`].
  fn find_recent(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Self::Record>>> + Send + '_;
}

/// A [`RecordSource`] over a [`RecordStore`] collection.
pub struct StoreSource<R, S> {
  access: AccessControl<S>,
  _kind:  PhantomData<fn() -> R>,
}

impl<R, S> Clone for StoreSource<R, S> {
  fn clone(&self) -> Self {
    Self { access: self.access.clone(), _kind: PhantomData }
  }
}

impl<R, S> StoreSource<R, S>
where
  R: Record,
  S: DogStore + RecordStore<R>,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { access: AccessControl::new(store), _kind: PhantomData }
  }

  /// Validate and persist a new record. Requires [`Role::Editor`].
  pub async fn record(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    draft: R::Draft,
  ) -> Result<R> {
    self.access.verify_permission(dog_id, caller, Role::Editor).await?;

    let record = R::from_draft(draft, RecordMeta::new(dog_id, caller, Utc::now()))?;
    let record = self
      .access
      .store()
      .insert_record(record)
      .await
      .map_err(Error::store)?;

    tracing::debug!(
      %dog_id,
      kind = %R::KIND,
      record_id = %record.record_id(),
      "record stored"
    );
    Ok(record)
  }
}

impl<R, S> RecordSource for StoreSource<R, S>
where
  R: Record,
  S: DogStore + RecordStore<R>,
{
  type Record = R;

  async fn find_recent(
    &self,
    dog_id: Uuid,
    caller: Uuid,
    limit: usize,
  ) -> Result<Vec<R>> {
    self.access.verify_permission(dog_id, caller, Role::Viewer).await?;

    <S as RecordStore<R>>::recent_records(self.access.store().as_ref(), dog_id, limit)
      .await
      .map_err(Error::store)
  }
}
