//! In-memory store used by the unit tests in this crate.
//!
//! Counts record queries so tests can assert that unauthorized calls never
//! reach a record collection, and can be told to fail one record kind.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  dog::{Collaborator, Dog, DogPatch, NewDog},
  record::{ActivityKind, Record},
  role::CollaboratorRole,
  store::{Conditional, DogStore, RecordStore, Store, UserStore},
  user::{NewUser, User},
};

#[derive(Debug, thiserror::Error)]
#[error("memory store unavailable")]
pub struct Unavailable;

#[derive(Default)]
struct Inner {
  users:   Vec<User>,
  dogs:    HashMap<Uuid, Dog>,
  records: HashMap<ActivityKind, Vec<serde_json::Value>>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:          Mutex<Inner>,
  record_queries: AtomicUsize,
  failing:        Mutex<Option<ActivityKind>>,
}

impl MemoryStore {
  pub fn record_queries(&self) -> usize { self.record_queries.load(Ordering::SeqCst) }

  /// Make every query against `kind` fail from now on.
  pub fn fail_kind(&self, kind: ActivityKind) {
    *self.failing.lock().unwrap() = Some(kind);
  }

  pub async fn user(&self, email: &str) -> User {
    self
      .create_user(NewUser { email: email.into(), display_name: email.into() })
      .await
      .unwrap()
      .unwrap()
  }

  /// Insert a dog with an explicit creation time, bypassing validation.
  pub fn dog_created_at(&self, owner_id: Uuid, at: DateTime<Utc>) -> Dog {
    let dog = Dog {
      dog_id: Uuid::new_v4(),
      owner_id,
      name: "Biscuit".into(),
      breed: None,
      birth_date: None,
      created_at: at,
      collaborators: vec![],
    };
    self.inner.lock().unwrap().dogs.insert(dog.dog_id, dog.clone());
    dog
  }
}

impl Store for MemoryStore {
  type Error = Unavailable;
}

impl UserStore for MemoryStore {
  async fn create_user(&self, input: NewUser) -> Result<Option<User>, Unavailable> {
    let mut inner = self.inner.lock().unwrap();
    if inner.users.iter().any(|u| u.email == input.email) {
      return Ok(None);
    }
    let user = User {
      user_id:      Uuid::new_v4(),
      email:        input.email,
      display_name: input.display_name,
      created_at:   Utc::now(),
    };
    inner.users.push(user.clone());
    Ok(Some(user))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>, Unavailable> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.users.iter().find(|u| u.user_id == id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Unavailable> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.users.iter().find(|u| u.email == email).cloned())
  }
}

impl DogStore for MemoryStore {
  async fn create_dog(&self, owner_id: Uuid, input: NewDog) -> Result<Dog, Unavailable> {
    let dog = Dog {
      dog_id: Uuid::new_v4(),
      owner_id,
      name: input.name,
      breed: input.breed,
      birth_date: input.birth_date,
      created_at: Utc::now(),
      collaborators: vec![],
    };
    self.inner.lock().unwrap().dogs.insert(dog.dog_id, dog.clone());
    Ok(dog)
  }

  async fn get_dog(&self, id: Uuid) -> Result<Option<Dog>, Unavailable> {
    Ok(self.inner.lock().unwrap().dogs.get(&id).cloned())
  }

  async fn list_dogs_for_user(&self, user_id: Uuid) -> Result<Vec<Dog>, Unavailable> {
    let inner = self.inner.lock().unwrap();
    let mut dogs: Vec<Dog> = inner
      .dogs
      .values()
      .filter(|d| d.role_of(user_id).is_some())
      .cloned()
      .collect();
    dogs.sort_by_key(|d| (d.created_at, d.dog_id));
    Ok(dogs)
  }

  async fn update_dog(&self, id: Uuid, patch: DogPatch) -> Result<Option<Dog>, Unavailable> {
    let mut inner = self.inner.lock().unwrap();
    Ok(inner.dogs.get_mut(&id).map(|dog| {
      patch.apply(dog);
      dog.clone()
    }))
  }

  async fn insert_collaborator(
    &self,
    dog_id: Uuid,
    collaborator: Collaborator,
  ) -> Result<Conditional<Dog>, Unavailable> {
    let mut inner = self.inner.lock().unwrap();
    let Some(dog) = inner.dogs.get_mut(&dog_id) else {
      return Ok(Conditional::Missing);
    };
    if dog.owner_id == collaborator.user_id
      || dog.collaborator(collaborator.user_id).is_some()
    {
      return Ok(Conditional::Rejected);
    }
    dog.collaborators.push(collaborator);
    Ok(Conditional::Applied(dog.clone()))
  }

  async fn delete_collaborator(
    &self,
    dog_id: Uuid,
    user_id: Uuid,
  ) -> Result<Conditional<Dog>, Unavailable> {
    let mut inner = self.inner.lock().unwrap();
    let Some(dog) = inner.dogs.get_mut(&dog_id) else {
      return Ok(Conditional::Missing);
    };
    let before = dog.collaborators.len();
    dog.collaborators.retain(|c| c.user_id != user_id);
    if dog.collaborators.len() == before {
      return Ok(Conditional::Rejected);
    }
    Ok(Conditional::Applied(dog.clone()))
  }

  async fn update_collaborator_role(
    &self,
    dog_id: Uuid,
    user_id: Uuid,
    role: CollaboratorRole,
  ) -> Result<Conditional<Dog>, Unavailable> {
    let mut inner = self.inner.lock().unwrap();
    let Some(dog) = inner.dogs.get_mut(&dog_id) else {
      return Ok(Conditional::Missing);
    };
    match dog.collaborators.iter_mut().find(|c| c.user_id == user_id) {
      Some(entry) => {
        entry.role = role;
        Ok(Conditional::Applied(dog.clone()))
      }
      None => Ok(Conditional::Rejected),
    }
  }
}

impl<R: Record> RecordStore<R> for MemoryStore {
  async fn insert_record(&self, record: R) -> Result<R, Unavailable> {
    let value = serde_json::to_value(&record).map_err(|_| Unavailable)?;
    let mut inner = self.inner.lock().unwrap();
    inner.records.entry(R::KIND).or_default().push(value);
    Ok(record)
  }

  async fn recent_records(&self, dog_id: Uuid, limit: usize) -> Result<Vec<R>, Unavailable> {
    self.record_queries.fetch_add(1, Ordering::SeqCst);
    if *self.failing.lock().unwrap() == Some(R::KIND) {
      return Err(Unavailable);
    }

    let inner = self.inner.lock().unwrap();
    let mut records: Vec<R> = inner
      .records
      .get(&R::KIND)
      .into_iter()
      .flatten()
      .map(|v| serde_json::from_value::<R>(v.clone()).map_err(|_| Unavailable))
      .collect::<Result<_, _>>()?;
    records.retain(|r| r.meta().dog_id == dog_id);
    records.sort_by(|a, b| {
      b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.record_id().cmp(&a.record_id()))
    });
    records.truncate(limit);
    Ok(records)
  }
}
