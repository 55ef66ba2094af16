//! [`SqliteStore`], the SQLite implementation of the Kennel store traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kennel_core::{
  dog::{Collaborator, Dog, DogPatch, NewDog},
  record::Record,
  role::CollaboratorRole,
  store::{Conditional, DogStore, RecordStore, Store, UserStore},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawDog, RawUser, encode_date, encode_dt, encode_role, encode_uuid, load_dog,
    record_table,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kennel store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite store opened");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a collaborator mutation inside a transaction.
  ///
  /// `mutate` returns the number of rows it changed; zero means its
  /// condition did not hold. The dog is reloaded after a successful change.
  async fn conditional_update<F>(&self, dog_id: Uuid, mutate: F) -> Result<Conditional<Dog>>
  where
    F: FnOnce(&rusqlite::Transaction<'_>, &str) -> rusqlite::Result<usize> + Send + 'static,
  {
    let dog_id_str = encode_uuid(dog_id);

    let outcome: Conditional<RawDog> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM dogs WHERE dog_id = ?1",
            rusqlite::params![dog_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(Conditional::Missing);
        }

        if mutate(&tx, &dog_id_str)? == 0 {
          return Ok(Conditional::Rejected);
        }

        let outcome = match load_dog(&tx, &dog_id_str)? {
          Some(raw) => Conditional::Applied(raw),
          None => Conditional::Missing,
        };
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(match outcome {
      Conditional::Applied(raw) => Conditional::Applied(raw.into_dog()?),
      Conditional::Rejected => Conditional::Rejected,
      Conditional::Missing => Conditional::Missing,
    })
  }
}

impl Store for SqliteStore {
  type Error = Error;
}

// ─── Users ───────────────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      user_id:      Uuid::new_v4(),
      email:        input.email,
      display_name: input.display_name,
      created_at:   Utc::now(),
    };

    let id_str = encode_uuid(user.user_id);
    let email = user.email.clone();
    let name = user.display_name.clone();
    let at_str = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO users (user_id, email, display_name, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (email) DO NOTHING",
          rusqlite::params![id_str, email, name, at_str],
        )?)
      })
      .await?;

    Ok((inserted == 1).then_some(user))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", RawUser::COLUMNS),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

// ─── Dogs ────────────────────────────────────────────────────────────────────

impl DogStore for SqliteStore {
  async fn create_dog(&self, owner_id: Uuid, input: NewDog) -> Result<Dog> {
    let dog = Dog {
      dog_id: Uuid::new_v4(),
      owner_id,
      name: input.name,
      breed: input.breed,
      birth_date: input.birth_date,
      created_at: Utc::now(),
      collaborators: Vec::new(),
    };

    let id_str = encode_uuid(dog.dog_id);
    let owner_str = encode_uuid(owner_id);
    let name = dog.name.clone();
    let breed = dog.breed.clone();
    let birth_str = dog.birth_date.map(encode_date);
    let at_str = encode_dt(dog.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO dogs (dog_id, owner_id, name, breed, birth_date, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, name, breed, birth_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(dog)
  }

  async fn get_dog(&self, id: Uuid) -> Result<Option<Dog>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDog> = self
      .conn
      .call(move |conn| Ok(load_dog(conn, &id_str)?))
      .await?;

    raw.map(RawDog::into_dog).transpose()
  }

  async fn list_dogs_for_user(&self, user_id: Uuid) -> Result<Vec<Dog>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawDog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT dog_id FROM dogs
           WHERE owner_id = ?1
              OR dog_id IN (SELECT dog_id FROM collaborators WHERE user_id = ?1)
           ORDER BY created_at, dog_id",
        )?;
        let ids = stmt
          .query_map(rusqlite::params![user_str], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut dogs = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(dog) = load_dog(conn, &id)? {
            dogs.push(dog);
          }
        }
        Ok(dogs)
      })
      .await?;

    raws.into_iter().map(RawDog::into_dog).collect()
  }

  async fn update_dog(&self, id: Uuid, patch: DogPatch) -> Result<Option<Dog>> {
    let id_str = encode_uuid(id);
    let name = patch.name.map(|n| n.trim().to_owned());
    let set_breed = patch.breed.is_some();
    let breed = patch.breed.flatten();
    let set_birth = patch.birth_date.is_some();
    let birth_str = patch.birth_date.flatten().map(encode_date);

    let raw: Option<RawDog> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE dogs SET
             name       = COALESCE(?2, name),
             breed      = CASE WHEN ?3 THEN ?4 ELSE breed END,
             birth_date = CASE WHEN ?5 THEN ?6 ELSE birth_date END
           WHERE dog_id = ?1",
          rusqlite::params![id_str, name, set_breed, breed, set_birth, birth_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(load_dog(conn, &id_str)?)
      })
      .await?;

    raw.map(RawDog::into_dog).transpose()
  }

  // ── Collaborators ─────────────────────────────────────────────────────────

  async fn insert_collaborator(
    &self,
    dog_id: Uuid,
    collaborator: Collaborator,
  ) -> Result<Conditional<Dog>> {
    let user_str = encode_uuid(collaborator.user_id);
    let role_str = encode_role(collaborator.role);
    let at_str = encode_dt(collaborator.added_at);

    self
      .conditional_update(dog_id, move |tx, dog_str| {
        // The owner is excluded by the SELECT; an existing entry by the
        // primary key.
        tx.execute(
          "INSERT INTO collaborators (dog_id, user_id, role, added_at)
           SELECT ?1, ?2, ?3, ?4 FROM dogs WHERE dog_id = ?1 AND owner_id != ?2
           ON CONFLICT (dog_id, user_id) DO NOTHING",
          rusqlite::params![dog_str, user_str, role_str, at_str],
        )
      })
      .await
  }

  async fn delete_collaborator(
    &self,
    dog_id: Uuid,
    user_id: Uuid,
  ) -> Result<Conditional<Dog>> {
    let user_str = encode_uuid(user_id);

    self
      .conditional_update(dog_id, move |tx, dog_str| {
        tx.execute(
          "DELETE FROM collaborators WHERE dog_id = ?1 AND user_id = ?2",
          rusqlite::params![dog_str, user_str],
        )
      })
      .await
  }

  async fn update_collaborator_role(
    &self,
    dog_id: Uuid,
    user_id: Uuid,
    role: CollaboratorRole,
  ) -> Result<Conditional<Dog>> {
    let user_str = encode_uuid(user_id);
    let role_str = encode_role(role);

    self
      .conditional_update(dog_id, move |tx, dog_str| {
        tx.execute(
          "UPDATE collaborators SET role = ?3 WHERE dog_id = ?1 AND user_id = ?2",
          rusqlite::params![dog_str, user_str, role_str],
        )
      })
      .await
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

impl<R: Record> RecordStore<R> for SqliteStore {
  async fn insert_record(&self, record: R) -> Result<R> {
    let table = record_table(R::KIND);
    let meta = record.meta();
    let id_str = encode_uuid(meta.record_id);
    let dog_str = encode_uuid(meta.dog_id);
    let by_str = encode_uuid(meta.created_by);
    let at_str = encode_dt(meta.created_at);
    let payload = serde_json::to_string(&record)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO {table} (record_id, dog_id, created_by, created_at, payload_json)
             VALUES (?1, ?2, ?3, ?4, ?5)"
          ),
          rusqlite::params![id_str, dog_str, by_str, at_str, payload],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn recent_records(&self, dog_id: Uuid, limit: usize) -> Result<Vec<R>> {
    let table = record_table(R::KIND);
    let dog_str = encode_uuid(dog_id);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let payloads: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT payload_json FROM {table}
           WHERE dog_id = ?1
           ORDER BY created_at DESC, record_id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![dog_str, limit], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    payloads
      .iter()
      .map(|p| serde_json::from_str(p).map_err(Error::from))
      .collect()
  }
}
