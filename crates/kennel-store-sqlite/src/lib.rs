//! SQLite backend for the Kennel stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every call is executed on that one
//! connection, and collaborator updates run inside a transaction, so the
//! conditional updates in [`kennel_core::store::DogStore`] are atomic.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
