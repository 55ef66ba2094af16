//! Core types and services for Kennel: shared dog profiles, collaborator
//! access control, and the aggregated activity feed.
//!
//! Nothing here depends on HTTP or on a particular database.
//! Storage backends implement the traits in [`store`]; the API layer drives
//! the services in [`access`], [`profile`], [`source`] and [`activity`].

pub mod access;
pub mod activity;
pub mod dog;
pub mod error;
pub mod profile;
pub mod record;
pub mod role;
pub mod source;
pub mod store;
pub mod user;

pub use error::{Error, ErrorKind, Result};

#[cfg(test)]
mod memory;
