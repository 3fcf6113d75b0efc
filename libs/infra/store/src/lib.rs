//! Persistence adapter for the mission panel.
//!
//! Wraps a libSQL connection pool and exposes three repositories
//! (submission, claiming, attempt bookkeeping) plus the schema migration
//! that bootstraps a fresh database. Nothing above this crate writes SQL.

pub mod client;
pub mod errors;
pub mod mapping;
pub mod mission_store;
pub mod repositories;
pub mod schema;

pub use client::StoreClient;
pub use errors::StoreError;
pub use mission_store::{LibsqlStore, MissionStore};
pub use repositories::{AttemptRepository, ClaimQuery, SubmitterRepository};
