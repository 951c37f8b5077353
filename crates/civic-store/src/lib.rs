//! # civic-store
//!
//! SQLite storage for the civic portal.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for agencies,
//! users, categories, submissions, admin responses and notifications.
//! Identifiers are generated here (UUID v4) and `created_at` / `updated_at`
//! are stamped on every write.

pub mod agencies;
pub mod categories;
pub mod database;
pub mod migrations;
pub mod models;
pub mod notifications;
pub mod responses;
pub mod submissions;
pub mod users;

mod error;

#[cfg(test)]
mod test_support;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
