// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for TableBook.
//!
//! This crate stores user accounts, dining tables, reservations, and login
//! sessions in `SQLite` and implements the core's `ReservationStore`
//! contract. A file-backed database serves production; tests run against
//! in-memory databases, which are fast, deterministic, and need no
//! external infrastructure.
//!
//! Instants are stored as zero-padded `[year]-[month]-[day]
//! [hour]:[minute]:[second]` strings so that `SQLite`'s lexicographic
//! string comparison matches chronological order; the overlap query
//! relies on this.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod data_models;
mod error;
mod schema;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use data_models::{SessionRecord, UserRecord};
pub use error::PersistenceError;
pub use store::SqliteStore;
