// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::PersistenceError;
use rusqlite::Connection;
use tracing::debug;

/// The full schema, applied idempotently at open.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dining_tables (
    table_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    capacity INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS reservations (
    reservation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_id INTEGER NOT NULL REFERENCES dining_tables(table_id),
    owner_user_id INTEGER NOT NULL REFERENCES users(user_id),
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reservations_table_time
    ON reservations(table_id, starts_at);

CREATE INDEX IF NOT EXISTS idx_reservations_owner
    ON reservations(owner_user_id);

CREATE TABLE IF NOT EXISTS login_sessions (
    session_id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    last_seen_at TEXT NOT NULL
);
";

/// Applies the schema and enables foreign key enforcement.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn initialize(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;
    conn.execute_batch(SCHEMA)
        .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;
    debug!("Schema initialized");
    Ok(())
}
