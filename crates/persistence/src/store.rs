// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::Path;
use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, params};
use tablebook::{ReservationStore, StoreError};
use tablebook_domain::{
    DATETIME_FORMAT, DiningTable, Reservation, ReservationStatus,
};
use time::PrimitiveDateTime;
use tracing::{debug, info};

use crate::data_models::{SessionRecord, UserRecord};
use crate::error::PersistenceError;
use crate::schema;

/// Formats an instant for storage.
fn format_instant(instant: PrimitiveDateTime) -> Result<String, PersistenceError> {
    Ok(instant.format(DATETIME_FORMAT)?)
}

/// Parses a stored instant.
fn parse_instant(value: &str) -> Result<PrimitiveDateTime, PersistenceError> {
    Ok(PrimitiveDateTime::parse(value, DATETIME_FORMAT)?)
}

/// Maps a persistence fault into the core's store contract.
fn into_store_error(err: PersistenceError) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// A raw reservation row before instants and status are parsed.
type ReservationRow = (i64, i64, i64, String, String, String);

fn row_to_reservation(row: ReservationRow) -> Result<Reservation, PersistenceError> {
    let (id, table_id, owner_user_id, starts_at, ends_at, status) = row;
    Ok(Reservation {
        id,
        table_id,
        owner_user_id,
        starts_at: parse_instant(&starts_at)?,
        ends_at: parse_instant(&ends_at)?,
        status: ReservationStatus::from_str(&status)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?,
    })
}

/// `SQLite`-backed storage for accounts, tables, reservations, and login
/// sessions.
///
/// One store owns one connection. Concurrent access is serialized by the
/// caller (the server wraps the store in a mutex).
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if necessary) a file-backed store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be applied.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open(path)
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        schema::initialize(&conn)?;
        info!(path = %path.display(), "Opened SQLite store");
        Ok(Self { conn })
    }

    /// Opens a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be applied.
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open_in_memory()
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // ----- user accounts -----

    /// Inserts a new user account and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including uniqueness
    /// violations; callers pre-check with [`Self::username_taken`] and
    /// [`Self::email_taken`] to report those precisely).
    pub fn create_user(
        &mut self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
        now: PrimitiveDateTime,
    ) -> Result<i64, PersistenceError> {
        let created_at: String = format_instant(now)?;
        self.conn.execute(
            "INSERT INTO users (username, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![username, email, password_hash, role, created_at],
        )?;
        let user_id: i64 = self.conn.last_insert_rowid();
        info!(user_id, username, role, "Created user account");
        Ok(user_id)
    }

    /// Loads a user account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<UserRecord>, PersistenceError> {
        let record: Option<UserRecord> = self
            .conn
            .query_row(
                "SELECT user_id, username, email, password_hash, role
                 FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserRecord {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                        role: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Loads a user account by its unique username.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserRecord>, PersistenceError> {
        let record: Option<UserRecord> = self
            .conn
            .query_row(
                "SELECT user_id, username, email, password_hash, role
                 FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserRecord {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                        role: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Whether a username is taken by an account other than `exclude_user_id`.
    ///
    /// Pass zero to check against every account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn username_taken(
        &mut self,
        username: &str,
        exclude_user_id: i64,
    ) -> Result<bool, PersistenceError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 AND user_id <> ?2",
            params![username, exclude_user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether an email is taken by an account other than `exclude_user_id`.
    ///
    /// Pass zero to check against every account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn email_taken(
        &mut self,
        email: &str,
        exclude_user_id: i64,
    ) -> Result<bool, PersistenceError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1 AND user_id <> ?2",
            params![email, exclude_user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Updates an account's username and email.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_user_profile(
        &mut self,
        user_id: i64,
        username: &str,
        email: &str,
    ) -> Result<bool, PersistenceError> {
        let rows: usize = self.conn.execute(
            "UPDATE users SET username = ?2, email = ?3 WHERE user_id = ?1",
            params![user_id, username, email],
        )?;
        debug!(user_id, updated = rows > 0, "Updated user profile");
        Ok(rows > 0)
    }

    /// Replaces an account's password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_user_password(
        &mut self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        let rows: usize = self.conn.execute(
            "UPDATE users SET password_hash = ?2 WHERE user_id = ?1",
            params![user_id, password_hash],
        )?;
        info!(user_id, updated = rows > 0, "Updated user password");
        Ok(rows > 0)
    }

    // ----- dining tables -----

    /// Inserts a dining table and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_table(&mut self, name: &str, capacity: u32) -> Result<i64, PersistenceError> {
        self.conn.execute(
            "INSERT INTO dining_tables (name, capacity) VALUES (?1, ?2)",
            params![name, capacity],
        )?;
        let table_id: i64 = self.conn.last_insert_rowid();
        info!(table_id, name, capacity, "Created dining table");
        Ok(table_id)
    }

    /// Lists every dining table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn fetch_tables(&mut self) -> Result<Vec<DiningTable>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT table_id, name, capacity FROM dining_tables ORDER BY table_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(DiningTable {
                table_id: row.get(0)?,
                name: row.get(1)?,
                capacity: row.get(2)?,
            })
        })?;
        let mut tables: Vec<DiningTable> = Vec::new();
        for row in rows {
            tables.push(row?);
        }
        Ok(tables)
    }

    // ----- reservations -----

    /// Loads a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is malformed.
    pub fn fetch_reservation(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, PersistenceError> {
        let row: Option<ReservationRow> = self
            .conn
            .query_row(
                "SELECT reservation_id, table_id, owner_user_id, starts_at, ends_at, status
                 FROM reservations WHERE reservation_id = ?1",
                params![reservation_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;
        row.map(row_to_reservation).transpose()
    }

    /// Lists every reservation, soonest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is malformed.
    pub fn fetch_reservations(&mut self) -> Result<Vec<Reservation>, PersistenceError> {
        self.fetch_reservations_where("", &[])
    }

    /// Lists the reservations owned by one account, soonest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is malformed.
    pub fn fetch_reservations_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<Reservation>, PersistenceError> {
        self.fetch_reservations_where("WHERE owner_user_id = ?1", &[&user_id])
    }

    fn fetch_reservations_where(
        &mut self,
        clause: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Reservation>, PersistenceError> {
        let sql: String = format!(
            "SELECT reservation_id, table_id, owner_user_id, starts_at, ends_at, status
             FROM reservations {clause} ORDER BY starts_at"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;
        let mut reservations: Vec<Reservation> = Vec::new();
        for row in rows {
            reservations.push(row_to_reservation(row?)?);
        }
        Ok(reservations)
    }

    /// Whether a non-cancelled reservation on the same table intersects
    /// the half-open interval `[starts_at, ends_at)`.
    fn has_overlap(
        &mut self,
        table_id: i64,
        exclude_reservation_id: i64,
        starts_at: &str,
        ends_at: &str,
    ) -> Result<bool, PersistenceError> {
        // Stored instants are zero-padded, so string comparison is
        // chronological.
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reservations
             WHERE table_id = ?1 AND reservation_id <> ?2 AND status <> 'Cancelled'
               AND starts_at < ?4 AND ?3 < ends_at",
            params![table_id, exclude_reservation_id, starts_at, ends_at],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Inserts a new reservation.
    ///
    /// Returns `Ok(false)` without writing when the table is already
    /// booked for an intersecting time span.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<bool, PersistenceError> {
        let starts_at: String = format_instant(reservation.starts_at)?;
        let ends_at: String = format_instant(reservation.ends_at)?;

        if self.has_overlap(reservation.table_id, 0, &starts_at, &ends_at)? {
            info!(
                table_id = reservation.table_id,
                starts_at, "Rejected overlapping reservation"
            );
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO reservations (table_id, owner_user_id, starts_at, ends_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                reservation.table_id,
                reservation.owner_user_id,
                starts_at,
                ends_at,
                reservation.status.as_str(),
            ],
        )?;
        info!(
            reservation_id = self.conn.last_insert_rowid(),
            table_id = reservation.table_id,
            owner_user_id = reservation.owner_user_id,
            "Created reservation"
        );
        Ok(true)
    }

    /// Updates an existing reservation.
    ///
    /// Returns `Ok(false)` without writing when the new time span would
    /// collide with another reservation, or when the row no longer
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn modify_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<bool, PersistenceError> {
        let starts_at: String = format_instant(reservation.starts_at)?;
        let ends_at: String = format_instant(reservation.ends_at)?;

        if self.has_overlap(reservation.table_id, reservation.id, &starts_at, &ends_at)? {
            info!(
                reservation_id = reservation.id,
                table_id = reservation.table_id,
                "Rejected overlapping reservation update"
            );
            return Ok(false);
        }

        let rows: usize = self.conn.execute(
            "UPDATE reservations
             SET table_id = ?2, owner_user_id = ?3, starts_at = ?4, ends_at = ?5, status = ?6
             WHERE reservation_id = ?1",
            params![
                reservation.id,
                reservation.table_id,
                reservation.owner_user_id,
                starts_at,
                ends_at,
                reservation.status.as_str(),
            ],
        )?;
        info!(
            reservation_id = reservation.id,
            updated = rows > 0,
            "Updated reservation"
        );
        Ok(rows > 0)
    }

    /// Deletes a reservation by id.
    ///
    /// Returns `Ok(false)` when the row was already gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove_reservation(&mut self, reservation_id: i64) -> Result<bool, PersistenceError> {
        let rows: usize = self.conn.execute(
            "DELETE FROM reservations WHERE reservation_id = ?1",
            params![reservation_id],
        )?;
        info!(reservation_id, deleted = rows > 0, "Deleted reservation");
        Ok(rows > 0)
    }

    // ----- login sessions -----

    /// Inserts a login session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        token: &str,
        user_id: i64,
        created_at: PrimitiveDateTime,
        expires_at: PrimitiveDateTime,
    ) -> Result<i64, PersistenceError> {
        let created: String = format_instant(created_at)?;
        let expires: String = format_instant(expires_at)?;
        self.conn.execute(
            "INSERT INTO login_sessions (token, user_id, created_at, expires_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?3)",
            params![token, user_id, created, expires],
        )?;
        let session_id: i64 = self.conn.last_insert_rowid();
        debug!(session_id, user_id, "Created login session");
        Ok(session_id)
    }

    /// Loads a login session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session(&mut self, token: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        let record: Option<SessionRecord> = self
            .conn
            .query_row(
                "SELECT session_id, token, user_id, created_at, expires_at, last_seen_at
                 FROM login_sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(SessionRecord {
                        session_id: row.get(0)?,
                        token: row.get(1)?,
                        user_id: row.get(2)?,
                        created_at: row.get(3)?,
                        expires_at: row.get(4)?,
                        last_seen_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Records session activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn touch_session(
        &mut self,
        session_id: i64,
        now: PrimitiveDateTime,
    ) -> Result<(), PersistenceError> {
        let last_seen: String = format_instant(now)?;
        self.conn.execute(
            "UPDATE login_sessions SET last_seen_at = ?2 WHERE session_id = ?1",
            params![session_id, last_seen],
        )?;
        Ok(())
    }

    /// Deletes a login session by token.
    ///
    /// Returns whether a session was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, token: &str) -> Result<bool, PersistenceError> {
        let rows: usize = self.conn.execute(
            "DELETE FROM login_sessions WHERE token = ?1",
            params![token],
        )?;
        debug!(deleted = rows > 0, "Deleted login session");
        Ok(rows > 0)
    }

    /// Deletes every session that expired at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn purge_expired_sessions(
        &mut self,
        now: PrimitiveDateTime,
    ) -> Result<usize, PersistenceError> {
        let cutoff: String = format_instant(now)?;
        let rows: usize = self.conn.execute(
            "DELETE FROM login_sessions WHERE expires_at <= ?1",
            params![cutoff],
        )?;
        if rows > 0 {
            info!(purged = rows, "Purged expired sessions");
        }
        Ok(rows)
    }
}

impl ReservationStore for SqliteStore {
    fn get_reservation(&mut self, reservation_id: i64) -> Result<Option<Reservation>, StoreError> {
        self.fetch_reservation(reservation_id)
            .map_err(into_store_error)
    }

    fn list_tables(&mut self) -> Result<Vec<DiningTable>, StoreError> {
        self.fetch_tables().map_err(into_store_error)
    }

    fn create_reservation(&mut self, reservation: &Reservation) -> Result<bool, StoreError> {
        self.insert_reservation(reservation).map_err(into_store_error)
    }

    fn update_reservation(&mut self, reservation: &Reservation) -> Result<bool, StoreError> {
        self.modify_reservation(reservation).map_err(into_store_error)
    }

    fn delete_reservation(&mut self, reservation_id: i64) -> Result<bool, StoreError> {
        self.remove_reservation(reservation_id)
            .map_err(into_store_error)
    }
}
