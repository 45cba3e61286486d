// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::macros::time;
use time::{Date, Duration, PrimitiveDateTime, Time};

/// The role assigned to a user account.
///
/// Roles determine the base authority of an identity: Staff and Admin may
/// manage any reservation, Customers only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// A regular guest. May manage only reservations they own.
    #[default]
    Customer,
    /// Restaurant staff. May manage any reservation, including its status.
    Staff,
    /// System administrator. Same reservation authority as Staff.
    Admin,
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Staff" => Ok(Self::Staff),
            "Admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Role {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Staff => "Staff",
            Self::Admin => "Admin",
        }
    }

    /// Returns whether this role carries staff-level authority.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

/// An authenticated identity snapshot.
///
/// Identities are immutable: login, logout, and refresh replace the whole
/// snapshot rather than mutating fields in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The account's canonical numeric identifier. Always positive.
    pub id: i64,
    /// The role assigned to the account.
    pub role: Role,
}

impl Identity {
    /// Creates a new identity snapshot.
    ///
    /// # Arguments
    ///
    /// * `id` - The account identifier
    /// * `role` - The account's role
    #[must_use]
    pub const fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}

/// The lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReservationStatus {
    /// Awaiting confirmation by staff. All new reservations start here.
    #[default]
    Pending,
    /// Confirmed by staff.
    Confirmed,
    /// Cancelled. Cancelled reservations do not block their table.
    Cancelled,
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ReservationStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// A dining table available for reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningTable {
    /// The canonical numeric identifier assigned by the database.
    pub table_id: i64,
    /// The table's display name (e.g. "Window 2").
    pub name: String,
    /// How many guests the table seats.
    pub capacity: u32,
}

impl DiningTable {
    /// Creates a new dining table.
    #[must_use]
    pub const fn new(table_id: i64, name: String, capacity: u32) -> Self {
        Self {
            table_id,
            name,
            capacity,
        }
    }
}

/// A persisted reservation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// The canonical numeric identifier. Zero means not yet persisted.
    pub id: i64,
    /// The reserved table.
    pub table_id: i64,
    /// The account that owns this reservation.
    pub owner_user_id: i64,
    /// When the reservation begins.
    pub starts_at: PrimitiveDateTime,
    /// When the reservation ends.
    pub ends_at: PrimitiveDateTime,
    /// The reservation's lifecycle status.
    pub status: ReservationStatus,
}

/// Default start time for a freshly created draft.
const DEFAULT_START: Time = time!(18:00);

/// Default sitting length for a freshly created draft.
const DEFAULT_SITTING: Duration = Duration::hours(2);

/// The mutable working copy of a reservation held by an editing session.
///
/// A draft combines a calendar date with separate start and end times of
/// day; the two instants are derived on demand. Drafts with `id == 0` have
/// not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    /// The reservation identifier, or zero for a new record.
    pub id: i64,
    /// The selected table, if any.
    pub table_id: Option<i64>,
    /// The account that owns the reservation.
    pub owner_user_id: i64,
    /// The reservation date.
    pub date: Date,
    /// Start time of day.
    pub start_time: Time,
    /// End time of day.
    pub end_time: Time,
    /// The lifecycle status shown to the editor.
    pub status: ReservationStatus,
}

impl ReservationDraft {
    /// Builds a draft from a persisted reservation.
    #[must_use]
    pub const fn from_reservation(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id,
            table_id: Some(reservation.table_id),
            owner_user_id: reservation.owner_user_id,
            date: reservation.starts_at.date(),
            start_time: reservation.starts_at.time(),
            end_time: reservation.ends_at.time(),
            status: reservation.status,
        }
    }

    /// Builds a draft with creation defaults: tomorrow, 18:00 for two
    /// hours, the first available table, status Pending.
    ///
    /// # Arguments
    ///
    /// * `now` - The current instant, used to derive "tomorrow"
    /// * `table_id` - The pre-selected table, if any are available
    /// * `owner_user_id` - The account creating the reservation
    #[must_use]
    pub fn with_defaults(now: PrimitiveDateTime, table_id: Option<i64>, owner_user_id: i64) -> Self {
        let date: Date = now.date().next_day().unwrap_or_else(|| now.date());
        Self {
            id: 0,
            table_id,
            owner_user_id,
            date,
            start_time: DEFAULT_START,
            end_time: DEFAULT_START + DEFAULT_SITTING,
            status: ReservationStatus::Pending,
        }
    }

    /// Returns whether this draft refers to a persisted reservation.
    #[must_use]
    pub const fn is_existing(&self) -> bool {
        self.id > 0
    }

    /// The combined start instant (date plus start time).
    #[must_use]
    pub const fn start_instant(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.start_time)
    }

    /// The combined end instant (date plus end time).
    #[must_use]
    pub const fn end_instant(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.end_time)
    }
}
