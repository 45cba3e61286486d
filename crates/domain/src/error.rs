// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::PrimitiveDateTime;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No dining table has been selected for the reservation.
    TableRequired,
    /// The reservation ends at or before it starts.
    EndNotAfterStart {
        /// The combined start instant.
        start: PrimitiveDateTime,
        /// The combined end instant.
        end: PrimitiveDateTime,
    },
    /// A new reservation starts before the current time.
    StartInPast {
        /// The combined start instant.
        start: PrimitiveDateTime,
    },
    /// The role string is not a recognized role.
    InvalidRole(String),
    /// The status string is not a recognized reservation status.
    InvalidStatus(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableRequired => write!(f, "A table must be selected"),
            Self::EndNotAfterStart { start, end } => {
                write!(f, "Reservation end {end} must be after start {start}")
            }
            Self::StartInPast { start } => {
                write!(f, "New reservations cannot start in the past (start: {start})")
            }
            Self::InvalidRole(value) => write!(f, "Invalid role: '{value}'"),
            Self::InvalidStatus(value) => write!(f, "Invalid reservation status: '{value}'"),
        }
    }
}

impl std::error::Error for DomainError {}
