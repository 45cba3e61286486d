// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod session_tests;

use crate::SqliteStore;
use tablebook_domain::{Reservation, ReservationStatus};
use time::PrimitiveDateTime;
use time::macros::datetime;

pub const NOW: PrimitiveDateTime = datetime!(2026-08-06 12:00);

/// An in-memory store seeded with one customer, one staff member, and two
/// tables.
pub fn seeded_store() -> SqliteStore {
    let mut store: SqliteStore = SqliteStore::open_in_memory().unwrap();
    store
        .create_user("alice", "alice@example.com", "hash-a", "Customer", NOW)
        .unwrap();
    store
        .create_user("bob", "bob@example.com", "hash-b", "Staff", NOW)
        .unwrap();
    store.insert_table("Window 1", 2).unwrap();
    store.insert_table("Booth 4", 6).unwrap();
    store
}

pub fn reservation(
    table_id: i64,
    owner_user_id: i64,
    starts_at: PrimitiveDateTime,
    ends_at: PrimitiveDateTime,
) -> Reservation {
    Reservation {
        id: 0,
        table_id,
        owner_user_id,
        starts_at,
        ends_at,
        status: ReservationStatus::Pending,
    }
}
