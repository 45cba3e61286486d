// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod auth_tests;

use crate::request_response::{LoginRequest, RegisterRequest, SaveReservationRequest};
use crate::{handlers, LoginResponse};
use tablebook_domain::{DATE_FORMAT, Identity, Role};
use tablebook_persistence::SqliteStore;
use time::OffsetDateTime;

pub const PASSWORD: &str = "Sup3rSecret!";

/// An in-memory store with two dining tables.
pub fn seeded_store() -> SqliteStore {
    let mut store: SqliteStore = SqliteStore::open_in_memory().unwrap();
    store.insert_table("Window 1", 2).unwrap();
    store.insert_table("Booth 4", 6).unwrap();
    store
}

pub fn register_request(username: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        role: role.to_string(),
    }
}

/// Registers an account and logs it in, returning its identity and token.
pub fn signed_in(store: &mut SqliteStore, username: &str, role: &str) -> (Identity, String) {
    handlers::register(store, &register_request(username, role)).unwrap();
    let response: LoginResponse = handlers::login(
        store,
        &LoginRequest {
            username: username.to_string(),
            password: PASSWORD.to_string(),
        },
    )
    .unwrap();
    let role: Role = response.role.parse().unwrap();
    (Identity::new(response.user_id, role), response.token)
}

/// Tomorrow's date in wire format; creation defaults always validate.
pub fn tomorrow() -> String {
    OffsetDateTime::now_utc()
        .date()
        .next_day()
        .unwrap()
        .format(DATE_FORMAT)
        .unwrap()
}

pub fn save_request(reservation_id: i64, table_id: Option<i64>) -> SaveReservationRequest {
    SaveReservationRequest {
        reservation_id,
        table_id,
        date: tomorrow(),
        start_time: String::from("18:00"),
        end_time: String::from("20:00"),
        status: String::from("Pending"),
    }
}
