// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for TableBook.
//!
//! This crate wires the core editing engine to the outside world: the
//! authentication service (credential checks, bearer sessions, account
//! registration and profile editing), the request/response DTOs, and the
//! handler functions that drive a [`tablebook::EditingSession`] per
//! request and translate its signals into API errors.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod error;
mod handlers;
mod password_policy;
mod request_response;
mod signal_log;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use auth::AuthenticationService;
pub use error::{ApiError, AuthError, translate_domain_error};
pub use handlers::{
    create_table, delete_reservation, list_reservations, list_tables, login, logout, register,
    reservation_detail, save_reservation, update_profile, whoami,
};
pub use password_policy::{MIN_PASSWORD_LENGTH, PasswordPolicyError, validate_password};
pub use request_response::{
    CreateTableRequest, CreateTableResponse, DeleteReservationResponse, DraftInfo, GatesInfo,
    ListReservationsResponse, ListTablesResponse, LoginRequest, LoginResponse, PermissionsInfo,
    RegisterRequest, RegisterResponse, ReservationDetailResponse, ReservationInfo,
    SaveReservationRequest, SaveReservationResponse, TableInfo, UpdateProfileRequest,
    UpdateProfileResponse, WhoAmIResponse,
};
pub use signal_log::{EditorSignal, SignalLog};
