// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response DTOs for the API boundary.
//!
//! These are distinct from domain types and represent the wire contract.
//! Dates and times travel as strings in the shared formats
//! (`2026-08-07`, `18:30`).

use serde::{Deserialize, Serialize};

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// The login name.
    pub username: String,
    /// The email address.
    pub email: String,
    /// The password.
    pub password: String,
    /// The password confirmation.
    pub confirm_password: String,
    /// The requested role ("Customer" or "Staff"; Admin is rejected).
    pub role: String,
}

/// Response for a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The new account's id.
    pub user_id: i64,
    /// The stored username.
    pub username: String,
    /// A success message.
    pub message: String,
}

/// Request to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The login name.
    pub username: String,
    /// The password.
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The bearer token for subsequent requests.
    pub token: String,
    /// The account's id.
    pub user_id: i64,
    /// The account's username.
    pub username: String,
    /// The account's role.
    pub role: String,
}

/// Response describing the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    /// The account's id.
    pub user_id: i64,
    /// The account's username.
    pub username: String,
    /// The account's email.
    pub email: String,
    /// The account's role.
    pub role: String,
}

/// Request to update the authenticated account's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// The new username.
    pub username: String,
    /// The new email address.
    pub email: String,
    /// The current password; required when changing the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    /// The new password, if changing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    /// Confirmation of the new password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// Response for a successful profile update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    /// The account's id.
    pub user_id: i64,
    /// The stored username.
    pub username: String,
    /// The stored email.
    pub email: String,
    /// A success message.
    pub message: String,
}

/// A dining table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    /// The table's id.
    pub table_id: i64,
    /// The table's display name.
    pub name: String,
    /// How many guests the table seats.
    pub capacity: u32,
}

/// Response listing dining tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTablesResponse {
    /// Every table, in insertion order.
    pub tables: Vec<TableInfo>,
}

/// Request to create a dining table (Staff/Admin only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableRequest {
    /// The table's display name.
    pub name: String,
    /// How many guests the table seats.
    pub capacity: u32,
}

/// Response for a successful table creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableResponse {
    /// The new table's id.
    pub table_id: i64,
    /// The table's display name.
    pub name: String,
    /// A success message.
    pub message: String,
}

/// A reservation summary for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationInfo {
    /// The reservation's id.
    pub reservation_id: i64,
    /// The reserved table.
    pub table_id: i64,
    /// The owning account.
    pub owner_user_id: i64,
    /// When the reservation begins.
    pub starts_at: String,
    /// When the reservation ends.
    pub ends_at: String,
    /// The reservation's status.
    pub status: String,
}

/// Response listing reservations visible to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReservationsResponse {
    /// The visible reservations, soonest first.
    pub reservations: Vec<ReservationInfo>,
}

/// The editable fields of a reservation being viewed or edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftInfo {
    /// The reservation's id (zero for a new record).
    pub reservation_id: i64,
    /// The selected table, if any.
    pub table_id: Option<i64>,
    /// The owning account.
    pub owner_user_id: i64,
    /// The reservation date.
    pub date: String,
    /// Start time of day.
    pub start_time: String,
    /// End time of day.
    pub end_time: String,
    /// The reservation's status.
    pub status: String,
}

/// The caller's authority over the reservation being viewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsInfo {
    /// The caller has staff-level authority.
    pub is_privileged: bool,
    /// The caller owns this reservation.
    pub is_owner: bool,
    /// The caller may mutate this reservation.
    pub can_manage: bool,
}

/// The enabled/disabled state of the editing commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatesInfo {
    /// Saving is currently allowed.
    pub can_save: bool,
    /// Deleting is currently allowed.
    pub can_delete: bool,
}

/// Response for viewing a reservation (or a new-reservation form).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetailResponse {
    /// The draft as loaded.
    pub draft: DraftInfo,
    /// Tables available for selection.
    pub tables: Vec<TableInfo>,
    /// The caller's authority over this reservation.
    pub permissions: PermissionsInfo,
    /// The editing commands available to the caller.
    pub gates: GatesInfo,
    /// Whether the draft edits an already-persisted record.
    pub is_existing: bool,
}

/// Request to save a reservation (create when `reservation_id == 0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReservationRequest {
    /// The reservation to update, or zero to create.
    pub reservation_id: i64,
    /// The selected table, if any.
    pub table_id: Option<i64>,
    /// The reservation date (`2026-08-07`).
    pub date: String,
    /// Start time of day (`18:00`).
    pub start_time: String,
    /// End time of day (`20:00`).
    pub end_time: String,
    /// The requested status; only honored for privileged editors.
    pub status: String,
}

/// Response for a successful save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReservationResponse {
    /// The saved reservation's id (zero when it was just created).
    pub reservation_id: i64,
    /// A success message.
    pub message: String,
}

/// Response for a delete request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteReservationResponse {
    /// Whether the reservation was deleted.
    pub deleted: bool,
    /// A human-readable outcome.
    pub message: String,
}
