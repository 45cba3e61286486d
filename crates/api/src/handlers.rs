// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Handler functions for reservation and account operations.
//!
//! Each reservation handler runs one [`EditingSession`] against the
//! store, then translates the signals recorded by [`SignalLog`] into API
//! errors: validation failures keep their specific kind, permission and
//! persistence failures map to the corresponding API error, unexpected
//! faults become internal errors.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tablebook::{EditingSession, EditorSignals, SessionContext};
use tablebook_domain::{
    DATE_FORMAT, DiningTable, Identity, Reservation, ReservationDraft, ReservationStatus,
    TIME_FORMAT, TIME_PARSE_FORMAT,
};
use tablebook_persistence::{SqliteStore, UserRecord};
use time::{Date, Time};
use tracing::debug;

use crate::auth::AuthenticationService;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    CreateTableRequest, CreateTableResponse, DeleteReservationResponse, DraftInfo, GatesInfo,
    ListReservationsResponse, ListTablesResponse, LoginRequest, LoginResponse, PermissionsInfo,
    RegisterRequest, RegisterResponse, ReservationDetailResponse, ReservationInfo,
    SaveReservationRequest, SaveReservationResponse, TableInfo, UpdateProfileRequest,
    UpdateProfileResponse, WhoAmIResponse,
};
use crate::signal_log::SignalLog;

/// Locks a mutex, recovering the inner value if a holder panicked.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts an editing session for one request.
///
/// The request's identity is signed into a fresh session context before
/// the editor subscribes, so the editor sees it at initialize time.
fn begin_session(
    identity: Option<&Identity>,
    confirm: bool,
) -> (Arc<Mutex<SessionContext>>, Arc<Mutex<SignalLog>>, EditingSession) {
    let context: Arc<Mutex<SessionContext>> = Arc::new(Mutex::new(SessionContext::new()));
    if let Some(identity) = identity {
        lock(&context).sign_in(identity.clone());
    }
    let log: Arc<Mutex<SignalLog>> = Arc::new(Mutex::new(SignalLog::new(confirm)));
    let sink: Arc<Mutex<dyn EditorSignals + Send>> = log.clone();
    let session: EditingSession = EditingSession::begin(Arc::clone(&context), sink);
    (context, log, session)
}

/// Translates the signals recorded during initialize, if any ended the
/// session.
fn check_initialize(log: &SignalLog, reservation_id: i64) -> Result<(), ApiError> {
    if log.was_not_found() {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Reservation"),
            message: format!("Reservation {reservation_id} does not exist"),
        });
    }
    if log.was_sign_in_required() {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Sign in to create a reservation"),
        });
    }
    if log.was_operation_failed() {
        return Err(ApiError::Internal {
            message: String::from("Failed to load reservation details"),
        });
    }
    Ok(())
}

fn internal_format(err: time::error::Format) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to format instant: {err}"),
    }
}

fn table_info(table: &DiningTable) -> TableInfo {
    TableInfo {
        table_id: table.table_id,
        name: table.name.clone(),
        capacity: table.capacity,
    }
}

fn draft_info(draft: &ReservationDraft) -> Result<DraftInfo, ApiError> {
    Ok(DraftInfo {
        reservation_id: draft.id,
        table_id: draft.table_id,
        owner_user_id: draft.owner_user_id,
        date: draft.date.format(DATE_FORMAT).map_err(internal_format)?,
        start_time: draft.start_time.format(TIME_FORMAT).map_err(internal_format)?,
        end_time: draft.end_time.format(TIME_FORMAT).map_err(internal_format)?,
        status: draft.status.to_string(),
    })
}

fn reservation_info(reservation: &Reservation) -> Result<ReservationInfo, ApiError> {
    Ok(ReservationInfo {
        reservation_id: reservation.id,
        table_id: reservation.table_id,
        owner_user_id: reservation.owner_user_id,
        starts_at: reservation
            .starts_at
            .format(tablebook_domain::DATETIME_FORMAT)
            .map_err(internal_format)?,
        ends_at: reservation
            .ends_at
            .format(tablebook_domain::DATETIME_FORMAT)
            .map_err(internal_format)?,
        status: reservation.status.to_string(),
    })
}

/// Loads a reservation (or a new-reservation form) for display.
///
/// Anonymous callers may view existing reservations; their command gates
/// stay closed. Creating (`reservation_id == 0`) requires an identity.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `identity` - The caller's identity, if authenticated
/// * `reservation_id` - The reservation to view, or zero for a new one
///
/// # Errors
///
/// Returns an error if the reservation does not exist, creation is
/// attempted anonymously, or loading fails.
pub fn reservation_detail(
    store: &mut SqliteStore,
    identity: Option<&Identity>,
    reservation_id: i64,
) -> Result<ReservationDetailResponse, ApiError> {
    let (_context, log, mut session) = begin_session(identity, false);
    session.initialize(store, reservation_id);

    check_initialize(&lock(&log), reservation_id)?;

    let response: Result<ReservationDetailResponse, ApiError> = session.with_editor(|editor| {
        Ok(ReservationDetailResponse {
            draft: draft_info(editor.draft())?,
            tables: editor.tables().iter().map(table_info).collect(),
            permissions: PermissionsInfo {
                is_privileged: editor.permissions().is_privileged,
                is_owner: editor.permissions().is_owner,
                can_manage: editor.permissions().can_manage,
            },
            gates: GatesInfo {
                can_save: editor.gates().can_save,
                can_delete: editor.gates().can_delete,
            },
            is_existing: editor.is_existing(),
        })
    });
    session.end();
    response
}

/// Saves a reservation, creating it when `reservation_id == 0`.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `identity` - The caller's identity, if authenticated
/// * `request` - The fields to save
///
/// # Errors
///
/// Returns an error if the reservation does not exist, the caller lacks
/// permission, validation fails, the table is already booked for an
/// intersecting span, or persistence fails.
pub fn save_reservation(
    store: &mut SqliteStore,
    identity: Option<&Identity>,
    request: &SaveReservationRequest,
) -> Result<SaveReservationResponse, ApiError> {
    let date: Date = Date::parse(&request.date, DATE_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: String::from("date"),
        message: e.to_string(),
    })?;
    let start_time: Time =
        Time::parse(&request.start_time, TIME_PARSE_FORMAT).map_err(|e| ApiError::InvalidInput {
            field: String::from("start_time"),
            message: e.to_string(),
        })?;
    let end_time: Time =
        Time::parse(&request.end_time, TIME_PARSE_FORMAT).map_err(|e| ApiError::InvalidInput {
            field: String::from("end_time"),
            message: e.to_string(),
        })?;
    let status: ReservationStatus =
        ReservationStatus::from_str(&request.status).map_err(translate_domain_error)?;

    let (_context, log, mut session) = begin_session(identity, false);
    session.initialize(store, request.reservation_id);
    {
        let mut log: MutexGuard<'_, SignalLog> = lock(&log);
        check_initialize(&log, request.reservation_id)?;
        log.clear();
    }

    session.edit_draft(|draft| {
        draft.table_id = request.table_id;
        draft.date = date;
        draft.start_time = start_time;
        draft.end_time = end_time;
        draft.status = status;
    });
    session.save(store);
    session.end();

    let log: MutexGuard<'_, SignalLog> = lock(&log);
    if let Some(failure) = log.validation_failure() {
        return Err(translate_domain_error(failure.clone()));
    }
    if log.was_permission_denied() {
        return Err(ApiError::Unauthorized {
            action: String::from("save_reservation"),
            message: String::from("You do not have permission to save this reservation"),
        });
    }
    if log.was_persistence_failure() {
        return Err(ApiError::Conflict {
            message: String::from("The table is already booked for that time"),
        });
    }
    if !log.succeeded() {
        return Err(ApiError::Internal {
            message: String::from("Failed to save reservation"),
        });
    }

    debug!(reservation_id = request.reservation_id, "Reservation saved");
    Ok(SaveReservationResponse {
        reservation_id: request.reservation_id,
        message: if request.reservation_id > 0 {
            String::from("Reservation updated")
        } else {
            String::from("Reservation created")
        },
    })
}

/// Deletes a reservation.
///
/// The caller supplies the confirmation answer; a declined confirmation
/// is a successful no-op response, not an error.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `identity` - The caller's identity, if authenticated
/// * `reservation_id` - The reservation to delete
/// * `confirm` - The caller's answer to the confirmation prompt
///
/// # Errors
///
/// Returns an error if the reservation does not exist, the caller lacks
/// permission, or persistence fails.
pub fn delete_reservation(
    store: &mut SqliteStore,
    identity: Option<&Identity>,
    reservation_id: i64,
    confirm: bool,
) -> Result<DeleteReservationResponse, ApiError> {
    let (_context, log, mut session) = begin_session(identity, confirm);
    session.initialize(store, reservation_id);
    {
        let mut log: MutexGuard<'_, SignalLog> = lock(&log);
        check_initialize(&log, reservation_id)?;
        log.clear();
    }

    session.delete(store);
    session.end();

    let log: MutexGuard<'_, SignalLog> = lock(&log);
    if log.was_permission_denied() {
        return Err(ApiError::Unauthorized {
            action: String::from("delete_reservation"),
            message: String::from("You do not have permission to delete this reservation"),
        });
    }
    if log.was_persistence_failure() {
        return Err(ApiError::Conflict {
            message: String::from("The reservation could not be deleted"),
        });
    }
    if log.was_operation_failed() {
        return Err(ApiError::Internal {
            message: String::from("Failed to delete reservation"),
        });
    }

    if log.succeeded() {
        Ok(DeleteReservationResponse {
            deleted: true,
            message: String::from("Reservation deleted"),
        })
    } else {
        Ok(DeleteReservationResponse {
            deleted: false,
            message: String::from("Deletion not confirmed"),
        })
    }
}

/// Lists the reservations visible to the caller.
///
/// Staff and Admin see every reservation; Customers see their own.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `identity` - The caller's identity
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_reservations(
    store: &mut SqliteStore,
    identity: &Identity,
) -> Result<ListReservationsResponse, ApiError> {
    let result = if identity.role.is_privileged() {
        store.fetch_reservations()
    } else {
        store.fetch_reservations_for_user(identity.id)
    };
    let rows: Vec<Reservation> = result.map_err(|e| ApiError::Internal {
        message: format!("Database error: {e}"),
    })?;

    let reservations: Vec<ReservationInfo> = rows
        .iter()
        .map(reservation_info)
        .collect::<Result<_, _>>()?;
    Ok(ListReservationsResponse { reservations })
}

/// Lists every dining table.
///
/// # Arguments
///
/// * `store` - The persistence layer
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_tables(store: &mut SqliteStore) -> Result<ListTablesResponse, ApiError> {
    let tables: Vec<TableInfo> = store
        .fetch_tables()
        .map_err(|e| ApiError::Internal {
            message: format!("Database error: {e}"),
        })?
        .iter()
        .map(table_info)
        .collect();
    Ok(ListTablesResponse { tables })
}

/// Creates a dining table. Staff/Admin only.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `identity` - The caller's identity
/// * `request` - The table to create
///
/// # Errors
///
/// Returns an error if the caller lacks staff authority, the request is
/// invalid, or persistence fails.
pub fn create_table(
    store: &mut SqliteStore,
    identity: &Identity,
    request: &CreateTableRequest,
) -> Result<CreateTableResponse, ApiError> {
    if !identity.role.is_privileged() {
        return Err(ApiError::Unauthorized {
            action: String::from("create_table"),
            message: String::from("Creating tables requires Staff or Admin"),
        });
    }

    let name: &str = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Table name cannot be empty"),
        });
    }
    if request.capacity == 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("capacity"),
            message: String::from("Capacity must be at least 1"),
        });
    }

    let table_id: i64 =
        store
            .insert_table(name, request.capacity)
            .map_err(|e| ApiError::Internal {
                message: format!("Database error: {e}"),
            })?;
    Ok(CreateTableResponse {
        table_id,
        name: name.to_string(),
        message: format!("Created table '{name}'"),
    })
}

/// Registers a new account.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `request` - The registration request
///
/// # Errors
///
/// Returns an error if validation fails or the username/email is taken.
pub fn register(
    store: &mut SqliteStore,
    request: &RegisterRequest,
) -> Result<RegisterResponse, ApiError> {
    let record: UserRecord = AuthenticationService::register(store, request)?;
    Ok(RegisterResponse {
        user_id: record.user_id,
        username: record.username,
        message: String::from("Registration successful. Please log in."),
    })
}

/// Authenticates an account and opens a session.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `request` - The login request
///
/// # Errors
///
/// Returns an error if the credentials are invalid.
pub fn login(store: &mut SqliteStore, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    let (token, identity, record) =
        AuthenticationService::login(store, &request.username, &request.password)?;
    Ok(LoginResponse {
        token,
        user_id: identity.id,
        username: record.username,
        role: identity.role.to_string(),
    })
}

/// Closes the caller's session.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `token` - The bearer token to invalidate
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn logout(store: &mut SqliteStore, token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(store, token)?;
    Ok(())
}

/// Describes the authenticated account.
#[must_use]
pub fn whoami(record: &UserRecord) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: record.user_id,
        username: record.username.clone(),
        email: record.email.clone(),
        role: record.role.clone(),
    }
}

/// Updates the authenticated account's profile.
///
/// # Arguments
///
/// * `store` - The persistence layer
/// * `user_id` - The authenticated account
/// * `request` - The profile update request
///
/// # Errors
///
/// Returns an error if validation fails, a value is taken by another
/// account, or the current password does not verify.
pub fn update_profile(
    store: &mut SqliteStore,
    user_id: i64,
    request: &UpdateProfileRequest,
) -> Result<UpdateProfileResponse, ApiError> {
    let record: UserRecord = AuthenticationService::update_profile(store, user_id, request)?;
    Ok(UpdateProfileResponse {
        user_id: record.user_id,
        username: record.username,
        email: record.email,
        message: String::from("Profile updated"),
    })
}
