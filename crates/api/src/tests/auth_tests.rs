// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for registration, login, sessions, and profile editing.

use crate::request_response::{RegisterRequest, UpdateProfileRequest};
use crate::{ApiError, AuthError, AuthenticationService};
use tablebook_domain::{Identity, Role};
use tablebook_persistence::{SqliteStore, UserRecord};
use time::macros::datetime;

use super::{PASSWORD, register_request, seeded_store};

#[test]
fn test_register_and_login_round_trip() {
    let mut store: SqliteStore = seeded_store();

    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("alice", "Customer"))
            .unwrap();
    assert_eq!(record.username, "alice");
    assert_eq!(record.email, "alice@example.com");
    assert_eq!(record.role, "Customer");
    // The password is stored hashed, never in the clear.
    assert_ne!(record.password_hash, PASSWORD);

    let (token, identity, _record) =
        AuthenticationService::login(&mut store, "alice", PASSWORD).unwrap();
    assert_eq!(identity, Identity::new(record.user_id, Role::Customer));
    assert!(!token.is_empty());
}

#[test]
fn test_login_with_wrong_password_fails() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();

    let result = AuthenticationService::login(&mut store, "alice", "WrongPass1!");

    assert!(matches!(
        result.unwrap_err(),
        AuthError::AuthenticationFailed { .. }
    ));
}

#[test]
fn test_login_with_unknown_user_fails_with_same_message() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();

    let unknown = AuthenticationService::login(&mut store, "mallory", PASSWORD).unwrap_err();
    let wrong = AuthenticationService::login(&mut store, "alice", "WrongPass1!").unwrap_err();

    // Neither response reveals whether the username exists.
    assert_eq!(unknown, wrong);
}

#[test]
fn test_admin_self_registration_is_rejected() {
    let mut store: SqliteStore = seeded_store();

    let result = AuthenticationService::register(&mut store, &register_request("eve", "Admin"));

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
}

#[test]
fn test_staff_may_self_register() {
    let mut store: SqliteStore = seeded_store();

    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("bob", "Staff")).unwrap();

    assert_eq!(record.role, "Staff");
}

#[test]
fn test_duplicate_username_is_rejected() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();

    let mut request: RegisterRequest = register_request("alice", "Customer");
    request.email = String::from("other@example.com");
    let result = AuthenticationService::register(&mut store, &request);

    let err: ApiError = result.unwrap_err();
    assert!(matches!(err, ApiError::DomainRuleViolation { .. }));
    if let ApiError::DomainRuleViolation { rule, .. } = err {
        assert_eq!(rule, "unique_username");
    }
}

#[test]
fn test_duplicate_email_is_rejected() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();

    let mut request: RegisterRequest = register_request("alice2", "Customer");
    request.email = String::from("ALICE@example.com"); // lowercased before the check
    let result = AuthenticationService::register(&mut store, &request);

    let err: ApiError = result.unwrap_err();
    assert!(matches!(err, ApiError::DomainRuleViolation { .. }));
    if let ApiError::DomainRuleViolation { rule, .. } = err {
        assert_eq!(rule, "unique_email");
    }
}

#[test]
fn test_short_username_is_rejected() {
    let mut store: SqliteStore = seeded_store();

    let result = AuthenticationService::register(&mut store, &register_request("al", "Customer"));

    assert!(matches!(result.unwrap_err(), ApiError::InvalidInput { .. }));
}

#[test]
fn test_malformed_email_is_rejected() {
    let mut store: SqliteStore = seeded_store();
    let mut request: RegisterRequest = register_request("alice", "Customer");
    request.email = String::from("not-an-email");

    let result = AuthenticationService::register(&mut store, &request);

    let err: ApiError = result.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
    if let ApiError::InvalidInput { field, .. } = err {
        assert_eq!(field, "email");
    }
}

#[test]
fn test_password_policy_is_enforced_on_registration() {
    let mut store: SqliteStore = seeded_store();

    let mut request: RegisterRequest = register_request("alice", "Customer");
    request.password = String::from("short1");
    request.confirm_password = String::from("short1");
    assert!(matches!(
        AuthenticationService::register(&mut store, &request).unwrap_err(),
        ApiError::InvalidInput { .. }
    ));

    let mut request: RegisterRequest = register_request("alice", "Customer");
    request.confirm_password = String::from("Different1!");
    assert!(matches!(
        AuthenticationService::register(&mut store, &request).unwrap_err(),
        ApiError::InvalidInput { .. }
    ));
}

#[test]
fn test_validate_session_round_trip() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();
    let (token, identity, _record) =
        AuthenticationService::login(&mut store, "alice", PASSWORD).unwrap();

    let (validated, record) = AuthenticationService::validate_session(&mut store, &token).unwrap();

    assert_eq!(validated, identity);
    assert_eq!(record.username, "alice");
}

#[test]
fn test_logout_invalidates_the_session() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();
    let (token, _identity, _record) =
        AuthenticationService::login(&mut store, "alice", PASSWORD).unwrap();

    AuthenticationService::logout(&mut store, &token).unwrap();

    let result = AuthenticationService::validate_session(&mut store, &token);
    assert!(matches!(
        result.unwrap_err(),
        AuthError::AuthenticationFailed { .. }
    ));
}

#[test]
fn test_expired_session_is_rejected() {
    let mut store: SqliteStore = seeded_store();
    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("alice", "Customer"))
            .unwrap();
    store
        .create_session(
            "stale-token",
            record.user_id,
            datetime!(2020-01-01 12:00),
            datetime!(2020-01-15 12:00),
        )
        .unwrap();

    let result = AuthenticationService::validate_session(&mut store, "stale-token");

    let err: AuthError = result.unwrap_err();
    assert!(matches!(err, AuthError::AuthenticationFailed { .. }));
    assert!(err.to_string().contains("expired"));
}

#[test]
fn test_profile_update_changes_username_and_email() {
    let mut store: SqliteStore = seeded_store();
    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("alice", "Customer"))
            .unwrap();

    let updated: UserRecord = AuthenticationService::update_profile(
        &mut store,
        record.user_id,
        &UpdateProfileRequest {
            username: String::from("alice-v2"),
            email: String::from("Alice.V2@Example.com"),
            current_password: None,
            new_password: None,
            confirm_password: None,
        },
    )
    .unwrap();

    assert_eq!(updated.username, "alice-v2");
    assert_eq!(updated.email, "alice.v2@example.com");
}

#[test]
fn test_profile_update_accepts_unchanged_values() {
    let mut store: SqliteStore = seeded_store();
    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("alice", "Customer"))
            .unwrap();

    // Re-submitting one's own username/email is not a uniqueness conflict.
    let result = AuthenticationService::update_profile(
        &mut store,
        record.user_id,
        &UpdateProfileRequest {
            username: record.username.clone(),
            email: record.email.clone(),
            current_password: None,
            new_password: None,
            confirm_password: None,
        },
    );

    assert!(result.is_ok());
}

#[test]
fn test_profile_update_rejects_email_of_another_account() {
    let mut store: SqliteStore = seeded_store();
    AuthenticationService::register(&mut store, &register_request("alice", "Customer")).unwrap();
    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("bob", "Customer")).unwrap();

    let result = AuthenticationService::update_profile(
        &mut store,
        record.user_id,
        &UpdateProfileRequest {
            username: String::from("bob"),
            email: String::from("alice@example.com"),
            current_password: None,
            new_password: None,
            confirm_password: None,
        },
    );

    let err: ApiError = result.unwrap_err();
    assert!(matches!(err, ApiError::DomainRuleViolation { .. }));
    if let ApiError::DomainRuleViolation { rule, .. } = err {
        assert_eq!(rule, "unique_email");
    }
}

#[test]
fn test_password_change_requires_correct_current_password() {
    let mut store: SqliteStore = seeded_store();
    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("alice", "Customer"))
            .unwrap();

    let result = AuthenticationService::update_profile(
        &mut store,
        record.user_id,
        &UpdateProfileRequest {
            username: String::from("alice"),
            email: String::from("alice@example.com"),
            current_password: Some(String::from("WrongPass1!")),
            new_password: Some(String::from("NewSecret2!")),
            confirm_password: Some(String::from("NewSecret2!")),
        },
    );

    assert!(matches!(
        result.unwrap_err(),
        ApiError::AuthenticationFailed { .. }
    ));
}

#[test]
fn test_password_change_round_trip() {
    let mut store: SqliteStore = seeded_store();
    let record: UserRecord =
        AuthenticationService::register(&mut store, &register_request("alice", "Customer"))
            .unwrap();

    AuthenticationService::update_profile(
        &mut store,
        record.user_id,
        &UpdateProfileRequest {
            username: String::from("alice"),
            email: String::from("alice@example.com"),
            current_password: Some(PASSWORD.to_string()),
            new_password: Some(String::from("NewSecret2!")),
            confirm_password: Some(String::from("NewSecret2!")),
        },
    )
    .unwrap();

    assert!(AuthenticationService::login(&mut store, "alice", PASSWORD).is_err());
    assert!(AuthenticationService::login(&mut store, "alice", "NewSecret2!").is_ok());
}
