// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication: credential checks, bearer sessions, account
//! registration, and profile editing.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use tablebook_domain::{DATETIME_FORMAT, Identity, Role};
use tablebook_persistence::{SessionRecord, SqliteStore, UserRecord};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::{info, warn};

use crate::error::{ApiError, AuthError, translate_domain_error};
use crate::password_policy::validate_password;
use crate::request_response::{RegisterRequest, UpdateProfileRequest};

/// Minimum accepted username length.
const MIN_USERNAME_LENGTH: usize = 3;

/// The credential failure message; identical for unknown accounts and
/// wrong passwords so the response does not reveal which usernames exist.
const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (14 days).
    const SESSION_EXPIRATION: Duration = Duration::days(14);

    /// Registers a new user account.
    ///
    /// Usernames are trimmed and must be at least three characters;
    /// emails are lowercased and must be unique. Admin accounts cannot be
    /// self-registered. The password is checked against the policy and
    /// stored as a bcrypt hash.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence layer
    /// * `request` - The registration request
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the username or email is
    /// already in use, or persistence fails.
    pub fn register(
        store: &mut SqliteStore,
        request: &RegisterRequest,
    ) -> Result<UserRecord, ApiError> {
        let username: &str = request.username.trim();
        if username.len() < MIN_USERNAME_LENGTH {
            return Err(ApiError::InvalidInput {
                field: String::from("username"),
                message: format!("Username must be at least {MIN_USERNAME_LENGTH} characters"),
            });
        }

        let email: String = normalize_email(&request.email)?;

        let role: Role = Role::from_str(&request.role).map_err(translate_domain_error)?;
        if role == Role::Admin {
            return Err(ApiError::Unauthorized {
                action: String::from("register"),
                message: String::from("Admin accounts cannot be self-registered"),
            });
        }

        validate_password(&request.password, &request.confirm_password, username)?;

        if store.username_taken(username, 0).map_err(internal)? {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("unique_username"),
                message: format!("Username '{username}' is already in use"),
            });
        }
        if store.email_taken(&email, 0).map_err(internal)? {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("unique_email"),
                message: format!("Email '{email}' is already in use"),
            });
        }

        let password_hash: String =
            bcrypt::hash(&request.password, bcrypt::DEFAULT_COST).map_err(|e| {
                ApiError::Internal {
                    message: format!("Failed to hash password: {e}"),
                }
            })?;

        let user_id: i64 = store
            .create_user(username, &email, &password_hash, role.as_str(), Self::now())
            .map_err(internal)?;
        info!(user_id, username, role = %role, "Registered user");

        store
            .get_user(user_id)
            .map_err(internal)?
            .ok_or_else(|| ApiError::Internal {
                message: String::from("Registered account could not be read back"),
            })
    }

    /// Authenticates an account and creates a bearer session.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence layer
    /// * `username` - The login name
    /// * `password` - The account password
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `identity`, `account`).
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are invalid or persistence
    /// fails.
    pub fn login(
        store: &mut SqliteStore,
        username: &str,
        password: &str,
    ) -> Result<(String, Identity, UserRecord), AuthError> {
        let record: UserRecord = store
            .get_user_by_username(username.trim())
            .map_err(map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from(BAD_CREDENTIALS),
            })?;

        let verified: bool =
            bcrypt::verify(password, &record.password_hash).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Password verification failed: {e}"),
                }
            })?;
        if !verified {
            warn!(username = %record.username, "Login with wrong password");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from(BAD_CREDENTIALS),
            });
        }

        let role: Role = parse_stored_role(&record)?;

        let token: String = Self::generate_session_token();
        let now: PrimitiveDateTime = Self::now();
        store
            .create_session(&token, record.user_id, now, now + Self::SESSION_EXPIRATION)
            .map_err(map_persistence_error)?;
        info!(user_id = record.user_id, "Login succeeded");

        Ok((token, Identity::new(record.user_id, role), record))
    }

    /// Validates a session token and returns the authenticated identity.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence layer
    /// * `token` - The bearer token to validate
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the
    /// account no longer exists.
    pub fn validate_session(
        store: &mut SqliteStore,
        token: &str,
    ) -> Result<(Identity, UserRecord), AuthError> {
        let session: SessionRecord = store
            .get_session(token)
            .map_err(map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: PrimitiveDateTime =
            PrimitiveDateTime::parse(&session.expires_at, DATETIME_FORMAT).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to parse session expiration: {e}"),
                }
            })?;
        let now: PrimitiveDateTime = Self::now();
        if now > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let record: UserRecord = store
            .get_user(session.user_id)
            .map_err(map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        let role: Role = parse_stored_role(&record)?;

        store
            .touch_session(session.session_id, now)
            .map_err(map_persistence_error)?;

        Ok((Identity::new(record.user_id, role), record))
    }

    /// Logs out by deleting the session.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence layer
    /// * `token` - The bearer token to invalidate
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails. Deleting an already-gone
    /// session is not an error.
    pub fn logout(store: &mut SqliteStore, token: &str) -> Result<(), AuthError> {
        store.delete_session(token).map_err(map_persistence_error)?;
        Ok(())
    }

    /// Updates an account's profile (username, email, optionally the
    /// password).
    ///
    /// Username and email changes are checked for uniqueness against
    /// other accounts only, so re-submitting unchanged values succeeds.
    /// A password change requires the current password to verify.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence layer
    /// * `user_id` - The account being edited
    /// * `request` - The profile update request
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, a value is already in use by
    /// another account, the current password does not verify, or
    /// persistence fails.
    pub fn update_profile(
        store: &mut SqliteStore,
        user_id: i64,
        request: &UpdateProfileRequest,
    ) -> Result<UserRecord, ApiError> {
        let record: UserRecord =
            store
                .get_user(user_id)
                .map_err(internal)?
                .ok_or_else(|| ApiError::ResourceNotFound {
                    resource_type: String::from("Account"),
                    message: format!("Account {user_id} does not exist"),
                })?;

        let username: &str = request.username.trim();
        if username.len() < MIN_USERNAME_LENGTH {
            return Err(ApiError::InvalidInput {
                field: String::from("username"),
                message: format!("Username must be at least {MIN_USERNAME_LENGTH} characters"),
            });
        }
        let email: String = normalize_email(&request.email)?;

        if store.username_taken(username, user_id).map_err(internal)? {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("unique_username"),
                message: format!("Username '{username}' is already in use by another account"),
            });
        }
        if store.email_taken(&email, user_id).map_err(internal)? {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("unique_email"),
                message: format!("Email '{email}' is already in use by another account"),
            });
        }

        if let Some(new_password) = &request.new_password {
            let current: &str = request.current_password.as_deref().ok_or_else(|| {
                ApiError::AuthenticationFailed {
                    reason: String::from("Current password is required to change the password"),
                }
            })?;
            let verified: bool = bcrypt::verify(current, &record.password_hash).map_err(|e| {
                ApiError::Internal {
                    message: format!("Password verification failed: {e}"),
                }
            })?;
            if !verified {
                return Err(ApiError::AuthenticationFailed {
                    reason: String::from("Current password is incorrect"),
                });
            }

            let confirmation: &str = request.confirm_password.as_deref().unwrap_or_default();
            validate_password(new_password, confirmation, username)?;

            let password_hash: String = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
                .map_err(|e| ApiError::Internal {
                    message: format!("Failed to hash password: {e}"),
                })?;
            store
                .update_user_password(user_id, &password_hash)
                .map_err(internal)?;
        }

        store
            .update_user_profile(user_id, username, &email)
            .map_err(internal)?;
        info!(user_id, username, "Profile updated");

        store
            .get_user(user_id)
            .map_err(internal)?
            .ok_or_else(|| ApiError::Internal {
                message: String::from("Updated account could not be read back"),
            })
    }

    /// Generates an opaque session token.
    fn generate_session_token() -> String {
        let timestamp: u128 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        format!("session_{timestamp}_{:016x}", rand::random::<u64>())
    }

    /// The current instant, as stored (UTC, no offset).
    fn now() -> PrimitiveDateTime {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// Trims, lowercases, and shape-checks an email address.
fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email: String = email.trim().to_lowercase();
    let well_formed: bool = email.contains('@')
        && !email.starts_with('@')
        && !email.ends_with('@')
        && !email.chars().any(char::is_whitespace);
    if well_formed {
        Ok(email)
    } else {
        Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: String::from("Enter a valid email address"),
        })
    }
}

/// Parses the role column of a stored account.
fn parse_stored_role(record: &UserRecord) -> Result<Role, AuthError> {
    Role::from_str(&record.role).map_err(|e| AuthError::AuthenticationFailed {
        reason: format!("Stored role is invalid: {e}"),
    })
}

/// Maps persistence errors to authentication errors.
fn map_persistence_error(err: tablebook_persistence::PersistenceError) -> AuthError {
    AuthError::AuthenticationFailed {
        reason: format!("Database error: {err}"),
    }
}

/// Maps persistence errors to internal API errors.
fn internal(err: tablebook_persistence::PersistenceError) -> ApiError {
    ApiError::Internal {
        message: format!("Database error: {err}"),
    }
}
