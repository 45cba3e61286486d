// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction and authentication for the server.
//!
//! This module provides Axum extractors for validating bearer tokens and
//! enforcing authentication at the server boundary.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tablebook_api::AuthenticationService;
use tablebook_domain::Identity;
use tablebook_persistence::UserRecord;
use tracing::{debug, warn};

use crate::AppState;

/// Extractor for authenticated callers.
///
/// Validates the `Authorization: Bearer <token>` header via
/// [`AuthenticationService::validate_session`] and rejects the request
/// with HTTP 401 when the header is missing, malformed, or names an
/// unknown or expired session.
pub struct SessionUser {
    /// The authenticated identity.
    pub identity: Identity,
    /// The stored account behind the identity.
    pub account: UserRecord,
    /// The validated bearer token (needed for logout).
    pub token: String,
}

/// Extractor admitting anonymous callers.
///
/// Yields `None` when no Authorization header is present; a header that
/// is present but invalid is still rejected, so a stale token never
/// silently downgrades to anonymous access.
pub struct MaybeSessionUser(pub Option<SessionUser>);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        let mut store = state.store.lock().await;
        let (identity, account) = AuthenticationService::validate_session(&mut store, token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
        drop(store);

        debug!(user_id = identity.id, role = %identity.role, "Session validated");

        Ok(Self {
            identity,
            account,
            token: token.to_string(),
        })
    }
}

impl FromRequestParts<AppState> for MaybeSessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get("Authorization").is_none() {
            return Ok(Self(None));
        }
        let user: SessionUser = SessionUser::from_request_parts(parts, state).await?;
        Ok(Self(Some(user)))
    }
}

/// Session extraction errors.
///
/// These are returned when session validation fails and are converted to
/// HTTP responses automatically.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthorizationHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            Self::InvalidAuthorizationHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    format!("Session validation failed: {reason}"),
                )
                    .into_response();
            }
        };

        (status, message).into_response()
    }
}
