// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs for tables without a domain counterpart.
//!
//! Roles and instants are stored as strings; parsing into domain types is
//! the API layer's concern, so that malformed rows surface there as
//! authentication failures rather than panics.

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// The canonical numeric identifier.
    pub user_id: i64,
    /// The unique login name.
    pub username: String,
    /// The unique, lowercased email address.
    pub email: String,
    /// The bcrypt hash of the account password.
    pub password_hash: String,
    /// The account role, stored as its string representation.
    pub role: String,
}

/// A stored login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// The canonical numeric identifier.
    pub session_id: i64,
    /// The opaque bearer token.
    pub token: String,
    /// The account this session belongs to.
    pub user_id: i64,
    /// When the session was created.
    pub created_at: String,
    /// When the session expires.
    pub expires_at: String,
    /// When the session was last used.
    pub last_seen_at: String,
}
