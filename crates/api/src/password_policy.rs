// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation.
//!
//! Enforces password requirements for account registration and password
//! changes.

use thiserror::Error;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Character classes (of four) a password must mix.
const MIN_CHARACTER_CLASSES: usize = 2;

/// Password policy errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Password does not meet complexity requirements.
    #[error(
        "Password must mix at least two of: uppercase letters, lowercase letters, digits, symbols"
    )]
    InsufficientComplexity,

    /// Password matches the username.
    #[error("Password must not match the username")]
    MatchesUsername,

    /// Password and confirmation do not match.
    #[error("Password and confirmation do not match")]
    ConfirmationMismatch,
}

/// Validates a password against the policy.
///
/// # Arguments
///
/// * `password` - The candidate password
/// * `confirmation` - The password confirmation
/// * `username` - The account username (the password must not match it)
///
/// # Errors
///
/// Returns a `PasswordPolicyError` if the password does not meet policy
/// requirements.
pub fn validate_password(
    password: &str,
    confirmation: &str,
    username: &str,
) -> Result<(), PasswordPolicyError> {
    if password != confirmation {
        return Err(PasswordPolicyError::ConfirmationMismatch);
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min_length: MIN_PASSWORD_LENGTH,
        });
    }

    if character_classes(password) < MIN_CHARACTER_CLASSES {
        return Err(PasswordPolicyError::InsufficientComplexity);
    }

    if password.eq_ignore_ascii_case(username) {
        return Err(PasswordPolicyError::MatchesUsername);
    }

    Ok(())
}

/// Counts which of the four character classes are present.
fn character_classes(password: &str) -> usize {
    let has_uppercase: bool = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase: bool = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit: bool = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol: bool = password
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace());

    usize::from(has_uppercase)
        + usize::from(has_lowercase)
        + usize::from(has_digit)
        + usize::from(has_symbol)
}
