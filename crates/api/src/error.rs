// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use tablebook_domain::DomainError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// A human-readable description of the denial.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action, message } => {
                write!(f, "Unauthorized ({action}): {message}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// A human-readable description of the denial.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The operation collided with existing data (e.g. a booking overlap).
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action, message } => {
                write!(f, "Unauthorized ({action}): {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized { action, message } => Self::Unauthorized { action, message },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::InvalidInput {
            field: String::from("password"),
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly. Validation rules become rule violations; parse failures
/// become invalid input.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::TableRequired => ApiError::DomainRuleViolation {
            rule: String::from("table_required"),
            message: String::from("Select a table before saving"),
        },
        DomainError::EndNotAfterStart { .. } => ApiError::DomainRuleViolation {
            rule: String::from("end_after_start"),
            message: err.to_string(),
        },
        DomainError::StartInPast { .. } => ApiError::DomainRuleViolation {
            rule: String::from("no_past_start"),
            message: err.to_string(),
        },
        DomainError::InvalidRole(value) => ApiError::InvalidInput {
            field: String::from("role"),
            message: format!("'{value}' is not a recognized role"),
        },
        DomainError::InvalidStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{value}' is not a recognized reservation status"),
        },
    }
}
