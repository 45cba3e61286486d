// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Schema initialization failed.
    InitializationError(String),
    /// Query execution failed.
    QueryFailed(String),
    /// A stored value could not be formatted or parsed.
    SerializationError(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

impl From<time::error::Format> for PersistenceError {
    fn from(err: time::error::Format) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<time::error::Parse> for PersistenceError {
    fn from(err: time::error::Parse) -> Self {
        Self::SerializationError(err.to_string())
    }
}
