//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP mapping lives in `api::error`.

use std::fmt;

use sea_orm::{DbErr, SqlErr};

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Entity absent (or hidden from the requester)
    NotFound(String),
    /// Duplicate join/create, or leaving something the user is not part of
    Conflict(String),
    /// Authorization rule violation, always with a human-readable reason
    Forbidden(String),
    /// Missing or invalid credential
    Unauthenticated(String),
    /// Malformed or out-of-range input
    Validation(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(format!("{} not found", what))
    }

    pub fn message(&self) -> &str {
        match self {
            DomainError::NotFound(msg)
            | DomainError::Conflict(msg)
            | DomainError::Forbidden(msg)
            | DomainError::Unauthenticated(msg)
            | DomainError::Validation(msg)
            | DomainError::Database(msg)
            | DomainError::Internal(msg) => msg,
        }
    }

    /// Turns a unique-constraint violation into a Conflict carrying `message`.
    /// Any other database error is passed through unchanged.
    pub fn conflict_on_duplicate(err: DbErr, message: &str) -> Self {
        let duplicate = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
            // SQLite reports composite primary keys as SQLITE_CONSTRAINT_PRIMARYKEY
            || err.to_string().contains("UNIQUE constraint failed");
        if duplicate {
            DomainError::Conflict(message.to_string())
        } else {
            DomainError::from(err)
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            DomainError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure and service layers)
impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
