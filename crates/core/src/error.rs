//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only (validation, stock rules, lookups).
/// File and parse failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request value failed validation (e.g. empty borrower, zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A check-out asked for more units than are currently available.
    #[error("insufficient availability: requested {requested}, available {available}")]
    InsufficientAvailability { requested: u32, available: u32 },

    /// No fixture exists for the given article/system pair.
    #[error("not found: {0}")]
    NotFound(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient(requested: u32, available: u32) -> Self {
        Self::InsufficientAvailability {
            requested,
            available,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
