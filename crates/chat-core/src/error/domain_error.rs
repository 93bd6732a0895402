//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Identifier Errors
    // =========================================================================
    #[error("{kind} must not be empty")]
    EmptyIdentifier { kind: &'static str },

    // =========================================================================
    // Envelope Errors
    // =========================================================================
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
