//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lifecycle violations, conflicts). Infrastructure outages are reported via
/// `DependencyUnavailable` by the service layer that talked to the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A state-machine transition that the current state does not allow.
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    /// A conflict occurred (e.g. duplicate creation).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An external collaborator (contract/ledger/cache/task store) was
    /// unreachable. Callers see no partial results.
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
