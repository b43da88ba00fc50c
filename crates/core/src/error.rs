//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Infrastructure
/// concerns belong elsewhere. Every variant is a terminal, user-visible outcome;
/// none of them is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing, malformed or expired credentials, or an inactive actor.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The actor is known but not allowed to perform the operation.
    #[error("forbidden")]
    Forbidden,

    /// The resource is absent, or outside the caller's tenant/ownership scope.
    ///
    /// Scoping mismatches are deliberately reported as `NotFound` rather than
    /// `Forbidden`, so callers cannot probe for resources in other tenants.
    #[error("not found")]
    NotFound,

    /// A business-rule conflict (duplicate application, last-OWNER violation,
    /// user already a member, referenced resume).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A lifecycle state machine rejected the requested transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
