//! Error model shared by every layer of the workspace.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The variants form the access-control taxonomy: transports map them to
/// redirects (pages) or status codes (JSON APIs). `NotFound` covers both
/// "absent" and "filtered out by tenant scope".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No valid session where one is required.
    #[error("authentication required")]
    Unauthenticated,

    /// Valid session with insufficient role or a tenant mismatch.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource absent or outside the caller's tenant scope.
    #[error("not found")]
    NotFound,

    /// A unique key (email, tenant slug) is already taken, or the change would
    /// break a global invariant.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A server-side primitive failed (token signing, password hashing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type returned by storage adapters.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage adapter error.
///
/// Adapters translate backend-specific failures into these two buckets; the
/// only one callers branch on is the uniqueness violation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(what) => DomainError::Conflict(format!("{what} already exists")),
            StoreError::Backend(msg) => DomainError::Storage(msg),
        }
    }
}
