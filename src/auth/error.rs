//! Error taxonomy for the auth core.
//!
//! Client-facing variants carry a stable machine-checkable kind; `Hashing`
//! and `Storage` are internal faults that must never leak details to the
//! response body.

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Signup attempted with a username that already exists.
    #[error("Username already exists")]
    DuplicateUsername,

    /// Login failed. Deliberately covers both unknown-username and
    /// wrong-password so responses cannot be used for username enumeration.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session identifier was presented.
    #[error("Not authenticated")]
    Unauthenticated,

    /// A session identifier was presented but no live session matches it
    /// (absent, revoked, or past its expiry).
    #[error("Invalid session")]
    InvalidSession,

    /// Signup input rejected before touching the store.
    #[error("{0}")]
    Validation(String),

    /// bcrypt failure while hashing a new password.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Underlying persistence unavailable, timed out, or returned an
    /// unexpected failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Stable kind string for response bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::DuplicateUsername => "duplicate_username",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidSession => "invalid_session",
            AuthError::Validation(_) => "invalid_request",
            AuthError::Hashing(_) | AuthError::Storage(_) => "internal_error",
        }
    }

    /// True for faults that should surface as a 5xx rather than a 4xx.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Hashing(_) | AuthError::Storage(_))
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        AuthError::Storage(e.to_string())
    }
}
