//! Domain error taxonomy.
//!
//! Four caller-visible kinds map onto these variants:
//! - invariant violations (programmer error, abort the transaction) are
//!   [`CoreError::Internal`];
//! - expected user-facing rejections (no-op edit, duplicate pending edit,
//!   self-vote, voting on a terminal edit) are [`CoreError::Conflict`];
//! - capability failures are [`CoreError::Forbidden`] so callers can render
//!   a 403-equivalent rather than a form error;
//! - malformed input is [`CoreError::Validation`].
//!
//! Transient concurrency failures are not a `CoreError`; the engine crate
//! raises them separately as retryable.

/// A domain-level error.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup failed.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with current state (expected, user-facing).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The acting user lacks the required capability.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An invariant was violated; never recoverable.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for fallible domain functions.
pub type CoreResult<T> = Result<T, CoreError>;
