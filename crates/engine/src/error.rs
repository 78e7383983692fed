//! Engine error type and sqlx error classification.

use marginalia_core::error::CoreError;

/// An error raised by an engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level failure (not found, conflict, forbidden, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A transient concurrency failure; callers should retry.
    #[error("Concurrency conflict: {0}")]
    Concurrency(String),

    /// An unclassified database failure.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl EngineError {
    /// Whether the caller should retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Concurrency(_))
    }
}

/// Convenience alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Classify a sqlx error into the engine taxonomy.
///
/// - Serialization failures and deadlocks (SQLSTATE `40001` / `40P01`) are
///   retryable [`EngineError::Concurrency`].
/// - A unique violation on a per-voter constraint means two submissions of
///   the same vote raced; the loser retries and observes the winner's vote.
/// - Any other `uq_`-named unique violation is a user-facing conflict (e.g.
///   a second pending edit losing the partial-index race).
/// - Everything else is an opaque database error.
impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("40001") | Some("40P01") => {
                    return Self::Concurrency("transaction serialization failure".to_string());
                }
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                    if constraint.ends_with("_voter") {
                        return Self::Concurrency(format!(
                            "concurrent duplicate vote ({constraint})"
                        ));
                    }
                    if constraint.starts_with("uq_") {
                        return Self::Core(CoreError::Conflict(format!(
                            "Duplicate value violates unique constraint: {constraint}"
                        )));
                    }
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}
