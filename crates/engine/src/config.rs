//! Engine configuration loaded from environment variables.

/// Tunable thresholds and reputation deltas.
///
/// All fields have defaults suitable for local development and tests.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Edit weight at or above which a pending edit is approved
    /// (default: `2`).
    pub edit_approval_threshold: i64,
    /// Edit weight at or below which a pending edit is rejected
    /// (default: `-2`).
    pub edit_rejection_threshold: i64,
    /// Reputation awarded to an annotation's author per upvote
    /// (default: `5`).
    pub annotation_upvote_delta: i64,
    /// Reputation deducted from an annotation's author per downvote,
    /// before the floor-at-zero clamp (default: `-2`).
    pub annotation_downvote_delta: i64,
    /// Reputation awarded to an editor when their edit is approved by
    /// consensus (default: `2`).
    pub edit_approval_delta: i64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `EDIT_APPROVAL_THRESHOLD`   | `2`     |
    /// | `EDIT_REJECTION_THRESHOLD`  | `-2`    |
    /// | `ANNOTATION_UPVOTE_DELTA`   | `5`     |
    /// | `ANNOTATION_DOWNVOTE_DELTA` | `-2`    |
    /// | `EDIT_APPROVAL_DELTA`       | `2`     |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            edit_approval_threshold: env_i64("EDIT_APPROVAL_THRESHOLD", defaults.edit_approval_threshold),
            edit_rejection_threshold: env_i64("EDIT_REJECTION_THRESHOLD", defaults.edit_rejection_threshold),
            annotation_upvote_delta: env_i64("ANNOTATION_UPVOTE_DELTA", defaults.annotation_upvote_delta),
            annotation_downvote_delta: env_i64("ANNOTATION_DOWNVOTE_DELTA", defaults.annotation_downvote_delta),
            edit_approval_delta: env_i64("EDIT_APPROVAL_DELTA", defaults.edit_approval_delta),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            edit_approval_threshold: 2,
            edit_rejection_threshold: -2,
            annotation_upvote_delta: 5,
            annotation_downvote_delta: -2,
            edit_approval_delta: 2,
        }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid i64")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.edit_approval_threshold, 2);
        assert_eq!(config.edit_rejection_threshold, -2);
        assert_eq!(config.annotation_upvote_delta, 5);
        assert_eq!(config.annotation_downvote_delta, -2);
        assert_eq!(config.edit_approval_delta, 2);
    }
}
