//! Reputation math: vote power curve, ledger causes, and the floor-at-zero
//! clamp.
//!
//! Reputation is a 64-bit integer so long-lived accounts cannot overflow it.
//! Every mutation goes through a ledger entry; the functions here compute the
//! deltas, the `engine` crate applies them transactionally.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Ledger causes
// ---------------------------------------------------------------------------

/// The cause attached to a reputation ledger entry.
///
/// Stored as a string column; each cause carries the nominal delta it applies
/// (the stored delta may be smaller when the floor clamp engages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationCause {
    /// An upvote on one of the user's annotations.
    AnnotationUpvote,
    /// A downvote on one of the user's annotations.
    AnnotationDownvote,
    /// One of the user's proposed edits was approved by peer review.
    EditApproval,
}

/// All valid cause strings.
const VALID_CAUSE_STRINGS: &[&str] = &["annotation_upvote", "annotation_downvote", "edit_approval"];

impl ReputationCause {
    /// Return the cause as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnnotationUpvote => "annotation_upvote",
            Self::AnnotationDownvote => "annotation_downvote",
            Self::EditApproval => "edit_approval",
        }
    }

    /// Parse a cause from its stored string form.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "annotation_upvote" => Ok(Self::AnnotationUpvote),
            "annotation_downvote" => Ok(Self::AnnotationDownvote),
            "edit_approval" => Ok(Self::EditApproval),
            _ => Err(CoreError::Validation(format!(
                "Invalid reputation cause '{s}'. Must be one of: {}",
                VALID_CAUSE_STRINGS.join(", ")
            ))),
        }
    }

    /// Whether this cause deducts reputation and is therefore subject to the
    /// floor-at-zero clamp.
    pub fn is_deduction(&self) -> bool {
        matches!(self, Self::AnnotationDownvote)
    }
}

// ---------------------------------------------------------------------------
// Vote power curve
// ---------------------------------------------------------------------------

/// Upvote power for a user with the given reputation.
///
/// `1` for reputation <= 1, otherwise `floor(10 * log10(reputation))`: a
/// slowly-growing influence curve that rewards sustained contribution without
/// letting a high-reputation user dominate a single ballot.
pub fn up_power(reputation: i64) -> i64 {
    if reputation <= 1 {
        1
    } else {
        (10.0 * (reputation as f64).log10()).floor() as i64
    }
}

/// Downvote power for a user with the given reputation.
///
/// Half the upvote power, negated, but never weaker than `-1`.
pub fn down_power(reputation: i64) -> i64 {
    let up = up_power(reputation);
    if up / 2 <= 1 {
        -1
    } else {
        -(up / 2)
    }
}

// ---------------------------------------------------------------------------
// Floor-at-zero clamp
// ---------------------------------------------------------------------------

/// Clamp a nominal delta so the resulting reputation cannot go below zero.
///
/// Returns the effective delta to store in the ledger. When the clamp
/// engages, the stored delta is `-reputation`, not the nominal delta; the
/// operation still succeeds (the clamp is policy, not an error).
pub fn clamp_delta(reputation: i64, nominal_delta: i64) -> i64 {
    if reputation + nominal_delta < 0 {
        -reputation
    } else {
        nominal_delta
    }
}

/// Effective delta to remove when reversing a ledger entry.
///
/// The inverse of [`clamp_delta`]: subtracting the recorded delta must not
/// push reputation below zero either (the recorded delta may have been earned
/// and partially spent since).
pub fn clamp_reversal(reputation: i64, recorded_delta: i64) -> i64 {
    if reputation - recorded_delta < 0 {
        reputation
    } else {
        recorded_delta
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- up_power ----------------------------------------------------------

    #[test]
    fn up_power_floors_at_one() {
        assert_eq!(up_power(0), 1);
        assert_eq!(up_power(1), 1);
        assert_eq!(up_power(-3), 1);
    }

    #[test]
    fn up_power_log_curve() {
        assert_eq!(up_power(10), 10);
        assert_eq!(up_power(100), 20);
        assert_eq!(up_power(1000), 30);
        // floor(10 * log10(50)) = floor(16.98) = 16
        assert_eq!(up_power(50), 16);
    }

    #[test]
    fn up_power_between_one_and_ten() {
        // floor(10 * log10(2)) = 3
        assert_eq!(up_power(2), 3);
        // floor(10 * log10(9)) = 9
        assert_eq!(up_power(9), 9);
    }

    // -- down_power --------------------------------------------------------

    #[test]
    fn down_power_floors_at_minus_one() {
        assert_eq!(down_power(0), -1);
        assert_eq!(down_power(1), -1);
        // up_power(2) = 3, 3/2 = 1 <= 1 so still -1
        assert_eq!(down_power(2), -1);
    }

    #[test]
    fn down_power_is_half_up_power() {
        // up_power(100) = 20 -> -10
        assert_eq!(down_power(100), -10);
        // up_power(50) = 16 -> -8
        assert_eq!(down_power(50), -8);
    }

    // -- clamp_delta -------------------------------------------------------

    #[test]
    fn clamp_passes_through_when_safe() {
        assert_eq!(clamp_delta(10, -5), -5);
        assert_eq!(clamp_delta(10, 5), 5);
        assert_eq!(clamp_delta(5, -5), -5);
    }

    #[test]
    fn clamp_engages_below_zero() {
        assert_eq!(clamp_delta(3, -5), -3);
        assert_eq!(clamp_delta(0, -2), 0);
    }

    #[test]
    fn clamp_reversal_mirrors_clamp() {
        // Reversing a +5 award when only 3 remain removes 3.
        assert_eq!(clamp_reversal(3, 5), 3);
        assert_eq!(clamp_reversal(10, 5), 5);
        // Reversing a +5 award when nothing remains removes nothing.
        assert_eq!(clamp_reversal(0, 5), 0);
        // Reversing a negative (clamped) entry adds it back unchanged.
        assert_eq!(clamp_reversal(0, -3), -3);
    }

    // -- ReputationCause ---------------------------------------------------

    #[test]
    fn cause_round_trip() {
        for cause in [
            ReputationCause::AnnotationUpvote,
            ReputationCause::AnnotationDownvote,
            ReputationCause::EditApproval,
        ] {
            assert_eq!(ReputationCause::from_str(cause.as_str()).unwrap(), cause);
        }
    }

    #[test]
    fn cause_invalid_rejected() {
        assert!(ReputationCause::from_str("bribery").is_err());
    }

    #[test]
    fn only_downvote_is_deduction() {
        assert!(ReputationCause::AnnotationDownvote.is_deduction());
        assert!(!ReputationCause::AnnotationUpvote.is_deduction());
        assert!(!ReputationCause::EditApproval.is_deduction());
    }
}
