//! Vote models for annotations, edits, and wiki edits.
//!
//! At most one active vote exists per (voter, target) pair; the unique
//! constraints in the schema back that invariant under concurrency.

use marginalia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A reputation-weighted vote on an annotation.
///
/// Always linked 1:1 to the reputation change it caused for the
/// annotation's author; rollback deletes both.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnnotationVote {
    pub id: DbId,
    pub annotation_id: DbId,
    pub voter_id: DbId,
    pub delta: i64,
    pub reputation_change_id: DbId,
    pub created_at: Timestamp,
}

/// A ±1 review vote on a proposed annotation edit.
///
/// `reputation_change_id` is set only on the vote that crossed the approval
/// threshold, linking it to the editor's reputation award.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditVote {
    pub id: DbId,
    pub edit_id: DbId,
    pub voter_id: DbId,
    pub delta: i64,
    pub reputation_change_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A ±1 review vote on a proposed wiki edit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WikiEditVote {
    pub id: DbId,
    pub wiki_edit_id: DbId,
    pub voter_id: DbId,
    pub delta: i64,
    pub created_at: Timestamp,
}

impl AnnotationVote {
    /// Whether this vote was an upvote.
    pub fn is_up(&self) -> bool {
        self.delta > 0
    }
}

impl EditVote {
    /// Whether this vote was an upvote.
    pub fn is_up(&self) -> bool {
        self.delta > 0
    }
}

impl WikiEditVote {
    /// Whether this vote was an upvote.
    pub fn is_up(&self) -> bool {
        self.delta > 0
    }
}
