//! Edit (revision) entity model and DTOs.

use marginalia_core::anchor::Anchor;
use marginalia_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `edits` table.
///
/// Immutable once created except for the `current`/`approved`/`rejected`/
/// `weight` review state. `num` is dense and monotonic per annotation,
/// starting at 0 for the initial version. An edit that is neither approved
/// nor rejected is pending and blocks further proposals on its annotation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Edit {
    pub id: DbId,
    pub annotation_id: DbId,
    pub editor_id: DbId,
    pub num: i32,
    pub current: bool,
    pub approved: bool,
    pub rejected: bool,
    pub weight: i64,
    pub first_line_num: i32,
    pub last_line_num: i32,
    pub first_char_idx: i32,
    pub last_char_idx: i32,
    pub body: String,
    pub reason: String,
    pub content_hash: String,
    pub created_at: Timestamp,
}

impl Edit {
    /// The normalized anchor of this revision.
    pub fn anchor(&self) -> Anchor {
        Anchor::new(
            self.first_line_num,
            self.last_line_num,
            self.first_char_idx,
            self.last_char_idx,
        )
    }

    /// Whether the edit is pending review (neither approved nor rejected).
    pub fn is_pending(&self) -> bool {
        !self.approved && !self.rejected
    }
}

/// DTO for proposing a new revision of an annotation.
#[derive(Debug, Clone, Deserialize)]
pub struct EditDraft {
    pub anchor: Anchor,
    pub body: String,
    pub tags: Vec<String>,
    pub reason: String,
}
