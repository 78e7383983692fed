//! Wiki and wiki edit models.
//!
//! Wikis follow the same chain pattern as annotations but describe non-text
//! entities (writers, texts, editions, tags) and carry no anchor or tags.

use marginalia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `wikis` table.
///
/// Created together with a synthetic, approved "Initial version." edit so
/// the current revision is never null.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wiki {
    pub id: DbId,
    pub subject: String,
    pub subject_label: String,
    pub created_at: Timestamp,
}

/// A row from the `wiki_edits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WikiEdit {
    pub id: DbId,
    pub wiki_id: DbId,
    pub editor_id: DbId,
    pub num: i32,
    pub current: bool,
    pub approved: bool,
    pub rejected: bool,
    pub weight: i64,
    pub body: String,
    pub reason: String,
    pub content_hash: String,
    pub created_at: Timestamp,
}

impl WikiEdit {
    /// Whether the edit is pending review (neither approved nor rejected).
    pub fn is_pending(&self) -> bool {
        !self.approved && !self.rejected
    }
}
