//! Tag entity model.

use marginalia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tags` table.
///
/// `locked` tags may only be applied by users authorized for
/// `use_locked_tags`. Every tag owns a wiki describing it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub locked: bool,
    pub wiki_id: DbId,
    pub created_at: Timestamp,
}
