//! Moderation flag models.

use marginalia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_flags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserFlag {
    pub id: DbId,
    pub user_id: DbId,
    pub flag: String,
    pub thrower_id: DbId,
    pub time_thrown: Timestamp,
    pub resolver_id: Option<DbId>,
    pub time_resolved: Option<Timestamp>,
}

/// A row from the `annotation_flags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnnotationFlag {
    pub id: DbId,
    pub annotation_id: DbId,
    pub flag: String,
    pub thrower_id: DbId,
    pub time_thrown: Timestamp,
    pub resolver_id: Option<DbId>,
    pub time_resolved: Option<Timestamp>,
}

impl UserFlag {
    /// Whether the flag is still in the active (unresolved) set.
    pub fn is_active(&self) -> bool {
        self.resolver_id.is_none()
    }
}

impl AnnotationFlag {
    /// Whether the flag is still in the active (unresolved) set.
    pub fn is_active(&self) -> bool {
        self.resolver_id.is_none()
    }
}
