//! Annotation entity model and DTOs.

use marginalia_core::anchor::Anchor;
use marginalia_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `annotations` table.
///
/// An annotation is a pointer to the current revision of its edit chain;
/// exactly one edit has `current = true` once one is approved. `weight`
/// accumulates reputation-weighted annotation votes; `active = false` is a
/// soft delete.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Annotation {
    pub id: DbId,
    pub annotator_id: DbId,
    pub edition_id: DbId,
    pub weight: i64,
    pub locked: bool,
    pub active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new annotation together with its initial revision.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationDraft {
    pub edition_id: DbId,
    pub anchor: Anchor,
    pub body: String,
    pub tags: Vec<String>,
}
