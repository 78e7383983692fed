//! Reputation ledger entry model.
//!
//! Entries are immutable once written; reversal deletes the entry and
//! re-applies the inverse delta through the ledger.

use marginalia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reputation_changes` table.
///
/// `delta` is the effective (possibly clamped) delta that was applied, not
/// the nominal delta of the cause.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReputationChange {
    pub id: DbId,
    pub user_id: DbId,
    pub delta: i64,
    pub cause: String,
    pub created_at: Timestamp,
}
