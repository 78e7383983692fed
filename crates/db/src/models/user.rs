//! User entity model and DTOs.

use marginalia_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// `reputation` is mutated only through reputation ledger entries; the sum
/// of the user's `reputation_changes.delta` values equals this column at all
/// times.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub displayname: String,
    pub email: String,
    pub reputation: i64,
    pub locked: bool,
    pub last_seen: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub displayname: String,
    pub email: String,
}

/// A row from the `rights` table.
///
/// A right is granted either explicitly via `user_rights` or implicitly when
/// `min_rep` is set and the user's reputation meets it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Right {
    pub id: DbId,
    pub name: String,
    pub min_rep: Option<i64>,
}
