//! Repository for the `reputation_changes` ledger table.
//!
//! Entries are append-only; reversal deletes the row after the engine has
//! re-applied the inverse delta. Both always happen inside the same
//! transaction as the `users.reputation` adjustment.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::reputation_change::ReputationChange;

/// Column list for reputation_changes queries.
const COLUMNS: &str = "id, user_id, delta, cause, created_at";

/// Provides append, delete, and read operations for the reputation ledger.
pub struct ReputationRepo;

impl ReputationRepo {
    /// Append a ledger entry with an already-clamped delta.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: DbId,
        delta: i64,
        cause: &str,
    ) -> Result<ReputationChange, sqlx::Error> {
        let query = format!(
            "INSERT INTO reputation_changes (user_id, delta, cause)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReputationChange>(&query)
            .bind(user_id)
            .bind(delta)
            .bind(cause)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a ledger entry as part of a reversal.
    pub async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM reputation_changes WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Find a ledger entry by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReputationChange>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reputation_changes WHERE id = $1");
        sqlx::query_as::<_, ReputationChange>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a ledger entry for reversal within the caller's transaction.
    pub async fn lock_by_id_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<ReputationChange>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reputation_changes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ReputationChange>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List a user's ledger, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ReputationChange>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reputation_changes
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ReputationChange>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Sum of a user's ledger deltas. Equals `users.reputation` unless the
    /// ledger invariant has been violated.
    pub async fn ledger_total(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM reputation_changes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
