//! Repository for the `users` table.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, displayname, email, reputation, locked, last_seen, created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (displayname, email)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.displayname)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Lock or unlock a user account.
    pub async fn set_locked(pool: &PgPool, id: DbId, locked: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET locked = $2 WHERE id = $1")
            .bind(id)
            .bind(locked)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the last-seen timestamp.
    pub async fn touch_last_seen(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_seen = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Anonymize a user instead of deleting them: scrub the displayname and
    /// email and lock the account. Authored edits, votes, and ledger entries
    /// keep referencing the row.
    pub async fn anonymize(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET displayname = 'Anonymous',
                 email = 'anonymized-' || id || '@invalid.local',
                 locked = TRUE
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the user's row for the duration of the transaction and return
    /// the current reputation. This is the serialization point for the
    /// floor-at-zero clamp: the read and the adjusted write must happen in
    /// the same transaction.
    pub async fn lock_reputation_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT reputation FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.map(|(rep,)| rep))
    }

    /// Apply an already-clamped delta to the user's reputation.
    pub async fn adjust_reputation_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        delta: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET reputation = reputation + $2 WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
