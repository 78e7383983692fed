//! Repository for the `rights` and `user_rights` tables.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::Right;

/// Provides lookups and grants for named capabilities.
pub struct RightRepo;

impl RightRepo {
    /// Find a right by name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Right>, sqlx::Error> {
        sqlx::query_as::<_, Right>("SELECT id, name, min_rep FROM rights WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Grant a right to a user explicitly. Idempotent.
    pub async fn grant(pool: &PgPool, user_id: DbId, right_name: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_rights (user_id, right_id)
             SELECT $1, id FROM rights WHERE name = $2
             ON CONFLICT ON CONSTRAINT uq_user_rights DO NOTHING",
        )
        .bind(user_id)
        .bind(right_name)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Revoke an explicit grant. A reputation-derived grant is unaffected.
    pub async fn revoke(pool: &PgPool, user_id: DbId, right_name: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "DELETE FROM user_rights
             WHERE user_id = $1
               AND right_id = (SELECT id FROM rights WHERE name = $2)",
        )
        .bind(user_id)
        .bind(right_name)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The capability oracle: true when the user holds the right explicitly
    /// or meets its `min_rep` reputation threshold. Unknown rights are never
    /// authorized.
    pub async fn is_authorized(
        pool: &PgPool,
        user_id: DbId,
        right_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(bool,)> = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM user_rights ur
                 JOIN rights r ON r.id = ur.right_id
                 WHERE ur.user_id = $1 AND r.name = $2
             ) OR EXISTS (
                 SELECT 1 FROM rights r
                 JOIN users u ON u.id = $1
                 WHERE r.name = $2
                   AND r.min_rep IS NOT NULL
                   AND u.reputation >= r.min_rep
             )",
        )
        .bind(user_id)
        .bind(right_name)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(authorized,)| authorized).unwrap_or(false))
    }
}
