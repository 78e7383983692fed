//! Repository for the `annotation_followers` table.

use marginalia_core::types::DbId;
use sqlx::PgPool;

/// Provides follow/unfollow operations for annotation notifications.
pub struct FollowerRepo;

impl FollowerRepo {
    /// Follow an annotation. Idempotent.
    pub async fn follow(
        pool: &PgPool,
        annotation_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO annotation_followers (annotation_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_annotation_followers DO NOTHING",
        )
        .bind(annotation_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Unfollow an annotation. A no-op when not following.
    pub async fn unfollow(
        pool: &PgPool,
        annotation_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM annotation_followers WHERE annotation_id = $1 AND user_id = $2")
            .bind(annotation_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Whether the user follows the annotation.
    pub async fn is_following(
        pool: &PgPool,
        annotation_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM annotation_followers
                 WHERE annotation_id = $1 AND user_id = $2
             )",
        )
        .bind(annotation_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// User IDs following the annotation, for event fan-out.
    pub async fn follower_ids(
        pool: &PgPool,
        annotation_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT user_id FROM annotation_followers WHERE annotation_id = $1 ORDER BY user_id",
        )
        .bind(annotation_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
