//! Repositories for the `user_flags` and `annotation_flags` tables.
//!
//! Flags are append-only; resolution stamps the resolver and timestamp, and
//! unresolve clears both, returning the flag to the active queue.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::flag::{AnnotationFlag, UserFlag};

/// Column list for user_flags queries.
const USER_FLAG_COLUMNS: &str =
    "id, user_id, flag, thrower_id, time_thrown, resolver_id, time_resolved";

/// Column list for annotation_flags queries.
const ANNOTATION_FLAG_COLUMNS: &str =
    "id, annotation_id, flag, thrower_id, time_thrown, resolver_id, time_resolved";

/// Provides flag operations for user accounts.
pub struct UserFlagRepo;

impl UserFlagRepo {
    /// Throw a flag on a user.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        flag: &str,
        thrower_id: DbId,
    ) -> Result<UserFlag, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_flags (user_id, flag, thrower_id)
             VALUES ($1, $2, $3)
             RETURNING {USER_FLAG_COLUMNS}"
        );
        sqlx::query_as::<_, UserFlag>(&query)
            .bind(user_id)
            .bind(flag)
            .bind(thrower_id)
            .fetch_one(pool)
            .await
    }

    /// Find a flag by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserFlag>, sqlx::Error> {
        let query = format!("SELECT {USER_FLAG_COLUMNS} FROM user_flags WHERE id = $1");
        sqlx::query_as::<_, UserFlag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Stamp the flag resolved. Idempotent for an already-resolved flag:
    /// the resolver and timestamp are left as first set.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        resolver_id: DbId,
    ) -> Result<Option<UserFlag>, sqlx::Error> {
        let query = format!(
            "UPDATE user_flags
             SET resolver_id = $2, time_resolved = NOW()
             WHERE id = $1 AND resolver_id IS NULL
             RETURNING {USER_FLAG_COLUMNS}"
        );
        sqlx::query_as::<_, UserFlag>(&query)
            .bind(id)
            .bind(resolver_id)
            .fetch_optional(pool)
            .await
    }

    /// Return a resolved flag to the active queue.
    pub async fn unresolve(pool: &PgPool, id: DbId) -> Result<Option<UserFlag>, sqlx::Error> {
        let query = format!(
            "UPDATE user_flags
             SET resolver_id = NULL, time_resolved = NULL
             WHERE id = $1
             RETURNING {USER_FLAG_COLUMNS}"
        );
        sqlx::query_as::<_, UserFlag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve every active flag on a user in one statement.
    pub async fn resolve_all_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: DbId,
        resolver_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_flags
             SET resolver_id = $2, time_resolved = NOW()
             WHERE user_id = $1 AND resolver_id IS NULL",
        )
        .bind(user_id)
        .bind(resolver_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Active flags on a user, oldest first.
    pub async fn list_active(pool: &PgPool, user_id: DbId) -> Result<Vec<UserFlag>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_FLAG_COLUMNS} FROM user_flags
             WHERE user_id = $1 AND resolver_id IS NULL
             ORDER BY time_thrown ASC, id ASC"
        );
        sqlx::query_as::<_, UserFlag>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Full flag history for a user, newest first.
    pub async fn list_history(pool: &PgPool, user_id: DbId) -> Result<Vec<UserFlag>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_FLAG_COLUMNS} FROM user_flags
             WHERE user_id = $1
             ORDER BY time_thrown DESC, id DESC"
        );
        sqlx::query_as::<_, UserFlag>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}

/// Provides flag operations for annotations.
pub struct AnnotationFlagRepo;

impl AnnotationFlagRepo {
    /// Throw a flag on an annotation.
    pub async fn insert(
        pool: &PgPool,
        annotation_id: DbId,
        flag: &str,
        thrower_id: DbId,
    ) -> Result<AnnotationFlag, sqlx::Error> {
        let query = format!(
            "INSERT INTO annotation_flags (annotation_id, flag, thrower_id)
             VALUES ($1, $2, $3)
             RETURNING {ANNOTATION_FLAG_COLUMNS}"
        );
        sqlx::query_as::<_, AnnotationFlag>(&query)
            .bind(annotation_id)
            .bind(flag)
            .bind(thrower_id)
            .fetch_one(pool)
            .await
    }

    /// Find a flag by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AnnotationFlag>, sqlx::Error> {
        let query = format!("SELECT {ANNOTATION_FLAG_COLUMNS} FROM annotation_flags WHERE id = $1");
        sqlx::query_as::<_, AnnotationFlag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Stamp the flag resolved. Returns `None` when the flag does not exist
    /// or was already resolved.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        resolver_id: DbId,
    ) -> Result<Option<AnnotationFlag>, sqlx::Error> {
        let query = format!(
            "UPDATE annotation_flags
             SET resolver_id = $2, time_resolved = NOW()
             WHERE id = $1 AND resolver_id IS NULL
             RETURNING {ANNOTATION_FLAG_COLUMNS}"
        );
        sqlx::query_as::<_, AnnotationFlag>(&query)
            .bind(id)
            .bind(resolver_id)
            .fetch_optional(pool)
            .await
    }

    /// Return a resolved flag to the active queue.
    pub async fn unresolve(pool: &PgPool, id: DbId) -> Result<Option<AnnotationFlag>, sqlx::Error> {
        let query = format!(
            "UPDATE annotation_flags
             SET resolver_id = NULL, time_resolved = NULL
             WHERE id = $1
             RETURNING {ANNOTATION_FLAG_COLUMNS}"
        );
        sqlx::query_as::<_, AnnotationFlag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve every active flag on an annotation in one statement.
    pub async fn resolve_all_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
        resolver_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE annotation_flags
             SET resolver_id = $2, time_resolved = NOW()
             WHERE annotation_id = $1 AND resolver_id IS NULL",
        )
        .bind(annotation_id)
        .bind(resolver_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Active flags on an annotation, oldest first.
    pub async fn list_active(
        pool: &PgPool,
        annotation_id: DbId,
    ) -> Result<Vec<AnnotationFlag>, sqlx::Error> {
        let query = format!(
            "SELECT {ANNOTATION_FLAG_COLUMNS} FROM annotation_flags
             WHERE annotation_id = $1 AND resolver_id IS NULL
             ORDER BY time_thrown ASC, id ASC"
        );
        sqlx::query_as::<_, AnnotationFlag>(&query)
            .bind(annotation_id)
            .fetch_all(pool)
            .await
    }

    /// Full flag history for an annotation, newest first.
    pub async fn list_history(
        pool: &PgPool,
        annotation_id: DbId,
    ) -> Result<Vec<AnnotationFlag>, sqlx::Error> {
        let query = format!(
            "SELECT {ANNOTATION_FLAG_COLUMNS} FROM annotation_flags
             WHERE annotation_id = $1
             ORDER BY time_thrown DESC, id DESC"
        );
        sqlx::query_as::<_, AnnotationFlag>(&query)
            .bind(annotation_id)
            .fetch_all(pool)
            .await
    }
}
