//! Repository for the `annotations` table.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation::Annotation;

/// Column list for annotations queries.
const COLUMNS: &str = "id, annotator_id, edition_id, weight, locked, active, created_at";

/// Provides CRUD and locking operations for annotations.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Insert the annotation row. The engine inserts the initial revision in
    /// the same transaction; an annotation never exists without one.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotator_id: DbId,
        edition_id: DbId,
    ) -> Result<Annotation, sqlx::Error> {
        let query = format!(
            "INSERT INTO annotations (annotator_id, edition_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(annotator_id)
            .bind(edition_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an annotation by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the annotation row for the duration of the transaction.
    ///
    /// This is the per-entity serialization point for head promotion: two
    /// transactions racing to promote different edits of the same
    /// annotation queue here, and the loser re-reads the new head.
    pub async fn lock_by_id_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Accumulate a vote delta into the annotation's display weight.
    pub async fn add_weight_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        delta: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "UPDATE annotations SET weight = weight + $2 WHERE id = $1 RETURNING weight",
        )
        .bind(id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    /// Soft-delete or reactivate an annotation.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE annotations SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lock or unlock an annotation against further editing.
    pub async fn set_locked(pool: &PgPool, id: DbId, locked: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE annotations SET locked = $2 WHERE id = $1")
            .bind(id)
            .bind(locked)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List active annotations on an edition, newest first.
    pub async fn list_by_edition(
        pool: &PgPool,
        edition_id: DbId,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE edition_id = $1 AND active
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(edition_id)
            .fetch_all(pool)
            .await
    }

    /// Hard-delete an annotation; edits, votes, and flags cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
