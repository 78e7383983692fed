//! Repository for the `edits` table.

use marginalia_core::anchor::Anchor;
use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::edit::Edit;

/// Column list for edits queries.
const COLUMNS: &str = "id, annotation_id, editor_id, num, current, approved, rejected, weight, \
                       first_line_num, last_line_num, first_char_idx, last_char_idx, \
                       body, reason, content_hash, created_at";

/// Parameters for inserting a revision row.
pub struct NewEdit<'a> {
    pub annotation_id: DbId,
    pub editor_id: DbId,
    pub num: i32,
    pub current: bool,
    pub approved: bool,
    pub anchor: Anchor,
    pub body: &'a str,
    pub reason: &'a str,
    pub content_hash: &'a str,
}

/// Provides chain operations for annotation revisions.
pub struct EditRepo;

impl EditRepo {
    /// Insert a revision row within the caller's transaction.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        new: &NewEdit<'_>,
    ) -> Result<Edit, sqlx::Error> {
        let query = format!(
            "INSERT INTO edits (annotation_id, editor_id, num, current, approved,
                                first_line_num, last_line_num, first_char_idx, last_char_idx,
                                body, reason, content_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(new.annotation_id)
            .bind(new.editor_id)
            .bind(new.num)
            .bind(new.current)
            .bind(new.approved)
            .bind(new.anchor.first_line)
            .bind(new.anchor.last_line)
            .bind(new.anchor.first_char)
            .bind(new.anchor.last_char)
            .bind(new.body)
            .bind(new.reason)
            .bind(new.content_hash)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an edit by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edits WHERE id = $1");
        sqlx::query_as::<_, Edit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock an edit row for the duration of the transaction. Serializes the
    /// weight read that drives a threshold decision with the write that
    /// follows it.
    pub async fn lock_by_id_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edits WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Edit>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// The current head of an annotation's chain.
    pub async fn find_head(pool: &PgPool, annotation_id: DbId) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edits WHERE annotation_id = $1 AND current");
        sqlx::query_as::<_, Edit>(&query)
            .bind(annotation_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped head lookup.
    pub async fn find_head_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
    ) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edits WHERE annotation_id = $1 AND current");
        sqlx::query_as::<_, Edit>(&query)
            .bind(annotation_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// The pending (neither approved nor rejected) edit, if any.
    pub async fn find_pending(
        pool: &PgPool,
        annotation_id: DbId,
    ) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edits
             WHERE annotation_id = $1 AND NOT approved AND NOT rejected"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(annotation_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped pending lookup.
    pub async fn find_pending_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
    ) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edits
             WHERE annotation_id = $1 AND NOT approved AND NOT rejected"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(annotation_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Full chain history ordered by sequence number, oldest first.
    pub async fn list_by_annotation(
        pool: &PgPool,
        annotation_id: DbId,
    ) -> Result<Vec<Edit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edits WHERE annotation_id = $1 ORDER BY num ASC, id ASC"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(annotation_id)
            .fetch_all(pool)
            .await
    }

    /// Promote an edit to current: demote the existing head, then mark the
    /// edit approved and current. Callers must hold the annotation row lock.
    pub async fn promote_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
        edit_id: DbId,
    ) -> Result<Edit, sqlx::Error> {
        sqlx::query("UPDATE edits SET current = FALSE WHERE annotation_id = $1 AND current")
            .bind(annotation_id)
            .execute(&mut **tx)
            .await?;
        let query = format!(
            "UPDATE edits SET current = TRUE, approved = TRUE
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(edit_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Mark an edit rejected; terminal, never becomes current.
    pub async fn reject_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
    ) -> Result<Edit, sqlx::Error> {
        let query = format!(
            "UPDATE edits SET rejected = TRUE WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(edit_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Accumulate a review-vote delta into the edit's weight.
    pub async fn add_weight_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
        delta: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("UPDATE edits SET weight = weight + $2 WHERE id = $1 RETURNING weight")
                .bind(edit_id)
                .bind(delta)
                .fetch_one(&mut **tx)
                .await?;
        Ok(row.0)
    }

    /// The latest non-rejected predecessor of the given sequence number,
    /// used when the head itself is administratively deleted.
    pub async fn find_previous_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
        num: i32,
    ) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edits
             WHERE annotation_id = $1 AND num < $2 AND NOT rejected
             ORDER BY num DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(annotation_id)
            .bind(num)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Close the numbering gap after an administrative delete: every edit
    /// with a higher sequence number shifts down by one.
    pub async fn renumber_after_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
        deleted_num: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE edits SET num = num - 1 WHERE annotation_id = $1 AND num > $2")
            .bind(annotation_id)
            .bind(deleted_num)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Delete a revision row; its votes and tag links cascade.
    pub async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM edits WHERE id = $1")
            .bind(edit_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
