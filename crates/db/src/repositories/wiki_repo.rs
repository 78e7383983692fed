//! Repositories for the `wikis` and `wiki_edits` tables.
//!
//! Wiki edits mirror the annotation revision chain without the anchor and
//! tag columns, so the operations here parallel `EditRepo`.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::wiki::{Wiki, WikiEdit};

/// Column list for wikis queries.
const WIKI_COLUMNS: &str = "id, subject, subject_label, created_at";

/// Column list for wiki_edits queries.
const EDIT_COLUMNS: &str = "id, wiki_id, editor_id, num, current, approved, rejected, weight, \
                            body, reason, content_hash, created_at";

/// Parameters for inserting a wiki revision row.
pub struct NewWikiEdit<'a> {
    pub wiki_id: DbId,
    pub editor_id: DbId,
    pub num: i32,
    pub current: bool,
    pub approved: bool,
    pub body: &'a str,
    pub reason: &'a str,
    pub content_hash: &'a str,
}

/// Provides CRUD and locking operations for wikis.
pub struct WikiRepo;

impl WikiRepo {
    /// Insert the wiki row. The engine inserts the initial revision in the
    /// same transaction; a wiki never exists without one.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        subject: &str,
        subject_label: &str,
    ) -> Result<Wiki, sqlx::Error> {
        let query = format!(
            "INSERT INTO wikis (subject, subject_label)
             VALUES ($1, $2)
             RETURNING {WIKI_COLUMNS}"
        );
        sqlx::query_as::<_, Wiki>(&query)
            .bind(subject)
            .bind(subject_label)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a wiki by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Wiki>, sqlx::Error> {
        let query = format!("SELECT {WIKI_COLUMNS} FROM wikis WHERE id = $1");
        sqlx::query_as::<_, Wiki>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the wiki row for the duration of the transaction. Serializes
    /// head promotion the way the annotation row lock does for edits.
    pub async fn lock_by_id_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Wiki>, sqlx::Error> {
        let query = format!("SELECT {WIKI_COLUMNS} FROM wikis WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Wiki>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

/// Provides chain operations for wiki revisions.
pub struct WikiEditRepo;

impl WikiEditRepo {
    /// Insert a revision row within the caller's transaction.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        new: &NewWikiEdit<'_>,
    ) -> Result<WikiEdit, sqlx::Error> {
        let query = format!(
            "INSERT INTO wiki_edits (wiki_id, editor_id, num, current, approved,
                                     body, reason, content_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {EDIT_COLUMNS}"
        );
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(new.wiki_id)
            .bind(new.editor_id)
            .bind(new.num)
            .bind(new.current)
            .bind(new.approved)
            .bind(new.body)
            .bind(new.reason)
            .bind(new.content_hash)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a wiki edit by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WikiEdit>, sqlx::Error> {
        let query = format!("SELECT {EDIT_COLUMNS} FROM wiki_edits WHERE id = $1");
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a wiki edit row for the duration of the transaction.
    pub async fn lock_by_id_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<WikiEdit>, sqlx::Error> {
        let query = format!("SELECT {EDIT_COLUMNS} FROM wiki_edits WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// The current head of a wiki's chain.
    pub async fn find_head(pool: &PgPool, wiki_id: DbId) -> Result<Option<WikiEdit>, sqlx::Error> {
        let query = format!("SELECT {EDIT_COLUMNS} FROM wiki_edits WHERE wiki_id = $1 AND current");
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(wiki_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped head lookup.
    pub async fn find_head_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        wiki_id: DbId,
    ) -> Result<Option<WikiEdit>, sqlx::Error> {
        let query = format!("SELECT {EDIT_COLUMNS} FROM wiki_edits WHERE wiki_id = $1 AND current");
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(wiki_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// The pending (neither approved nor rejected) edit, if any.
    pub async fn find_pending(
        pool: &PgPool,
        wiki_id: DbId,
    ) -> Result<Option<WikiEdit>, sqlx::Error> {
        let query = format!(
            "SELECT {EDIT_COLUMNS} FROM wiki_edits
             WHERE wiki_id = $1 AND NOT approved AND NOT rejected"
        );
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(wiki_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped pending lookup.
    pub async fn find_pending_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        wiki_id: DbId,
    ) -> Result<Option<WikiEdit>, sqlx::Error> {
        let query = format!(
            "SELECT {EDIT_COLUMNS} FROM wiki_edits
             WHERE wiki_id = $1 AND NOT approved AND NOT rejected"
        );
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(wiki_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Full chain history ordered by sequence number, oldest first.
    pub async fn list_by_wiki(pool: &PgPool, wiki_id: DbId) -> Result<Vec<WikiEdit>, sqlx::Error> {
        let query = format!(
            "SELECT {EDIT_COLUMNS} FROM wiki_edits WHERE wiki_id = $1 ORDER BY num ASC, id ASC"
        );
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(wiki_id)
            .fetch_all(pool)
            .await
    }

    /// Promote a wiki edit to current: demote the existing head, then mark
    /// the edit approved and current. Callers must hold the wiki row lock.
    pub async fn promote_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        wiki_id: DbId,
        edit_id: DbId,
    ) -> Result<WikiEdit, sqlx::Error> {
        sqlx::query("UPDATE wiki_edits SET current = FALSE WHERE wiki_id = $1 AND current")
            .bind(wiki_id)
            .execute(&mut **tx)
            .await?;
        let query = format!(
            "UPDATE wiki_edits SET current = TRUE, approved = TRUE
             WHERE id = $1
             RETURNING {EDIT_COLUMNS}"
        );
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(edit_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Mark a wiki edit rejected; terminal, never becomes current.
    pub async fn reject_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
    ) -> Result<WikiEdit, sqlx::Error> {
        let query =
            format!("UPDATE wiki_edits SET rejected = TRUE WHERE id = $1 RETURNING {EDIT_COLUMNS}");
        sqlx::query_as::<_, WikiEdit>(&query)
            .bind(edit_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Accumulate a review-vote delta into the wiki edit's weight.
    pub async fn add_weight_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
        delta: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "UPDATE wiki_edits SET weight = weight + $2 WHERE id = $1 RETURNING weight",
        )
        .bind(edit_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }
}
