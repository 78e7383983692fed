//! Repository for the `tags` and `edit_tags` tables.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::tag::Tag;

/// Column list for tags queries.
const COLUMNS: &str = "id, name, locked, wiki_id, created_at";

/// Provides tag lookups and edit-tag association management.
pub struct TagRepo;

impl TagRepo {
    /// Insert a tag row pointing at its (already created) wiki.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
        locked: bool,
        wiki_id: DbId,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name, locked, wiki_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .bind(locked)
            .bind(wiki_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a tag by name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a list of tag names to rows, within the caller's transaction.
    /// The result preserves no particular order and omits unknown names; the
    /// caller decides whether that is an error.
    pub async fn find_by_names_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        names: &[String],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = ANY($1)");
        sqlx::query_as::<_, Tag>(&query)
            .bind(names)
            .fetch_all(&mut **tx)
            .await
    }

    /// Replace the tag set of an edit.
    pub async fn set_edit_tags_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
        tag_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM edit_tags WHERE edit_id = $1")
            .bind(edit_id)
            .execute(&mut **tx)
            .await?;
        for tag_id in tag_ids {
            sqlx::query("INSERT INTO edit_tags (edit_id, tag_id) VALUES ($1, $2)")
                .bind(edit_id)
                .bind(tag_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Tag names attached to an edit, alphabetical.
    pub async fn names_for_edit(pool: &PgPool, edit_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT t.name FROM tags t
             JOIN edit_tags et ON et.tag_id = t.id
             WHERE et.edit_id = $1
             ORDER BY t.name",
        )
        .bind(edit_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Lock or unlock a tag for ordinary use.
    pub async fn set_locked(pool: &PgPool, id: DbId, locked: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tags SET locked = $2 WHERE id = $1")
            .bind(id)
            .bind(locked)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
