//! Repositories for the three vote tables.
//!
//! All mutations are `_inner` methods because a vote never changes alone:
//! the engine adjusts weights, reputation, and possibly the chain head in
//! the same transaction.

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::vote::{AnnotationVote, EditVote, WikiEditVote};

/// Column list for annotation_votes queries.
const ANNOTATION_VOTE_COLUMNS: &str =
    "id, annotation_id, voter_id, delta, reputation_change_id, created_at";

/// Column list for edit_votes queries.
const EDIT_VOTE_COLUMNS: &str = "id, edit_id, voter_id, delta, reputation_change_id, created_at";

/// Column list for wiki_edit_votes queries.
const WIKI_EDIT_VOTE_COLUMNS: &str = "id, wiki_edit_id, voter_id, delta, created_at";

/// Provides vote storage for annotations.
pub struct AnnotationVoteRepo;

impl AnnotationVoteRepo {
    /// Record a reputation-weighted vote linked to its ledger entry.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
        voter_id: DbId,
        delta: i64,
        reputation_change_id: DbId,
    ) -> Result<AnnotationVote, sqlx::Error> {
        let query = format!(
            "INSERT INTO annotation_votes (annotation_id, voter_id, delta, reputation_change_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {ANNOTATION_VOTE_COLUMNS}"
        );
        sqlx::query_as::<_, AnnotationVote>(&query)
            .bind(annotation_id)
            .bind(voter_id)
            .bind(delta)
            .bind(reputation_change_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// The voter's existing vote on the annotation, if any.
    pub async fn find_by_target_and_voter(
        pool: &PgPool,
        annotation_id: DbId,
        voter_id: DbId,
    ) -> Result<Option<AnnotationVote>, sqlx::Error> {
        let query = format!(
            "SELECT {ANNOTATION_VOTE_COLUMNS} FROM annotation_votes
             WHERE annotation_id = $1 AND voter_id = $2"
        );
        sqlx::query_as::<_, AnnotationVote>(&query)
            .bind(annotation_id)
            .bind(voter_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant, locked for the rollback that follows.
    pub async fn find_by_target_and_voter_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        annotation_id: DbId,
        voter_id: DbId,
    ) -> Result<Option<AnnotationVote>, sqlx::Error> {
        let query = format!(
            "SELECT {ANNOTATION_VOTE_COLUMNS} FROM annotation_votes
             WHERE annotation_id = $1 AND voter_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, AnnotationVote>(&query)
            .bind(annotation_id)
            .bind(voter_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Remove a vote during rollback. The linked ledger entry is deleted
    /// separately after its delta has been reversed.
    pub async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM annotation_votes WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Provides vote storage for annotation edits.
pub struct EditVoteRepo;

impl EditVoteRepo {
    /// Record a ±1 review vote.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
        voter_id: DbId,
        delta: i64,
    ) -> Result<EditVote, sqlx::Error> {
        let query = format!(
            "INSERT INTO edit_votes (edit_id, voter_id, delta)
             VALUES ($1, $2, $3)
             RETURNING {EDIT_VOTE_COLUMNS}"
        );
        sqlx::query_as::<_, EditVote>(&query)
            .bind(edit_id)
            .bind(voter_id)
            .bind(delta)
            .fetch_one(&mut **tx)
            .await
    }

    /// The voter's existing vote on the edit, if any.
    pub async fn find_by_target_and_voter(
        pool: &PgPool,
        edit_id: DbId,
        voter_id: DbId,
    ) -> Result<Option<EditVote>, sqlx::Error> {
        let query = format!(
            "SELECT {EDIT_VOTE_COLUMNS} FROM edit_votes WHERE edit_id = $1 AND voter_id = $2"
        );
        sqlx::query_as::<_, EditVote>(&query)
            .bind(edit_id)
            .bind(voter_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant, locked for toggle handling.
    pub async fn find_by_target_and_voter_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
        voter_id: DbId,
    ) -> Result<Option<EditVote>, sqlx::Error> {
        let query = format!(
            "SELECT {EDIT_VOTE_COLUMNS} FROM edit_votes
             WHERE edit_id = $1 AND voter_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, EditVote>(&query)
            .bind(edit_id)
            .bind(voter_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// All votes on an edit, locked for the reversal pass of an
    /// administrative delete.
    pub async fn list_by_edit_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        edit_id: DbId,
    ) -> Result<Vec<EditVote>, sqlx::Error> {
        let query = format!(
            "SELECT {EDIT_VOTE_COLUMNS} FROM edit_votes WHERE edit_id = $1 ORDER BY id FOR UPDATE"
        );
        sqlx::query_as::<_, EditVote>(&query)
            .bind(edit_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Link the threshold-crossing vote to the editor's reputation award.
    pub async fn set_reputation_change_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        reputation_change_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE edit_votes SET reputation_change_id = $2 WHERE id = $1")
            .bind(id)
            .bind(reputation_change_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Remove a vote during a toggle cancel or flip.
    pub async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM edit_votes WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Provides vote storage for wiki edits.
pub struct WikiEditVoteRepo;

impl WikiEditVoteRepo {
    /// Record a ±1 review vote.
    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        wiki_edit_id: DbId,
        voter_id: DbId,
        delta: i64,
    ) -> Result<WikiEditVote, sqlx::Error> {
        let query = format!(
            "INSERT INTO wiki_edit_votes (wiki_edit_id, voter_id, delta)
             VALUES ($1, $2, $3)
             RETURNING {WIKI_EDIT_VOTE_COLUMNS}"
        );
        sqlx::query_as::<_, WikiEditVote>(&query)
            .bind(wiki_edit_id)
            .bind(voter_id)
            .bind(delta)
            .fetch_one(&mut **tx)
            .await
    }

    /// The voter's existing vote on the wiki edit, if any.
    pub async fn find_by_target_and_voter(
        pool: &PgPool,
        wiki_edit_id: DbId,
        voter_id: DbId,
    ) -> Result<Option<WikiEditVote>, sqlx::Error> {
        let query = format!(
            "SELECT {WIKI_EDIT_VOTE_COLUMNS} FROM wiki_edit_votes
             WHERE wiki_edit_id = $1 AND voter_id = $2"
        );
        sqlx::query_as::<_, WikiEditVote>(&query)
            .bind(wiki_edit_id)
            .bind(voter_id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant, locked for toggle handling.
    pub async fn find_by_target_and_voter_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        wiki_edit_id: DbId,
        voter_id: DbId,
    ) -> Result<Option<WikiEditVote>, sqlx::Error> {
        let query = format!(
            "SELECT {WIKI_EDIT_VOTE_COLUMNS} FROM wiki_edit_votes
             WHERE wiki_edit_id = $1 AND voter_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, WikiEditVote>(&query)
            .bind(wiki_edit_id)
            .bind(voter_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Remove a vote during a toggle cancel or flip.
    pub async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM wiki_edit_votes WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
