//! Edit chain management for wiki descriptions.
//!
//! Wikis follow the annotation chain rules without anchors, tags, or
//! reputation awards. Every describable entity owns one wiki, created with
//! a synthetic approved first revision so the current pointer is never
//! null.

use marginalia_core::error::CoreError;
use marginalia_core::hashing::wiki_content_hash;
use marginalia_core::rights::RIGHT_IMMEDIATE_WIKI_EDITS;
use marginalia_core::types::DbId;
use marginalia_core::wiki::{DEFAULT_WIKI_BODY, INITIAL_VERSION_REASON, WikiSubject};
use marginalia_db::models::tag::Tag;
use marginalia_db::models::wiki::{Wiki, WikiEdit};
use marginalia_db::repositories::wiki_repo::NewWikiEdit;
use marginalia_db::repositories::{TagRepo, WikiEditRepo, WikiRepo};
use marginalia_events::DomainEvent;

use crate::{Engine, EngineResult};

impl Engine {
    /// Create a wiki together with its approved, current initial revision.
    /// A missing body falls back to the standard blank-wiki text.
    pub async fn create_wiki(
        &self,
        creator_id: DbId,
        subject: WikiSubject,
        subject_label: &str,
        body: Option<&str>,
    ) -> EngineResult<(Wiki, WikiEdit)> {
        self.fetch_active_user(creator_id).await?;
        let body = body.unwrap_or(DEFAULT_WIKI_BODY);
        let hash = wiki_content_hash(body);

        let mut tx = self.pool.begin().await?;
        let wiki = WikiRepo::insert_inner(&mut tx, subject.as_str(), subject_label).await?;
        let edit = WikiEditRepo::insert_inner(
            &mut tx,
            &NewWikiEdit {
                wiki_id: wiki.id,
                editor_id: creator_id,
                num: 0,
                current: true,
                approved: true,
                body,
                reason: INITIAL_VERSION_REASON,
                content_hash: &hash,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(wiki_id = wiki.id, subject = subject.as_str(), "wiki created");
        Ok((wiki, edit))
    }

    /// Create a tag together with the wiki describing it.
    pub async fn create_tag(
        &self,
        creator_id: DbId,
        name: &str,
        description: Option<&str>,
    ) -> EngineResult<Tag> {
        self.fetch_active_user(creator_id).await?;
        if TagRepo::find_by_name(&self.pool, name).await?.is_some() {
            return Err(CoreError::Conflict(format!("tag '{name}' already exists")).into());
        }
        let body = description.unwrap_or(DEFAULT_WIKI_BODY);
        let hash = wiki_content_hash(body);

        let mut tx = self.pool.begin().await?;
        let wiki = WikiRepo::insert_inner(&mut tx, WikiSubject::Tag.as_str(), name).await?;
        WikiEditRepo::insert_inner(
            &mut tx,
            &NewWikiEdit {
                wiki_id: wiki.id,
                editor_id: creator_id,
                num: 0,
                current: true,
                approved: true,
                body,
                reason: INITIAL_VERSION_REASON,
                content_hash: &hash,
            },
        )
        .await?;
        let tag = TagRepo::insert_inner(&mut tx, name, false, wiki.id).await?;
        tx.commit().await?;

        tracing::info!(tag_id = tag.id, name, "tag created");
        Ok(tag)
    }

    /// Propose a new revision of a wiki description.
    ///
    /// Same discipline as annotation proposals: one pending revision per
    /// wiki, no-op resubmissions rejected against the head's content hash.
    /// Editors holding `immediate_wiki_edits` skip review.
    pub async fn propose_wiki_edit(
        &self,
        editor_id: DbId,
        wiki_id: DbId,
        body: &str,
        reason: &str,
    ) -> EngineResult<WikiEdit> {
        self.fetch_active_user(editor_id).await?;
        let immediate = self
            .is_authorized(editor_id, RIGHT_IMMEDIATE_WIKI_EDITS)
            .await?;
        let hash = wiki_content_hash(body);

        let mut tx = self.pool.begin().await?;
        let wiki = WikiRepo::lock_by_id_inner(&mut tx, wiki_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "wiki",
                id: wiki_id,
            })?;
        if WikiEditRepo::find_pending_inner(&mut tx, wiki.id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict("wiki already has a pending edit".to_string()).into());
        }
        let head = WikiEditRepo::find_head_inner(&mut tx, wiki.id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("wiki {wiki_id} has no current edit"))
            })?;
        if hash == head.content_hash {
            return Err(CoreError::Conflict(
                "proposed edit is identical to the current version".to_string(),
            )
            .into());
        }

        let mut edit = WikiEditRepo::insert_inner(
            &mut tx,
            &NewWikiEdit {
                wiki_id: wiki.id,
                editor_id,
                num: head.num + 1,
                current: false,
                approved: false,
                body,
                reason,
                content_hash: &hash,
            },
        )
        .await?;
        if immediate {
            edit = WikiEditRepo::promote_inner(&mut tx, wiki.id, edit.id).await?;
        }
        tx.commit().await?;

        let event_type = if immediate {
            "wiki_edit.promoted"
        } else {
            "wiki_edit.proposed"
        };
        tracing::info!(wiki_edit_id = edit.id, wiki_id, immediate, "wiki edit submitted");
        self.bus.publish(
            DomainEvent::new(event_type)
                .with_source("wiki", wiki_id)
                .with_actor(editor_id)
                .with_payload(serde_json::json!({ "wiki_edit_id": edit.id })),
        );
        Ok(edit)
    }
}
