//! Edit chain management for annotations.
//!
//! An annotation and its initial revision are created atomically; from
//! then on the chain only grows through proposals. At most one revision is
//! pending per annotation, and once a revision is approved exactly one is
//! current. Promotion always runs under the annotation's row lock.

use marginalia_core::anchor::Anchor;
use marginalia_core::error::CoreError;
use marginalia_core::hashing::edit_content_hash;
use marginalia_core::rights::{
    RIGHT_DELETE_EDITS, RIGHT_EDIT_LOCKED_ANNOTATIONS, RIGHT_IMMEDIATE_EDITS,
    RIGHT_USE_LOCKED_TAGS,
};
use marginalia_core::types::DbId;
use marginalia_core::wiki::INITIAL_VERSION_REASON;
use marginalia_db::models::annotation::{Annotation, AnnotationDraft};
use marginalia_db::models::edit::{Edit, EditDraft};
use marginalia_db::models::tag::Tag;
use marginalia_db::models::user::User;
use marginalia_db::repositories::edit_repo::NewEdit;
use marginalia_db::repositories::{
    AnnotationRepo, EditRepo, EditVoteRepo, FollowerRepo, TagRepo, UserRepo,
};
use marginalia_events::DomainEvent;

use crate::{Engine, EngineResult};

impl Engine {
    /// Create an annotation together with its approved, current initial
    /// revision (`num = 0`).
    pub async fn create_annotation(
        &self,
        annotator_id: DbId,
        draft: &AnnotationDraft,
    ) -> EngineResult<(Annotation, Edit)> {
        self.fetch_active_user(annotator_id).await?;
        let tags = self.resolve_tags(annotator_id, &draft.tags).await?;
        let anchor = normalize(&draft.anchor);
        let hash = edit_content_hash(&anchor, &draft.body, &draft.tags);

        let mut tx = self.pool.begin().await?;
        let annotation =
            AnnotationRepo::insert_inner(&mut tx, annotator_id, draft.edition_id).await?;
        let edit = EditRepo::insert_inner(
            &mut tx,
            &NewEdit {
                annotation_id: annotation.id,
                editor_id: annotator_id,
                num: 0,
                current: true,
                approved: true,
                anchor,
                body: &draft.body,
                reason: INITIAL_VERSION_REASON,
                content_hash: &hash,
            },
        )
        .await?;
        let tag_ids: Vec<DbId> = tags.iter().map(|t| t.id).collect();
        TagRepo::set_edit_tags_inner(&mut tx, edit.id, &tag_ids).await?;
        tx.commit().await?;

        tracing::info!(
            annotation_id = annotation.id,
            annotator_id,
            "annotation created"
        );
        self.indexer()
            .index_annotation(annotation.id, &edit.body, &draft.tags)
            .await;
        self.bus.publish(
            DomainEvent::new("annotation.created")
                .with_source("annotation", annotation.id)
                .with_actor(annotator_id),
        );
        Ok((annotation, edit))
    }

    /// Propose a new revision of an annotation.
    ///
    /// The proposal is rejected when another revision is already pending,
    /// when the annotation is inactive or locked (absent the override
    /// right), or when its content hash matches the current head (a no-op
    /// resubmission). The annotator's own proposals, and those of editors
    /// holding `immediate_edits`, skip review and are promoted at once.
    pub async fn propose_edit(
        &self,
        editor_id: DbId,
        annotation_id: DbId,
        draft: &EditDraft,
    ) -> EngineResult<Edit> {
        self.fetch_active_user(editor_id).await?;
        let annotation = AnnotationRepo::find_by_id(&self.pool, annotation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            })?;
        let tags = self.resolve_tags(editor_id, &draft.tags).await?;

        // Capability checks happen before the transaction so the pool is
        // not re-entered while rows are locked.
        let immediate = editor_id == annotation.annotator_id
            || self.is_authorized(editor_id, RIGHT_IMMEDIATE_EDITS).await?;
        let can_edit_locked = self
            .is_authorized(editor_id, RIGHT_EDIT_LOCKED_ANNOTATIONS)
            .await?;

        let anchor = normalize(&draft.anchor);
        let hash = edit_content_hash(&anchor, &draft.body, &draft.tags);

        let mut tx = self.pool.begin().await?;
        let annotation = AnnotationRepo::lock_by_id_inner(&mut tx, annotation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            })?;
        if !annotation.active {
            return Err(CoreError::Conflict("annotation is inactive".to_string()).into());
        }
        if annotation.locked && !can_edit_locked {
            return Err(
                CoreError::Forbidden("annotation is locked for editing".to_string()).into(),
            );
        }
        if EditRepo::find_pending_inner(&mut tx, annotation_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(
                "annotation already has a pending edit".to_string(),
            )
            .into());
        }
        let head = EditRepo::find_head_inner(&mut tx, annotation_id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("annotation {annotation_id} has no current edit"))
            })?;
        if hash == head.content_hash {
            return Err(CoreError::Conflict(
                "proposed edit is identical to the current version".to_string(),
            )
            .into());
        }

        let mut edit = EditRepo::insert_inner(
            &mut tx,
            &NewEdit {
                annotation_id,
                editor_id,
                num: head.num + 1,
                current: false,
                approved: false,
                anchor,
                body: &draft.body,
                reason: &draft.reason,
                content_hash: &hash,
            },
        )
        .await?;
        let tag_ids: Vec<DbId> = tags.iter().map(|t| t.id).collect();
        TagRepo::set_edit_tags_inner(&mut tx, edit.id, &tag_ids).await?;
        if immediate {
            edit = EditRepo::promote_inner(&mut tx, annotation_id, edit.id).await?;
        }
        tx.commit().await?;

        let followers = FollowerRepo::follower_ids(&self.pool, annotation_id).await?;
        if immediate {
            tracing::info!(edit_id = edit.id, annotation_id, "edit auto-approved");
            self.indexer()
                .index_annotation(annotation_id, &edit.body, &draft.tags)
                .await;
            self.bus.publish(
                DomainEvent::new("edit.promoted")
                    .with_source("annotation", annotation_id)
                    .with_actor(editor_id)
                    .with_recipients(followers)
                    .with_payload(serde_json::json!({ "edit_id": edit.id })),
            );
        } else {
            tracing::info!(edit_id = edit.id, annotation_id, "edit proposed for review");
            self.bus.publish(
                DomainEvent::new("edit.proposed")
                    .with_source("annotation", annotation_id)
                    .with_actor(editor_id)
                    .with_recipients(followers)
                    .with_payload(serde_json::json!({ "edit_id": edit.id })),
            );
        }
        Ok(edit)
    }

    /// Administratively remove a revision from a chain.
    ///
    /// Reputation awarded through the revision's votes is reversed first
    /// (honoring the floor clamp). Removing the head promotes its latest
    /// non-rejected predecessor; removing any other revision closes the
    /// numbering gap so the sequence stays dense.
    pub async fn delete_edit(&self, actor_id: DbId, edit_id: DbId) -> EngineResult<()> {
        self.require_right(actor_id, RIGHT_DELETE_EDITS).await?;

        let mut tx = self.pool.begin().await?;
        let edit = EditRepo::lock_by_id_inner(&mut tx, edit_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "edit",
                id: edit_id,
            })?;
        let annotation = AnnotationRepo::lock_by_id_inner(&mut tx, edit.annotation_id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "edit {} references missing annotation {}",
                    edit.id, edit.annotation_id
                ))
            })?;

        for vote in EditVoteRepo::list_by_edit_inner(&mut tx, edit.id).await? {
            if let Some(change_id) = vote.reputation_change_id {
                Self::reverse_reputation_inner(&mut tx, change_id).await?;
            }
        }

        let new_head = if edit.current {
            let previous = EditRepo::find_previous_inner(&mut tx, annotation.id, edit.num)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict(
                        "cannot delete the only revision of an annotation".to_string(),
                    )
                })?;
            Some(EditRepo::promote_inner(&mut tx, annotation.id, previous.id).await?)
        } else {
            None
        };
        EditRepo::delete_inner(&mut tx, edit.id).await?;
        EditRepo::renumber_after_inner(&mut tx, annotation.id, edit.num).await?;
        tx.commit().await?;

        tracing::info!(
            edit_id,
            annotation_id = annotation.id,
            actor_id,
            "edit administratively deleted"
        );
        if let Some(head) = new_head {
            let tags = TagRepo::names_for_edit(&self.pool, head.id).await?;
            self.indexer()
                .index_annotation(annotation.id, &head.body, &tags)
                .await;
        }
        self.bus.publish(
            DomainEvent::new("edit.deleted")
                .with_source("annotation", annotation.id)
                .with_actor(actor_id)
                .with_payload(serde_json::json!({ "edit_id": edit_id })),
        );
        Ok(())
    }

    /// Fetch a user and reject locked accounts.
    pub(crate) async fn fetch_active_user(&self, user_id: DbId) -> EngineResult<User> {
        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "user",
                id: user_id,
            })?;
        if user.locked {
            return Err(CoreError::Forbidden("account is locked".to_string()).into());
        }
        Ok(user)
    }

    /// Resolve draft tag names to rows, rejecting unknown names and locked
    /// tags the actor may not use.
    pub(crate) async fn resolve_tags(
        &self,
        actor_id: DbId,
        names: &[String],
    ) -> EngineResult<Vec<Tag>> {
        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let tag = TagRepo::find_by_name(&self.pool, name)
                .await?
                .ok_or_else(|| CoreError::Validation(format!("unknown tag '{name}'")))?;
            if tag.locked && !self.is_authorized(actor_id, RIGHT_USE_LOCKED_TAGS).await? {
                return Err(CoreError::Forbidden(format!(
                    "tag '{name}' is locked and requires the '{RIGHT_USE_LOCKED_TAGS}' right"
                ))
                .into());
            }
            tags.push(tag);
        }
        Ok(tags)
    }
}

/// Re-normalize an anchor from the wire; drafts are not trusted to have
/// gone through `Anchor::new`.
fn normalize(anchor: &Anchor) -> Anchor {
    Anchor::new(
        anchor.first_line,
        anchor.last_line,
        anchor.first_char,
        anchor.last_char,
    )
}
