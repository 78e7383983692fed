//! Flags and followers.
//!
//! Flags are orthogonal to the revision machinery: any active user can
//! throw one, and only holders of the matching resolve right can close or
//! reopen them. `resolve_all` runs in a single transaction so a target is
//! never left half-cleared.

use marginalia_core::error::CoreError;
use marginalia_core::flags::{AnnotationFlagKind, UserFlagKind};
use marginalia_core::rights::{RIGHT_RESOLVE_ANNOTATION_FLAGS, RIGHT_RESOLVE_USER_FLAGS};
use marginalia_core::types::DbId;
use marginalia_db::models::flag::{AnnotationFlag, UserFlag};
use marginalia_db::repositories::{
    AnnotationFlagRepo, AnnotationRepo, EditRepo, FollowerRepo, TagRepo, UserFlagRepo, UserRepo,
};
use marginalia_events::DomainEvent;

use crate::{Engine, EngineResult};

impl Engine {
    // -----------------------------------------------------------------------
    // User flags
    // -----------------------------------------------------------------------

    /// Throw a flag on a user account.
    pub async fn flag_user(
        &self,
        thrower_id: DbId,
        user_id: DbId,
        kind: UserFlagKind,
    ) -> EngineResult<UserFlag> {
        self.fetch_active_user(thrower_id).await?;
        if UserRepo::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "user",
                id: user_id,
            }
            .into());
        }
        let flag = UserFlagRepo::insert(&self.pool, user_id, kind.as_str(), thrower_id).await?;
        tracing::info!(flag_id = flag.id, user_id, kind = kind.as_str(), "user flagged");
        self.bus.publish(
            DomainEvent::new("flag.thrown")
                .with_source("user", user_id)
                .with_actor(thrower_id)
                .with_payload(serde_json::json!({ "flag_id": flag.id, "kind": kind.as_str() })),
        );
        Ok(flag)
    }

    /// Resolve a user flag.
    pub async fn resolve_user_flag(
        &self,
        resolver_id: DbId,
        flag_id: DbId,
    ) -> EngineResult<UserFlag> {
        self.require_right(resolver_id, RIGHT_RESOLVE_USER_FLAGS)
            .await?;
        match UserFlagRepo::resolve(&self.pool, flag_id, resolver_id).await? {
            Some(flag) => {
                self.publish_flag_resolved("user", flag.user_id, resolver_id, flag.id);
                Ok(flag)
            }
            None => match UserFlagRepo::find_by_id(&self.pool, flag_id).await? {
                Some(_) => Err(CoreError::Conflict("flag is already resolved".to_string()).into()),
                None => Err(CoreError::NotFound {
                    entity: "user flag",
                    id: flag_id,
                }
                .into()),
            },
        }
    }

    /// Reopen a resolved user flag.
    pub async fn unresolve_user_flag(
        &self,
        resolver_id: DbId,
        flag_id: DbId,
    ) -> EngineResult<UserFlag> {
        self.require_right(resolver_id, RIGHT_RESOLVE_USER_FLAGS)
            .await?;
        UserFlagRepo::unresolve(&self.pool, flag_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "user flag",
                    id: flag_id,
                }
                .into()
            })
    }

    /// Resolve every active flag on a user in one transaction.
    pub async fn resolve_all_user_flags(
        &self,
        resolver_id: DbId,
        user_id: DbId,
    ) -> EngineResult<u64> {
        self.require_right(resolver_id, RIGHT_RESOLVE_USER_FLAGS)
            .await?;
        let mut tx = self.pool.begin().await?;
        let resolved = UserFlagRepo::resolve_all_inner(&mut tx, user_id, resolver_id).await?;
        tx.commit().await?;
        tracing::info!(user_id, resolver_id, resolved, "user flags bulk-resolved");
        Ok(resolved)
    }

    // -----------------------------------------------------------------------
    // Annotation flags
    // -----------------------------------------------------------------------

    /// Throw a flag on an annotation.
    pub async fn flag_annotation(
        &self,
        thrower_id: DbId,
        annotation_id: DbId,
        kind: AnnotationFlagKind,
    ) -> EngineResult<AnnotationFlag> {
        self.fetch_active_user(thrower_id).await?;
        if AnnotationRepo::find_by_id(&self.pool, annotation_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            }
            .into());
        }
        let flag =
            AnnotationFlagRepo::insert(&self.pool, annotation_id, kind.as_str(), thrower_id)
                .await?;
        tracing::info!(
            flag_id = flag.id,
            annotation_id,
            kind = kind.as_str(),
            "annotation flagged"
        );
        self.bus.publish(
            DomainEvent::new("flag.thrown")
                .with_source("annotation", annotation_id)
                .with_actor(thrower_id)
                .with_payload(serde_json::json!({ "flag_id": flag.id, "kind": kind.as_str() })),
        );
        Ok(flag)
    }

    /// Resolve an annotation flag.
    pub async fn resolve_annotation_flag(
        &self,
        resolver_id: DbId,
        flag_id: DbId,
    ) -> EngineResult<AnnotationFlag> {
        self.require_right(resolver_id, RIGHT_RESOLVE_ANNOTATION_FLAGS)
            .await?;
        match AnnotationFlagRepo::resolve(&self.pool, flag_id, resolver_id).await? {
            Some(flag) => {
                self.publish_flag_resolved("annotation", flag.annotation_id, resolver_id, flag.id);
                Ok(flag)
            }
            None => match AnnotationFlagRepo::find_by_id(&self.pool, flag_id).await? {
                Some(_) => Err(CoreError::Conflict("flag is already resolved".to_string()).into()),
                None => Err(CoreError::NotFound {
                    entity: "annotation flag",
                    id: flag_id,
                }
                .into()),
            },
        }
    }

    /// Reopen a resolved annotation flag.
    pub async fn unresolve_annotation_flag(
        &self,
        resolver_id: DbId,
        flag_id: DbId,
    ) -> EngineResult<AnnotationFlag> {
        self.require_right(resolver_id, RIGHT_RESOLVE_ANNOTATION_FLAGS)
            .await?;
        AnnotationFlagRepo::unresolve(&self.pool, flag_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "annotation flag",
                    id: flag_id,
                }
                .into()
            })
    }

    /// Resolve every active flag on an annotation in one transaction.
    pub async fn resolve_all_annotation_flags(
        &self,
        resolver_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<u64> {
        self.require_right(resolver_id, RIGHT_RESOLVE_ANNOTATION_FLAGS)
            .await?;
        let mut tx = self.pool.begin().await?;
        let resolved =
            AnnotationFlagRepo::resolve_all_inner(&mut tx, annotation_id, resolver_id).await?;
        tx.commit().await?;
        tracing::info!(
            annotation_id,
            resolver_id,
            resolved,
            "annotation flags bulk-resolved"
        );
        Ok(resolved)
    }

    // -----------------------------------------------------------------------
    // Annotation visibility
    // -----------------------------------------------------------------------

    /// Administratively hide an annotation. An inactive annotation leaves
    /// the search index and rejects new proposals and votes until it is
    /// reactivated.
    pub async fn deactivate_annotation(
        &self,
        actor_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<()> {
        self.require_right(actor_id, RIGHT_RESOLVE_ANNOTATION_FLAGS)
            .await?;
        let annotation = AnnotationRepo::find_by_id(&self.pool, annotation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            })?;
        if !annotation.active {
            return Err(CoreError::Conflict("annotation is already inactive".to_string()).into());
        }
        AnnotationRepo::set_active(&self.pool, annotation_id, false).await?;
        tracing::info!(annotation_id, actor_id, "annotation deactivated");
        self.indexer().remove_annotation(annotation_id).await;
        self.bus.publish(
            DomainEvent::new("annotation.deactivated")
                .with_source("annotation", annotation_id)
                .with_actor(actor_id),
        );
        Ok(())
    }

    /// Restore a deactivated annotation, re-indexing its current revision.
    pub async fn reactivate_annotation(
        &self,
        actor_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<()> {
        self.require_right(actor_id, RIGHT_RESOLVE_ANNOTATION_FLAGS)
            .await?;
        let annotation = AnnotationRepo::find_by_id(&self.pool, annotation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            })?;
        if annotation.active {
            return Err(CoreError::Conflict("annotation is already active".to_string()).into());
        }
        AnnotationRepo::set_active(&self.pool, annotation_id, true).await?;
        if let Some(head) = EditRepo::find_head(&self.pool, annotation_id).await? {
            let tags = TagRepo::names_for_edit(&self.pool, head.id).await?;
            self.indexer()
                .index_annotation(annotation_id, &head.body, &tags)
                .await;
        }
        tracing::info!(annotation_id, actor_id, "annotation reactivated");
        self.bus.publish(
            DomainEvent::new("annotation.reactivated")
                .with_source("annotation", annotation_id)
                .with_actor(actor_id),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Followers
    // -----------------------------------------------------------------------

    /// Follow an annotation for promotion/rejection notifications.
    pub async fn follow_annotation(&self, user_id: DbId, annotation_id: DbId) -> EngineResult<()> {
        self.fetch_active_user(user_id).await?;
        if AnnotationRepo::find_by_id(&self.pool, annotation_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            }
            .into());
        }
        FollowerRepo::follow(&self.pool, annotation_id, user_id).await?;
        Ok(())
    }

    /// Stop following an annotation.
    pub async fn unfollow_annotation(
        &self,
        user_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<()> {
        FollowerRepo::unfollow(&self.pool, annotation_id, user_id).await?;
        Ok(())
    }

    fn publish_flag_resolved(
        &self,
        entity_type: &str,
        entity_id: DbId,
        resolver_id: DbId,
        flag_id: DbId,
    ) {
        self.bus.publish(
            DomainEvent::new("flag.resolved")
                .with_source(entity_type, entity_id)
                .with_actor(resolver_id)
                .with_payload(serde_json::json!({ "flag_id": flag_id })),
        );
    }
}
