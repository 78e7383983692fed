//! Consensus and voting.
//!
//! Two distinct ballots share the toggle discipline (same direction twice
//! cancels, opposite direction flips):
//!
//! - review votes on pending edits and wiki edits carry ±1 and drive the
//!   approval/rejection thresholds;
//! - annotation votes carry reputation-derived vote power and mutate the
//!   author's reputation through the ledger, with no threshold.
//!
//! Every weight read that feeds a threshold decision happens under the row
//! locks of the edit and its parent, inside the transaction that applies
//! the resulting transition.

use marginalia_core::error::CoreError;
use marginalia_core::reputation::{down_power, up_power, ReputationCause};
use marginalia_core::rights::{RIGHT_IMMEDIATE_EDITS, RIGHT_IMMEDIATE_WIKI_EDITS};
use marginalia_core::types::DbId;
use marginalia_db::repositories::{
    AnnotationRepo, AnnotationVoteRepo, EditRepo, EditVoteRepo, FollowerRepo, TagRepo,
    WikiEditRepo, WikiEditVoteRepo, WikiRepo,
};
use marginalia_events::DomainEvent;

use crate::{Engine, EngineResult};

/// What a review vote did to the target edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The vote was recorded; the edit is still pending at this weight.
    Pending { weight: i64 },
    /// A same-direction revote cancelled the prior vote.
    Withdrawn { weight: i64 },
    /// The vote crossed the approval threshold (or carried an override);
    /// the edit is now current.
    Promoted,
    /// The vote crossed the rejection threshold (or carried an override);
    /// the edit is terminally rejected.
    Rejected,
}

/// What an annotation vote did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationVoteOutcome {
    /// The vote was recorded at this display weight.
    Recorded { weight: i64 },
    /// A same-direction revote cancelled the prior vote.
    Withdrawn { weight: i64 },
}

impl Engine {
    // -----------------------------------------------------------------------
    // Edit review votes
    // -----------------------------------------------------------------------

    /// Cast an approval vote on a pending edit.
    pub async fn upvote_edit(&self, voter_id: DbId, edit_id: DbId) -> EngineResult<ReviewOutcome> {
        self.review_edit_vote(voter_id, edit_id, true).await
    }

    /// Cast a rejection vote on a pending edit.
    pub async fn downvote_edit(
        &self,
        voter_id: DbId,
        edit_id: DbId,
    ) -> EngineResult<ReviewOutcome> {
        self.review_edit_vote(voter_id, edit_id, false).await
    }

    /// Withdraw the voter's existing vote on a pending edit.
    pub async fn retract_edit_vote(
        &self,
        voter_id: DbId,
        edit_id: DbId,
    ) -> EngineResult<ReviewOutcome> {
        self.fetch_active_user(voter_id).await?;
        let mut tx = self.pool.begin().await?;
        let edit = EditRepo::lock_by_id_inner(&mut tx, edit_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "edit",
                id: edit_id,
            })?;
        if !edit.is_pending() {
            return Err(CoreError::Conflict("edit review is closed".to_string()).into());
        }
        let vote = EditVoteRepo::find_by_target_and_voter_inner(&mut tx, edit_id, voter_id)
            .await?
            .ok_or_else(|| CoreError::Conflict("no vote to retract".to_string()))?;
        EditVoteRepo::delete_inner(&mut tx, vote.id).await?;
        let weight = EditRepo::add_weight_inner(&mut tx, edit_id, -vote.delta).await?;
        tx.commit().await?;
        Ok(ReviewOutcome::Withdrawn { weight })
    }

    async fn review_edit_vote(
        &self,
        voter_id: DbId,
        edit_id: DbId,
        up: bool,
    ) -> EngineResult<ReviewOutcome> {
        self.fetch_active_user(voter_id).await?;
        let override_right = self.is_authorized(voter_id, RIGHT_IMMEDIATE_EDITS).await?;

        let mut tx = self.pool.begin().await?;
        let edit = EditRepo::lock_by_id_inner(&mut tx, edit_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "edit",
                id: edit_id,
            })?;
        if !edit.is_pending() {
            return Err(CoreError::Conflict(
                "edit review is closed (already approved or rejected)".to_string(),
            )
            .into());
        }
        if voter_id == edit.editor_id {
            return Err(CoreError::Conflict("cannot vote on your own edit".to_string()).into());
        }
        let annotation = AnnotationRepo::lock_by_id_inner(&mut tx, edit.annotation_id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "edit {} references missing annotation {}",
                    edit.id, edit.annotation_id
                ))
            })?;

        // Toggle discipline: a prior vote is rolled back first.
        if let Some(prior) =
            EditVoteRepo::find_by_target_and_voter_inner(&mut tx, edit_id, voter_id).await?
        {
            EditVoteRepo::delete_inner(&mut tx, prior.id).await?;
            let weight = EditRepo::add_weight_inner(&mut tx, edit_id, -prior.delta).await?;
            if prior.is_up() == up {
                tx.commit().await?;
                return Ok(ReviewOutcome::Withdrawn { weight });
            }
        }

        let delta: i64 = if up { 1 } else { -1 };
        let vote = EditVoteRepo::insert_inner(&mut tx, edit_id, voter_id, delta).await?;
        let weight = EditRepo::add_weight_inner(&mut tx, edit_id, delta).await?;

        let outcome = if up && (weight >= self.config.edit_approval_threshold || override_right) {
            EditRepo::promote_inner(&mut tx, annotation.id, edit_id).await?;
            let change = Self::apply_reputation_inner(
                &mut tx,
                edit.editor_id,
                ReputationCause::EditApproval,
                self.config.edit_approval_delta,
            )
            .await?;
            EditVoteRepo::set_reputation_change_inner(&mut tx, vote.id, change.id).await?;
            ReviewOutcome::Promoted
        } else if !up && (weight <= self.config.edit_rejection_threshold || override_right) {
            EditRepo::reject_inner(&mut tx, edit_id).await?;
            ReviewOutcome::Rejected
        } else {
            ReviewOutcome::Pending { weight }
        };
        tx.commit().await?;

        match outcome {
            ReviewOutcome::Promoted => {
                tracing::info!(edit_id, annotation_id = annotation.id, weight, "edit promoted");
                let tags = TagRepo::names_for_edit(&self.pool, edit_id).await?;
                self.indexer()
                    .index_annotation(annotation.id, &edit.body, &tags)
                    .await;
                let followers = FollowerRepo::follower_ids(&self.pool, annotation.id).await?;
                self.bus.publish(
                    DomainEvent::new("edit.promoted")
                        .with_source("annotation", annotation.id)
                        .with_actor(voter_id)
                        .with_recipients(followers)
                        .with_payload(serde_json::json!({ "edit_id": edit_id })),
                );
            }
            ReviewOutcome::Rejected => {
                tracing::info!(edit_id, annotation_id = annotation.id, weight, "edit rejected");
                let followers = FollowerRepo::follower_ids(&self.pool, annotation.id).await?;
                self.bus.publish(
                    DomainEvent::new("edit.rejected")
                        .with_source("annotation", annotation.id)
                        .with_actor(voter_id)
                        .with_recipients(followers)
                        .with_payload(serde_json::json!({ "edit_id": edit_id })),
                );
            }
            ReviewOutcome::Pending { .. } | ReviewOutcome::Withdrawn { .. } => {}
        }
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Wiki edit review votes
    // -----------------------------------------------------------------------

    /// Cast an approval vote on a pending wiki edit.
    pub async fn upvote_wiki_edit(
        &self,
        voter_id: DbId,
        wiki_edit_id: DbId,
    ) -> EngineResult<ReviewOutcome> {
        self.review_wiki_edit_vote(voter_id, wiki_edit_id, true).await
    }

    /// Cast a rejection vote on a pending wiki edit.
    pub async fn downvote_wiki_edit(
        &self,
        voter_id: DbId,
        wiki_edit_id: DbId,
    ) -> EngineResult<ReviewOutcome> {
        self.review_wiki_edit_vote(voter_id, wiki_edit_id, false).await
    }

    async fn review_wiki_edit_vote(
        &self,
        voter_id: DbId,
        wiki_edit_id: DbId,
        up: bool,
    ) -> EngineResult<ReviewOutcome> {
        self.fetch_active_user(voter_id).await?;
        let override_right = self
            .is_authorized(voter_id, RIGHT_IMMEDIATE_WIKI_EDITS)
            .await?;

        let mut tx = self.pool.begin().await?;
        let edit = WikiEditRepo::lock_by_id_inner(&mut tx, wiki_edit_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "wiki edit",
                id: wiki_edit_id,
            })?;
        if !edit.is_pending() {
            return Err(CoreError::Conflict(
                "wiki edit review is closed (already approved or rejected)".to_string(),
            )
            .into());
        }
        if voter_id == edit.editor_id {
            return Err(CoreError::Conflict("cannot vote on your own edit".to_string()).into());
        }
        let wiki = WikiRepo::lock_by_id_inner(&mut tx, edit.wiki_id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "wiki edit {} references missing wiki {}",
                    edit.id, edit.wiki_id
                ))
            })?;

        if let Some(prior) =
            WikiEditVoteRepo::find_by_target_and_voter_inner(&mut tx, wiki_edit_id, voter_id)
                .await?
        {
            WikiEditVoteRepo::delete_inner(&mut tx, prior.id).await?;
            let weight =
                WikiEditRepo::add_weight_inner(&mut tx, wiki_edit_id, -prior.delta).await?;
            if prior.is_up() == up {
                tx.commit().await?;
                return Ok(ReviewOutcome::Withdrawn { weight });
            }
        }

        let delta: i64 = if up { 1 } else { -1 };
        WikiEditVoteRepo::insert_inner(&mut tx, wiki_edit_id, voter_id, delta).await?;
        let weight = WikiEditRepo::add_weight_inner(&mut tx, wiki_edit_id, delta).await?;

        let outcome = if up && (weight >= self.config.edit_approval_threshold || override_right) {
            WikiEditRepo::promote_inner(&mut tx, wiki.id, wiki_edit_id).await?;
            ReviewOutcome::Promoted
        } else if !up && (weight <= self.config.edit_rejection_threshold || override_right) {
            WikiEditRepo::reject_inner(&mut tx, wiki_edit_id).await?;
            ReviewOutcome::Rejected
        } else {
            ReviewOutcome::Pending { weight }
        };
        tx.commit().await?;

        match outcome {
            ReviewOutcome::Promoted => {
                tracing::info!(wiki_edit_id, wiki_id = wiki.id, weight, "wiki edit promoted");
                self.bus.publish(
                    DomainEvent::new("wiki_edit.promoted")
                        .with_source("wiki", wiki.id)
                        .with_actor(voter_id)
                        .with_payload(serde_json::json!({ "wiki_edit_id": wiki_edit_id })),
                );
            }
            ReviewOutcome::Rejected => {
                tracing::info!(wiki_edit_id, wiki_id = wiki.id, weight, "wiki edit rejected");
                self.bus.publish(
                    DomainEvent::new("wiki_edit.rejected")
                        .with_source("wiki", wiki.id)
                        .with_actor(voter_id)
                        .with_payload(serde_json::json!({ "wiki_edit_id": wiki_edit_id })),
                );
            }
            ReviewOutcome::Pending { .. } | ReviewOutcome::Withdrawn { .. } => {}
        }
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Annotation votes
    // -----------------------------------------------------------------------

    /// Cast a reputation-weighted upvote on an annotation.
    pub async fn upvote_annotation(
        &self,
        voter_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<AnnotationVoteOutcome> {
        self.annotation_vote(voter_id, annotation_id, true).await
    }

    /// Cast a reputation-weighted downvote on an annotation.
    pub async fn downvote_annotation(
        &self,
        voter_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<AnnotationVoteOutcome> {
        self.annotation_vote(voter_id, annotation_id, false).await
    }

    /// Withdraw the voter's existing annotation vote, reversing the
    /// author's reputation change with it.
    pub async fn retract_annotation_vote(
        &self,
        voter_id: DbId,
        annotation_id: DbId,
    ) -> EngineResult<AnnotationVoteOutcome> {
        self.fetch_active_user(voter_id).await?;
        let mut tx = self.pool.begin().await?;
        AnnotationRepo::lock_by_id_inner(&mut tx, annotation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            })?;
        let vote =
            AnnotationVoteRepo::find_by_target_and_voter_inner(&mut tx, annotation_id, voter_id)
                .await?
                .ok_or_else(|| CoreError::Conflict("no vote to retract".to_string()))?;
        Self::reverse_reputation_inner(&mut tx, vote.reputation_change_id).await?;
        AnnotationVoteRepo::delete_inner(&mut tx, vote.id).await?;
        let weight = AnnotationRepo::add_weight_inner(&mut tx, annotation_id, -vote.delta).await?;
        tx.commit().await?;
        Ok(AnnotationVoteOutcome::Withdrawn { weight })
    }

    async fn annotation_vote(
        &self,
        voter_id: DbId,
        annotation_id: DbId,
        up: bool,
    ) -> EngineResult<AnnotationVoteOutcome> {
        let voter = self.fetch_active_user(voter_id).await?;

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
        if voter_id == annotation.annotator_id {
            return Err(
                CoreError::Conflict("cannot vote on your own annotation".to_string()).into(),
            );
        }

        // Toggle discipline, with the paired reputation change reversed.
        if let Some(prior) =
            AnnotationVoteRepo::find_by_target_and_voter_inner(&mut tx, annotation_id, voter_id)
                .await?
        {
            Self::reverse_reputation_inner(&mut tx, prior.reputation_change_id).await?;
            AnnotationVoteRepo::delete_inner(&mut tx, prior.id).await?;
            let weight =
                AnnotationRepo::add_weight_inner(&mut tx, annotation_id, -prior.delta).await?;
            if prior.is_up() == up {
                tx.commit().await?;
                return Ok(AnnotationVoteOutcome::Withdrawn { weight });
            }
        }

        // Vote power is derived from the voter's reputation; the author's
        // reputation moves by the configured per-vote delta, not the power.
        let (power, cause, nominal) = if up {
            (
                up_power(voter.reputation),
                ReputationCause::AnnotationUpvote,
                self.config.annotation_upvote_delta,
            )
        } else {
            (
                down_power(voter.reputation),
                ReputationCause::AnnotationDownvote,
                self.config.annotation_downvote_delta,
            )
        };
        let change =
            Self::apply_reputation_inner(&mut tx, annotation.annotator_id, cause, nominal).await?;
        AnnotationVoteRepo::insert_inner(&mut tx, annotation_id, voter_id, power, change.id)
            .await?;
        let weight = AnnotationRepo::add_weight_inner(&mut tx, annotation_id, power).await?;
        tx.commit().await?;

        tracing::debug!(annotation_id, voter_id, power, weight, "annotation vote recorded");
        self.bus.publish(
            DomainEvent::new("annotation.voted")
                .with_source("annotation", annotation_id)
                .with_actor(voter_id)
                .with_payload(serde_json::json!({ "delta": power, "weight": weight })),
        );
        Ok(AnnotationVoteOutcome::Recorded { weight })
    }
}
