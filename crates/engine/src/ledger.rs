//! Reputation ledger operations.
//!
//! Every reputation mutation appends a `reputation_changes` entry and
//! adjusts `users.reputation` inside the same transaction, with the user's
//! row locked so the floor-at-zero clamp reads and writes atomically.
//! Reversal removes the entry and re-applies the inverse delta, clamped
//! against the reputation the user holds now.

use marginalia_core::error::CoreError;
use marginalia_core::reputation::{clamp_delta, clamp_reversal, ReputationCause};
use marginalia_core::types::DbId;
use marginalia_db::models::reputation_change::ReputationChange;
use marginalia_db::repositories::{ReputationRepo, UserRepo};

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Apply a reputation change in its own transaction.
    pub async fn apply_reputation(
        &self,
        user_id: DbId,
        cause: ReputationCause,
        nominal_delta: i64,
    ) -> EngineResult<ReputationChange> {
        let mut tx = self.pool.begin().await?;
        let change = Self::apply_reputation_inner(&mut tx, user_id, cause, nominal_delta).await?;
        tx.commit().await?;
        Ok(change)
    }

    /// Reverse a reputation change in its own transaction.
    pub async fn reverse_reputation(&self, change_id: DbId) -> EngineResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::reverse_reputation_inner(&mut tx, change_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Append a ledger entry and adjust the user's reputation within the
    /// caller's transaction. Deduction causes are clamped so the resulting
    /// reputation cannot drop below zero; the clamp is silent policy, not
    /// an error.
    pub(crate) async fn apply_reputation_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: DbId,
        cause: ReputationCause,
        nominal_delta: i64,
    ) -> EngineResult<ReputationChange> {
        let reputation = UserRepo::lock_reputation_inner(tx, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "user",
                id: user_id,
            })?;

        let effective = if cause.is_deduction() {
            clamp_delta(reputation, nominal_delta)
        } else {
            nominal_delta
        };
        if effective != nominal_delta {
            tracing::debug!(
                user_id,
                nominal_delta,
                effective,
                "reputation floor clamp engaged"
            );
        }

        UserRepo::adjust_reputation_inner(tx, user_id, effective).await?;
        let change = ReputationRepo::insert_inner(tx, user_id, effective, cause.as_str()).await?;
        Ok(change)
    }

    /// Remove a ledger entry and re-apply the inverse delta within the
    /// caller's transaction. The removal is clamped against current
    /// reputation: an award that has since been partially spent removes
    /// only what remains.
    pub(crate) async fn reverse_reputation_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        change_id: DbId,
    ) -> EngineResult<()> {
        let change = ReputationRepo::lock_by_id_inner(tx, change_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "reputation change",
                id: change_id,
            })?;
        let reputation = UserRepo::lock_reputation_inner(tx, change.user_id)
            .await?
            .ok_or_else(|| {
                EngineError::Core(CoreError::Internal(format!(
                    "reputation change {} references missing user {}",
                    change.id, change.user_id
                )))
            })?;

        let removal = clamp_reversal(reputation, change.delta);
        UserRepo::adjust_reputation_inner(tx, change.user_id, -removal).await?;
        ReputationRepo::delete_inner(tx, change.id).await?;
        Ok(())
    }
}
