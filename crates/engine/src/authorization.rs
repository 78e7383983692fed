//! Capability oracle.
//!
//! A right is authorized when held explicitly or when the right carries a
//! `min_rep` threshold the user's reputation meets. The engine consults
//! this before every privileged operation; the decision itself lives in
//! the `rights` table.

use marginalia_core::error::CoreError;
use marginalia_core::types::DbId;
use marginalia_db::repositories::RightRepo;

use crate::{Engine, EngineResult};

impl Engine {
    /// Whether the user may exercise the named right.
    pub async fn is_authorized(&self, user_id: DbId, right: &str) -> EngineResult<bool> {
        Ok(RightRepo::is_authorized(&self.pool, user_id, right).await?)
    }

    /// Fail with [`CoreError::Forbidden`] unless the user holds the right.
    pub async fn require_right(&self, user_id: DbId, right: &str) -> EngineResult<()> {
        if self.is_authorized(user_id, right).await? {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!("requires the '{right}' right")).into())
        }
    }
}
