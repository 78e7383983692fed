//! Search-index notification seam.
//!
//! The engine tells the indexer about the current revision of each
//! annotation after a promotion commits. Indexing is best-effort: failures
//! are logged by implementations and never roll back the commit that
//! triggered them.

use async_trait::async_trait;
use marginalia_core::types::DbId;

/// Receives current-revision changes for full-text indexing.
#[async_trait]
pub trait SearchIndexer: Send + Sync {
    /// A new revision became the current head of an annotation.
    async fn index_annotation(&self, annotation_id: DbId, body: &str, tags: &[String]);

    /// An annotation was deactivated or deleted and should leave the index.
    async fn remove_annotation(&self, annotation_id: DbId);
}

/// Indexer that drops every notification. Used in tests and deployments
/// without a search backend.
pub struct NoopIndexer;

#[async_trait]
impl SearchIndexer for NoopIndexer {
    async fn index_annotation(&self, annotation_id: DbId, _body: &str, _tags: &[String]) {
        tracing::trace!(annotation_id, "search indexing skipped (noop indexer)");
    }

    async fn remove_annotation(&self, annotation_id: DbId) {
        tracing::trace!(annotation_id, "search removal skipped (noop indexer)");
    }
}
