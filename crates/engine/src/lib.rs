//! Marginalia revision-and-consensus engine.
//!
//! [`Engine`] is the single entry point the surrounding web layer calls.
//! It owns the connection pool, the tunable thresholds, the event bus, and
//! the search indexer seam, and exposes one async method per operation:
//!
//! - `chain` — annotation creation, edit proposal, and administrative
//!   chain surgery.
//! - `wiki` — the same revision chain applied to wiki descriptions.
//! - `voting` — edit review votes with consensus thresholds, and
//!   reputation-weighted annotation votes.
//! - `ledger` — the reputation ledger (apply / reverse with the
//!   floor-at-zero clamp).
//! - `moderation` — flags on users and annotations, plus follower
//!   management.
//! - `authorization` — the capability oracle consulted by the rest.
//!
//! Every operation opens one transaction scoped exactly to itself and
//! publishes events / indexer notifications only after that transaction
//! commits.

use std::sync::Arc;

use marginalia_events::{EventBus, NoopIndexer, SearchIndexer};
use sqlx::PgPool;

pub mod authorization;
pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod moderation;
pub mod voting;
pub mod wiki;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use voting::ReviewOutcome;

/// The revision-and-consensus engine service.
///
/// Cheap to clone via the shared handles; intended to be constructed once
/// and shared across request handlers.
#[derive(Clone)]
pub struct Engine {
    pool: PgPool,
    config: EngineConfig,
    bus: Arc<EventBus>,
    indexer: Arc<dyn SearchIndexer>,
}

impl Engine {
    /// Construct an engine with explicit collaborators.
    pub fn new(
        pool: PgPool,
        config: EngineConfig,
        bus: Arc<EventBus>,
        indexer: Arc<dyn SearchIndexer>,
    ) -> Self {
        Self {
            pool,
            config,
            bus,
            indexer,
        }
    }

    /// Construct an engine with default config, a fresh bus, and the no-op
    /// indexer. The usual constructor in tests.
    pub fn with_defaults(pool: PgPool) -> Self {
        Self::new(
            pool,
            EngineConfig::default(),
            Arc::new(EventBus::default()),
            Arc::new(NoopIndexer),
        )
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The event bus notifications are published on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn indexer(&self) -> &dyn SearchIndexer {
        self.indexer.as_ref()
    }
}
