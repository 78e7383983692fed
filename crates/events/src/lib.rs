//! Marginalia event bus and search notification seams.
//!
//! This crate provides the out-of-band collaborators the revision engine
//! notifies after a state change commits:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, used to fan notifications out to followers.
//! - [`DomainEvent`] — the canonical domain event envelope.
//! - [`SearchIndexer`] — async seam for keeping the full-text index in step
//!   with the current revision of each annotation.

pub mod bus;
pub mod search;

pub use bus::{DomainEvent, EventBus};
pub use search::{NoopIndexer, SearchIndexer};
