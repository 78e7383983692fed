//! Pure domain logic for the marginalia revision-and-consensus engine.
//!
//! This crate has no internal dependencies and no I/O: it holds the shared
//! types, the error taxonomy, reputation math, anchor/tag resolution, and
//! content hashing used by the `db` and `engine` crates.

pub mod anchor;
pub mod error;
pub mod flags;
pub mod format;
pub mod hashing;
pub mod reputation;
pub mod rights;
pub mod types;
pub mod wiki;
