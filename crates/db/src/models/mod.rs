//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the create DTOs the engine accepts.

pub mod annotation;
pub mod edit;
pub mod flag;
pub mod reputation_change;
pub mod tag;
pub mod user;
pub mod vote;
pub mod wiki;
