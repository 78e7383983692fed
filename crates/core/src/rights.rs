//! Well-known right name constants.
//!
//! These must match the seed data in `crates/db/migrations`. A right may be
//! held explicitly or granted by reputation when the row carries a `min_rep`
//! threshold.

/// Proposed annotation edits by this user are applied without review.
pub const RIGHT_IMMEDIATE_EDITS: &str = "immediate_edits";

/// Proposed wiki edits by this user are applied without review.
pub const RIGHT_IMMEDIATE_WIKI_EDITS: &str = "immediate_wiki_edits";

/// May administratively delete a revision from an edit chain.
pub const RIGHT_DELETE_EDITS: &str = "delete_edits";

/// May propose edits to annotations locked for editing.
pub const RIGHT_EDIT_LOCKED_ANNOTATIONS: &str = "edit_locked_annotations";

/// May resolve and unresolve annotation flags.
pub const RIGHT_RESOLVE_ANNOTATION_FLAGS: &str = "resolve_annotation_flags";

/// May resolve and unresolve user flags.
pub const RIGHT_RESOLVE_USER_FLAGS: &str = "resolve_user_flags";

/// May apply locked tags to an edit.
pub const RIGHT_USE_LOCKED_TAGS: &str = "use_locked_tags";
