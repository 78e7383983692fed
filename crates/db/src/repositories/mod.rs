//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods suffixed `_inner` run
//! inside a caller-owned transaction so the engine can compose them into
//! atomic operations.

pub mod annotation_repo;
pub mod edit_repo;
pub mod flag_repo;
pub mod follower_repo;
pub mod reputation_repo;
pub mod right_repo;
pub mod tag_repo;
pub mod user_repo;
pub mod vote_repo;
pub mod wiki_repo;

pub use annotation_repo::AnnotationRepo;
pub use edit_repo::EditRepo;
pub use flag_repo::{AnnotationFlagRepo, UserFlagRepo};
pub use follower_repo::FollowerRepo;
pub use reputation_repo::ReputationRepo;
pub use right_repo::RightRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
pub use vote_repo::{AnnotationVoteRepo, EditVoteRepo, WikiEditVoteRepo};
pub use wiki_repo::{WikiEditRepo, WikiRepo};
