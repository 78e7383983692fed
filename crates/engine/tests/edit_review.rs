//! Integration tests for edit review voting: thresholds, toggles,
//! self-vote and terminal-edit guards, overrides, and the approval award.

use assert_matches::assert_matches;
use marginalia_core::anchor::Anchor;
use marginalia_core::error::CoreError;
use marginalia_core::rights::RIGHT_IMMEDIATE_EDITS;
use marginalia_db::models::annotation::AnnotationDraft;
use marginalia_db::models::edit::{Edit, EditDraft};
use marginalia_db::models::user::{CreateUser, User};
use marginalia_db::repositories::{EditRepo, ReputationRepo, RightRepo, UserRepo};
use marginalia_engine::{Engine, EngineError, ReviewOutcome};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn user(pool: &PgPool, name: &str) -> User {
    init_tracing();
    UserRepo::create(
        pool,
        &CreateUser {
            displayname: name.to_string(),
            email: format!("{name}@example.com"),
        },
    )
    .await
    .unwrap()
}

/// An annotation by alice with a pending revision by bob. Returns
/// (annotation_id, pending_edit, bob).
async fn pending_edit(pool: &PgPool, engine: &Engine) -> (i64, Edit, User) {
    let alice = user(pool, "alice").await;
    let bob = user(pool, "bob").await;
    let (annotation, _) = engine
        .create_annotation(
            alice.id,
            &AnnotationDraft {
                edition_id: 1,
                anchor: Anchor::new(10, 12, 0, 4),
                body: "original".to_string(),
                tags: vec![],
            },
        )
        .await
        .unwrap();
    let edit = engine
        .propose_edit(
            bob.id,
            annotation.id,
            &EditDraft {
                anchor: Anchor::new(10, 12, 0, 4),
                body: "revised".to_string(),
                tags: vec![],
                reason: "clarify".to_string(),
            },
        )
        .await
        .unwrap();
    (annotation.id, edit, bob)
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_two_upvotes_promote_at_threshold(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (annotation_id, edit, bob) = pending_edit(&pool, &engine).await;
    let carol = user(&pool, "carol").await;
    let dave = user(&pool, "dave").await;

    let first = engine.upvote_edit(carol.id, edit.id).await.unwrap();
    assert_eq!(first, ReviewOutcome::Pending { weight: 1 });

    let second = engine.upvote_edit(dave.id, edit.id).await.unwrap();
    assert_eq!(second, ReviewOutcome::Promoted);

    let head = EditRepo::find_head(&pool, annotation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(head.id, edit.id);
    assert!(head.approved);

    // The editor was awarded the consensus-approval reputation.
    let bob = UserRepo::find_by_id(&pool, bob.id).await.unwrap().unwrap();
    assert_eq!(bob.reputation, 2);
    assert_eq!(ReputationRepo::ledger_total(&pool, bob.id).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_two_downvotes_reject_at_threshold(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (annotation_id, edit, bob) = pending_edit(&pool, &engine).await;
    let carol = user(&pool, "carol").await;
    let dave = user(&pool, "dave").await;

    let first = engine.downvote_edit(carol.id, edit.id).await.unwrap();
    assert_eq!(first, ReviewOutcome::Pending { weight: -1 });

    let second = engine.downvote_edit(dave.id, edit.id).await.unwrap();
    assert_eq!(second, ReviewOutcome::Rejected);

    let rejected = EditRepo::find_by_id(&pool, edit.id).await.unwrap().unwrap();
    assert!(rejected.rejected && !rejected.current);

    // The head never moved and no reputation was awarded.
    let head = EditRepo::find_head(&pool, annotation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(head.body, "original");
    let bob = UserRepo::find_by_id(&pool, bob.id).await.unwrap().unwrap();
    assert_eq!(bob.reputation, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_override_right_promotes_in_one_vote(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, _) = pending_edit(&pool, &engine).await;
    let moderator = user(&pool, "moderator").await;
    RightRepo::grant(&pool, moderator.id, RIGHT_IMMEDIATE_EDITS)
        .await
        .unwrap();

    let outcome = engine.upvote_edit(moderator.id, edit.id).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Promoted);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_override_right_rejects_in_one_vote(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, _) = pending_edit(&pool, &engine).await;
    let moderator = user(&pool, "moderator").await;
    RightRepo::grant(&pool, moderator.id, RIGHT_IMMEDIATE_EDITS)
        .await
        .unwrap();

    let outcome = engine.downvote_edit(moderator.id, edit.id).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Rejected);
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_no_self_vote(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, bob) = pending_edit(&pool, &engine).await;

    let err = engine.upvote_edit(bob.id, edit.id).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));

    // The guard fired before any weight mutation.
    let edit = EditRepo::find_by_id(&pool, edit.id).await.unwrap().unwrap();
    assert_eq!(edit.weight, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_no_vote_on_terminal_edit(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, _) = pending_edit(&pool, &engine).await;
    let carol = user(&pool, "carol").await;
    let dave = user(&pool, "dave").await;
    let erin = user(&pool, "erin").await;
    engine.upvote_edit(carol.id, edit.id).await.unwrap();
    engine.upvote_edit(dave.id, edit.id).await.unwrap();

    let err = engine.upvote_edit(erin.id, edit.id).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
}

// ---------------------------------------------------------------------------
// Toggle discipline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_same_direction_revote_cancels(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, _) = pending_edit(&pool, &engine).await;
    let carol = user(&pool, "carol").await;

    engine.upvote_edit(carol.id, edit.id).await.unwrap();
    let outcome = engine.upvote_edit(carol.id, edit.id).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Withdrawn { weight: 0 });

    // Idempotence: net effect of the pair is zero, and a third vote counts
    // as one.
    let outcome = engine.upvote_edit(carol.id, edit.id).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Pending { weight: 1 });
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_opposite_direction_revote_flips(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, _) = pending_edit(&pool, &engine).await;
    let carol = user(&pool, "carol").await;

    engine.upvote_edit(carol.id, edit.id).await.unwrap();
    let outcome = engine.downvote_edit(carol.id, edit.id).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Pending { weight: -1 });
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_retract_edit_vote(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let (_, edit, _) = pending_edit(&pool, &engine).await;
    let carol = user(&pool, "carol").await;

    engine.upvote_edit(carol.id, edit.id).await.unwrap();
    let outcome = engine.retract_edit_vote(carol.id, edit.id).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Withdrawn { weight: 0 });

    let err = engine
        .retract_edit_vote(carol.id, edit.id)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
}
