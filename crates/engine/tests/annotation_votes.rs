//! Integration tests for reputation-weighted annotation voting: vote power,
//! the paired ledger entry, the floor-at-zero clamp, and rollback.

use assert_matches::assert_matches;
use marginalia_core::anchor::Anchor;
use marginalia_core::error::CoreError;
use marginalia_core::reputation::ReputationCause;
use marginalia_db::models::annotation::AnnotationDraft;
use marginalia_db::models::user::{CreateUser, User};
use marginalia_db::repositories::{AnnotationRepo, ReputationRepo, UserRepo};
use marginalia_engine::voting::AnnotationVoteOutcome;
use marginalia_engine::{Engine, EngineError};
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

async fn annotation(engine: &Engine, annotator: &User) -> i64 {
    let (annotation, _) = engine
        .create_annotation(
            annotator.id,
            &AnnotationDraft {
                edition_id: 1,
                anchor: Anchor::new(10, 12, 0, 4),
                body: "a note".to_string(),
                tags: vec![],
            },
        )
        .await
        .unwrap();
    annotation.id
}

async fn reputation(pool: &PgPool, user_id: i64) -> i64 {
    UserRepo::find_by_id(pool, user_id)
        .await
        .unwrap()
        .unwrap()
        .reputation
}

// ---------------------------------------------------------------------------
// Vote power and the paired ledger entry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_zero_reputation_voter_has_power_one(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    let outcome = engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Recorded { weight: 1 });

    // The author earned the configured upvote delta, not the vote power.
    assert_eq!(reputation(&pool, alice.id).await, 5);
    assert_eq!(
        ReputationRepo::ledger_total(&pool, alice.id).await.unwrap(),
        5
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_vote_power_scales_with_reputation(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    // up_power(100) = floor(10 * log10(100)) = 20.
    engine
        .apply_reputation(bob.id, ReputationCause::EditApproval, 100)
        .await
        .unwrap();

    let outcome = engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Recorded { weight: 20 });
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_downvote_power_is_half_negated(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    // down_power(100) = -10.
    engine
        .apply_reputation(bob.id, ReputationCause::EditApproval, 100)
        .await
        .unwrap();

    let outcome = engine
        .downvote_annotation(bob.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Recorded { weight: -10 });
}

// ---------------------------------------------------------------------------
// Floor-at-zero clamp
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_downvote_clamps_author_reputation_at_zero(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let carol = user(&pool, "carol").await;
    let annotation_id = annotation(&engine, &alice).await;

    engine
        .downvote_annotation(bob.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(reputation(&pool, alice.id).await, 0);

    // Repeated deductions still never push below zero, and the ledger sum
    // stays equal to the stored reputation.
    engine
        .downvote_annotation(carol.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(reputation(&pool, alice.id).await, 0);
    assert_eq!(
        ReputationRepo::ledger_total(&pool, alice.id).await.unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_clamped_delta_is_partial_not_nominal(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    // Author holds 1 reputation; a nominal -2 is clamped to -1.
    engine
        .apply_reputation(alice.id, ReputationCause::EditApproval, 1)
        .await
        .unwrap();
    engine
        .downvote_annotation(bob.id, annotation_id)
        .await
        .unwrap();

    assert_eq!(reputation(&pool, alice.id).await, 0);
    let ledger = ReputationRepo::list_for_user(&pool, alice.id).await.unwrap();
    assert_eq!(ledger[0].delta, -1);
}

// ---------------------------------------------------------------------------
// Toggle and rollback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_same_direction_revote_rolls_back_exactly(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    assert_eq!(reputation(&pool, alice.id).await, 5);

    let outcome = engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Withdrawn { weight: 0 });
    assert_eq!(reputation(&pool, alice.id).await, 0);
    assert_eq!(
        ReputationRepo::ledger_total(&pool, alice.id).await.unwrap(),
        0
    );

    // Round trip: re-applying the identical vote reproduces the original
    // weight and reputation state.
    let outcome = engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Recorded { weight: 1 });
    assert_eq!(reputation(&pool, alice.id).await, 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_opposite_direction_revote_flips(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    let outcome = engine
        .downvote_annotation(bob.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Recorded { weight: -1 });

    // The +5 was reversed, then the downvote applied against 0 and clamped.
    assert_eq!(reputation(&pool, alice.id).await, 0);
    let stored = AnnotationRepo::find_by_id(&pool, annotation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.weight, -1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_retract_partially_spent_award_floors_at_zero(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let carol = user(&pool, "carol").await;
    let annotation_id = annotation(&engine, &alice).await;

    // +5 from bob, then -2 from carol: alice holds 3 of the original 5.
    engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    engine
        .downvote_annotation(carol.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(reputation(&pool, alice.id).await, 3);

    // Retracting the +5 award can only remove the 3 that remain; the
    // reversal clamps at zero instead of overshooting.
    let outcome = engine
        .retract_annotation_vote(bob.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Withdrawn { weight: -1 });
    assert_eq!(reputation(&pool, alice.id).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_retract_annotation_vote(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;

    engine.upvote_annotation(bob.id, annotation_id).await.unwrap();
    let outcome = engine
        .retract_annotation_vote(bob.id, annotation_id)
        .await
        .unwrap();
    assert_eq!(outcome, AnnotationVoteOutcome::Withdrawn { weight: 0 });
    assert_eq!(reputation(&pool, alice.id).await, 0);
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_no_self_vote_on_annotation(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let annotation_id = annotation(&engine, &alice).await;

    let err = engine
        .upvote_annotation(alice.id, annotation_id)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
    assert_eq!(reputation(&pool, alice.id).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_no_vote_on_inactive_annotation(pool: PgPool) {
    let engine = Engine::with_defaults(pool.clone());
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let annotation_id = annotation(&engine, &alice).await;
    AnnotationRepo::set_active(&pool, annotation_id, false)
        .await
        .unwrap();

    let err = engine
        .upvote_annotation(bob.id, annotation_id)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
}
