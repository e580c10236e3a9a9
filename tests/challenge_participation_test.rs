use bookclub::db;
use bookclub::domain::{DomainError, Role};
use bookclub::services::account_service::{self, RegisterInput};
use bookclub::services::challenge_service::{self, ChallengeInput};
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_user(db: &DatabaseConnection, name: &str) -> i32 {
    account_service::create_account(
        db,
        RegisterInput {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "password123".to_string(),
        },
        Role::User,
    )
    .await
    .expect("Failed to create user")
    .id
}

async fn create_challenge(db: &DatabaseConnection, target_books: i32) -> i32 {
    let now = Utc::now();
    challenge_service::create_challenge(
        db,
        ChallengeInput {
            title: "Winter reading".to_string(),
            description: None,
            cover_url: None,
            target_books,
            start_date: now,
            end_date: now + Duration::days(90),
            xp_reward: 100,
            badge: None,
            tags: None,
        },
    )
    .await
    .expect("Failed to create challenge")
    .id
}

#[tokio::test]
async fn test_join_starts_at_zero_and_rejects_duplicates() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;
    let challenge = create_challenge(&db, 3).await;

    let joined = challenge_service::join_challenge(&db, user, challenge)
        .await
        .unwrap();
    assert_eq!(joined.progress, 0);
    assert!(!joined.completed);
    assert_eq!(joined.challenge.id, challenge);

    let again = challenge_service::join_challenge(&db, user, challenge).await;
    match again {
        Err(DomainError::Conflict(msg)) => {
            assert_eq!(msg, challenge_service::ALREADY_PARTICIPATING)
        }
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_join_unknown_challenge_is_not_found() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;

    let result = challenge_service::join_challenge(&db, user, 999).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_completed_flag_is_sticky() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;
    let challenge = create_challenge(&db, 3).await;
    challenge_service::join_challenge(&db, user, challenge)
        .await
        .unwrap();

    let below = challenge_service::update_progress(&db, user, challenge, 2)
        .await
        .unwrap();
    assert!(!below.completed);

    let reached = challenge_service::update_progress(&db, user, challenge, 3)
        .await
        .unwrap();
    assert!(reached.completed);

    let lowered = challenge_service::update_progress(&db, user, challenge, 1)
        .await
        .unwrap();
    assert_eq!(lowered.progress, 1);
    assert!(lowered.completed, "completion must survive lowered progress");

    let mine = challenge_service::list_user_challenges(&db, user)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].progress, 1);
    assert!(mine[0].completed);
}

#[tokio::test]
async fn test_progress_above_target_is_stored() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;
    let challenge = create_challenge(&db, 2).await;
    challenge_service::join_challenge(&db, user, challenge)
        .await
        .unwrap();

    let over = challenge_service::update_progress(&db, user, challenge, 7)
        .await
        .unwrap();
    assert_eq!(over.progress, 7);
    assert!(over.completed);
}

#[tokio::test]
async fn test_progress_requires_participation() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;
    let challenge = create_challenge(&db, 3).await;

    let result = challenge_service::update_progress(&db, user, challenge, 1).await;
    match result {
        Err(DomainError::Conflict(msg)) => assert_eq!(msg, challenge_service::NOT_PARTICIPATING),
        other => panic!("expected conflict, got {:?}", other),
    }

    let missing = challenge_service::update_progress(&db, user, 404, 1).await;
    assert!(matches!(missing, Err(DomainError::NotFound(_))));

    let negative = challenge_service::update_progress(&db, user, challenge, -1).await;
    assert!(matches!(negative, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_leave_then_rejoin_resets_progress() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;
    let challenge = create_challenge(&db, 3).await;
    challenge_service::join_challenge(&db, user, challenge)
        .await
        .unwrap();
    challenge_service::update_progress(&db, user, challenge, 3)
        .await
        .unwrap();

    challenge_service::leave_challenge(&db, user, challenge)
        .await
        .unwrap();
    assert!(
        challenge_service::list_user_challenges(&db, user)
            .await
            .unwrap()
            .is_empty()
    );

    let second_leave = challenge_service::leave_challenge(&db, user, challenge).await;
    assert!(matches!(second_leave, Err(DomainError::Conflict(_))));

    let rejoined = challenge_service::join_challenge(&db, user, challenge)
        .await
        .unwrap();
    assert_eq!(rejoined.progress, 0);
    assert!(!rejoined.completed);
}

#[tokio::test]
async fn test_statistics_over_participants() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice").await;
    let bob = create_user(&db, "Bob").await;
    let challenge = create_challenge(&db, 3).await;

    let empty = challenge_service::challenge_statistics(&db, challenge)
        .await
        .unwrap();
    assert_eq!(empty.total_participants, 0);
    assert_eq!(empty.completed_count, 0);
    assert_eq!(empty.average_progress, 0.0);

    challenge_service::join_challenge(&db, alice, challenge)
        .await
        .unwrap();
    challenge_service::join_challenge(&db, bob, challenge)
        .await
        .unwrap();
    challenge_service::update_progress(&db, alice, challenge, 4)
        .await
        .unwrap();
    challenge_service::update_progress(&db, bob, challenge, 1)
        .await
        .unwrap();

    let stats = challenge_service::challenge_statistics(&db, challenge)
        .await
        .unwrap();
    assert_eq!(stats.total_participants, 2);
    assert_eq!(stats.completed_count, 1);
    assert!((stats.average_progress - 2.5).abs() < f64::EPSILON);

    let missing = challenge_service::challenge_statistics(&db, 999).await;
    assert!(matches!(missing, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_challenge_clears_participations() {
    let db = setup_test_db().await;
    let user = create_user(&db, "Alice").await;
    let challenge = create_challenge(&db, 3).await;
    challenge_service::join_challenge(&db, user, challenge)
        .await
        .unwrap();

    challenge_service::delete_challenge(&db, challenge)
        .await
        .unwrap();

    assert!(
        challenge_service::list_user_challenges(&db, user)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(challenge_service::count_challenges(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_challenge_input_is_rejected() {
    let db = setup_test_db().await;
    let now = Utc::now();
    let input = ChallengeInput {
        title: "Backwards".to_string(),
        description: None,
        cover_url: None,
        target_books: 1,
        start_date: now,
        end_date: now - Duration::days(1),
        xp_reward: 0,
        badge: None,
        tags: None,
    };

    let result = challenge_service::create_challenge(&db, input.clone()).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let zero_target = ChallengeInput {
        target_books: 0,
        end_date: now,
        ..input
    };
    let result = challenge_service::create_challenge(&db, zero_target).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_completed_and_idle_participants() {
    let db = setup_test_db().await;
    let bob = create_user(&db, "Bob").await;
    let carol = create_user(&db, "Carol").await;
    let challenge = create_challenge(&db, 5).await;

    challenge_service::join_challenge(&db, bob, challenge)
        .await
        .unwrap();
    let done = challenge_service::update_progress(&db, bob, challenge, 5)
        .await
        .unwrap();
    assert!(done.completed);
    challenge_service::join_challenge(&db, carol, challenge)
        .await
        .unwrap();

    let stats = challenge_service::challenge_statistics(&db, challenge)
        .await
        .unwrap();
    assert_eq!(stats.total_participants, 2);
    assert_eq!(stats.completed_count, 1);
    assert!((stats.average_progress - 2.5).abs() < f64::EPSILON);
}
