use bookclub::auth::{create_jwt, decode_jwt, hash_password, verify_password};
use bookclub::db;
use bookclub::domain::{Actor, DomainError, Role};
use bookclub::services::account_service::{self, PasswordChange, RegisterInput};
use bookclub::services::admin_service::{self, AdminUserUpdate};
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn register_input(name: &str) -> RegisterInput {
    RegisterInput {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password: "password123".to_string(),
    }
}

#[tokio::test]
async fn test_password_hashing() {
    let hash = hash_password("correct horse").unwrap();
    assert_ne!(hash, "correct horse");
    assert!(verify_password("correct horse", &hash).unwrap());
    assert!(!verify_password("battery staple", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let db = setup_test_db().await;
    let user = account_service::register(&db, register_input("Alice"))
        .await
        .unwrap();

    let token = create_jwt(&user, "secret-a", 30).unwrap();
    let claims = decode_jwt(&token, "secret-a").unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.role, "user");

    assert!(decode_jwt(&token, "secret-b").is_err());

    let expired = create_jwt(&user, "secret-a", -120).unwrap();
    assert!(decode_jwt(&expired, "secret-a").is_err());
}

#[tokio::test]
async fn test_register_normalizes_and_rejects_duplicate_email() {
    let db = setup_test_db().await;
    let user = account_service::register(
        &db,
        RegisterInput {
            email: "  Alice@Example.COM ".to_string(),
            ..register_input("Alice")
        },
    )
    .await
    .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, "user");

    let duplicate = account_service::register(&db, register_input("Alice")).await;
    match duplicate {
        Err(DomainError::Conflict(msg)) => assert_eq!(msg, account_service::EMAIL_TAKEN),
        other => panic!("expected conflict, got {:?}", other),
    }

    let short = account_service::register(
        &db,
        RegisterInput {
            password: "123".to_string(),
            ..register_input("Bob")
        },
    )
    .await;
    assert!(matches!(short, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_login_failures() {
    let db = setup_test_db().await;
    account_service::register(&db, register_input("Alice"))
        .await
        .unwrap();

    let wrong = account_service::authenticate(&db, "alice@example.com", "nope").await;
    assert!(matches!(wrong, Err(DomainError::Unauthenticated(_))));
    let unknown = account_service::authenticate(&db, "ghost@example.com", "password123").await;
    assert_eq!(wrong.unwrap_err(), unknown.unwrap_err());

    let ok = account_service::authenticate(&db, "ALICE@example.com", "password123").await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let db = setup_test_db().await;
    let admin = account_service::create_account(&db, register_input("Admin"), Role::Admin)
        .await
        .unwrap();
    let alice = account_service::register(&db, register_input("Alice"))
        .await
        .unwrap();

    admin_service::update_user(
        &db,
        &Actor::new(admin.id, Role::Admin),
        alice.id,
        AdminUserUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let result = account_service::authenticate(&db, "alice@example.com", "password123").await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_cannot_demote_or_deactivate_self() {
    let db = setup_test_db().await;
    let admin = account_service::create_account(&db, register_input("Admin"), Role::Admin)
        .await
        .unwrap();
    let actor = Actor::new(admin.id, Role::Admin);

    let demote = admin_service::update_user(
        &db,
        &actor,
        admin.id,
        AdminUserUpdate {
            role: Some("user".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(demote, Err(DomainError::Forbidden(_))));

    let deactivate = admin_service::update_user(
        &db,
        &actor,
        admin.id,
        AdminUserUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(deactivate, Err(DomainError::Forbidden(_))));

    let rename = admin_service::update_user(
        &db,
        &actor,
        admin.id,
        AdminUserUpdate {
            name: Some("Head Librarian".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(rename.name, "Head Librarian");
}

#[tokio::test]
async fn test_change_password() {
    let db = setup_test_db().await;
    let user = account_service::register(&db, register_input("Alice"))
        .await
        .unwrap();

    let wrong = account_service::change_password(
        &db,
        user.clone(),
        PasswordChange {
            current_password: "not-it".to_string(),
            new_password: "brand-new-pass".to_string(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(DomainError::Validation(_))));

    account_service::change_password(
        &db,
        user,
        PasswordChange {
            current_password: "password123".to_string(),
            new_password: "brand-new-pass".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(
        account_service::authenticate(&db, "alice@example.com", "brand-new-pass")
            .await
            .is_ok()
    );
    assert!(
        account_service::authenticate(&db, "alice@example.com", "password123")
            .await
            .is_err()
    );
}
