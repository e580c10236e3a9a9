use bookclub::db;
use bookclub::domain::{Actor, DomainError, Pagination, ReadingStatus, Role};
use bookclub::services::account_service::{self, RegisterInput};
use bookclub::services::admin_service;
use bookclub::services::author_service;
use bookclub::services::book_service::{self, BookInput};
use bookclub::services::group_service::{self, GroupInput};
use bookclub::services::reading_list_service::{self, UserBookInput, UserBookUpdate};
use bookclub::services::review_service::{self, ReviewInput, ReviewUpdate};
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_user(db: &DatabaseConnection, name: &str, role: Role) -> Actor {
    let user = account_service::create_account(
        db,
        RegisterInput {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "password123".to_string(),
        },
        role,
    )
    .await
    .expect("Failed to create user");
    Actor::new(user.id, role)
}

async fn create_book(db: &DatabaseConnection, title: &str, isbn: &str, author: &str) -> i32 {
    book_service::create_book(
        db,
        BookInput {
            title: title.to_string(),
            isbn: Some(isbn.to_string()),
            author_names: vec![author.to_string()],
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create book")
    .id
}

#[tokio::test]
async fn test_create_book_links_and_reuses_authors() {
    let db = setup_test_db().await;
    let first = create_book(&db, "Foundation", "9780553293357", "Isaac Asimov").await;
    let second = create_book(&db, "I, Robot", "9780553382563", "Isaac Asimov").await;

    let book = book_service::get_book(&db, first).await.unwrap();
    assert_eq!(book.authors.len(), 1);
    let author_id = book.authors[0].id;
    assert_eq!(
        book_service::get_book(&db, second).await.unwrap().authors[0].id,
        author_id
    );

    let stats = author_service::author_statistics(&db, author_id).await.unwrap();
    assert_eq!(stats.total_books, 2);

    // Same ISBN returns the existing record instead of a duplicate.
    let again = create_book(&db, "Foundation (reprint)", "9780553293357", "Isaac Asimov").await;
    assert_eq!(again, first);
    assert_eq!(book_service::count_books(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_review_syncs_reading_list_rating() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let book = create_book(&db, "Dune", "9780441172719", "Frank Herbert").await;

    review_service::create_review(
        &db,
        alice.id,
        ReviewInput {
            book_id: book,
            rating: 4.0,
            review_text: Some("Spice!".to_string()),
        },
    )
    .await
    .unwrap();

    let list = reading_list_service::list_user_books(&db, alice.id, None)
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].book.id, book);
    assert_eq!(list[0].status, "want_to_read");
    assert_eq!(list[0].progress, 0);
    assert_eq!(list[0].rating, Some(4.0));

    let stats = book_service::book_statistics(&db, book).await.unwrap();
    assert_eq!(stats.total_reviews, 1);
    assert_eq!(stats.average_rating, Some(4.0));
    assert_eq!(stats.total_readers, 1);
}

#[tokio::test]
async fn test_reviews_are_owner_scoped() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let bob = create_user(&db, "Bob", Role::User).await;
    let book = create_book(&db, "Dune", "9780441172719", "Frank Herbert").await;

    let review = review_service::create_review(
        &db,
        alice.id,
        ReviewInput {
            book_id: book,
            rating: 3.5,
            review_text: None,
        },
    )
    .await
    .unwrap();

    let update = ReviewUpdate {
        rating: Some(1.0),
        ..Default::default()
    };
    let by_bob = review_service::update_review(&db, &bob, review.id, update.clone()).await;
    assert!(matches!(by_bob, Err(DomainError::NotFound(_))));
    let delete_by_bob = review_service::delete_review(&db, &bob, review.id).await;
    assert!(matches!(delete_by_bob, Err(DomainError::NotFound(_))));

    let updated = review_service::update_review(&db, &alice, review.id, update)
        .await
        .unwrap();
    assert_eq!(updated.rating, 1.0);

    let out_of_range = review_service::create_review(
        &db,
        alice.id,
        ReviewInput {
            book_id: book,
            rating: 7.0,
            review_text: None,
        },
    )
    .await;
    assert!(matches!(out_of_range, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_reading_list_lifecycle() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let book = create_book(&db, "Emma", "9780141439587", "Jane Austen").await;

    let entry = reading_list_service::add_user_book(
        &db,
        alice.id,
        UserBookInput {
            book_id: book,
            status: ReadingStatus::Reading,
            progress: 10,
            rating: None,
        },
    )
    .await
    .unwrap();
    assert!(entry.started_at.is_some());
    assert!(entry.completed_at.is_none());

    let duplicate = reading_list_service::add_user_book(
        &db,
        alice.id,
        UserBookInput {
            book_id: book,
            status: ReadingStatus::WantToRead,
            progress: 0,
            rating: None,
        },
    )
    .await;
    match duplicate {
        Err(DomainError::Conflict(msg)) => assert_eq!(msg, reading_list_service::ALREADY_IN_LIST),
        other => panic!("expected conflict, got {:?}", other),
    }

    let finished = reading_list_service::update_user_book(
        &db,
        alice.id,
        entry.id,
        UserBookUpdate {
            status: Some(ReadingStatus::Completed),
            progress: Some(100),
            rating: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(finished.status, "completed");
    assert!(finished.completed_at.is_some());

    let completed = reading_list_service::list_user_books(&db, alice.id, Some("completed"))
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);

    let bad_progress = reading_list_service::update_user_book(
        &db,
        alice.id,
        entry.id,
        UserBookUpdate {
            progress: Some(101),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_progress, Err(DomainError::Validation(_))));

    reading_list_service::remove_user_book(&db, alice.id, entry.id)
        .await
        .unwrap();
    assert!(
        reading_list_service::list_user_books(&db, alice.id, None)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_author_follow_counter() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let book = create_book(&db, "Kindred", "9780807083697", "Octavia Butler").await;
    let author_id = book_service::get_book(&db, book).await.unwrap().authors[0].id;

    let followed = author_service::follow_author(&db, alice.id, author_id)
        .await
        .unwrap();
    assert_eq!(followed.followers_count, 1);

    let twice = author_service::follow_author(&db, alice.id, author_id).await;
    assert!(matches!(twice, Err(DomainError::Conflict(_))));

    let unfollowed = author_service::unfollow_author(&db, alice.id, author_id)
        .await
        .unwrap();
    assert_eq!(unfollowed.followers_count, 0);

    let not_following = author_service::unfollow_author(&db, alice.id, author_id).await;
    assert!(matches!(not_following, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_popular_books_ranked_by_readers() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let bob = create_user(&db, "Bob", Role::User).await;
    let quiet = create_book(&db, "Quiet Book", "1111111111", "Someone").await;
    let loud = create_book(&db, "Loud Book", "2222222222", "Someone Else").await;

    for user in [alice.id, bob.id] {
        reading_list_service::add_user_book(
            &db,
            user,
            UserBookInput {
                book_id: loud,
                status: ReadingStatus::WantToRead,
                progress: 0,
                rating: None,
            },
        )
        .await
        .unwrap();
    }

    let ranked = book_service::popular_books(&db, Pagination::default())
        .await
        .unwrap();
    let ids: Vec<i32> = ranked.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![loud, quiet]);
}

#[tokio::test]
async fn test_admin_delete_user_releases_memberships_and_follows() {
    let db = setup_test_db().await;
    let admin = create_user(&db, "Admin", Role::Admin).await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let bob = create_user(&db, "Bob", Role::User).await;

    let group = group_service::create_group(
        &db,
        alice.id,
        GroupInput {
            name: "Sunday Readers".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .id;
    group_service::join_group(&db, bob.id, group).await.unwrap();

    let book = create_book(&db, "Beloved", "9781400033416", "Toni Morrison").await;
    let author_id = book_service::get_book(&db, book).await.unwrap().authors[0].id;
    author_service::follow_author(&db, bob.id, author_id)
        .await
        .unwrap();

    let own = admin_service::delete_user(&db, &admin, admin.id).await;
    assert!(matches!(own, Err(DomainError::Forbidden(_))));

    admin_service::delete_user(&db, &admin, bob.id).await.unwrap();

    assert_eq!(
        group_service::get_group(&db, group).await.unwrap().members_count,
        1
    );
    assert_eq!(
        author_service::get_author(&db, author_id)
            .await
            .unwrap()
            .followers_count,
        0
    );
    let missing = admin_service::get_user(&db, bob.id).await;
    assert!(matches!(missing, Err(DomainError::NotFound(_))));
}
