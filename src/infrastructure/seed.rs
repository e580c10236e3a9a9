//! Demo data for a fresh database (enabled with `SEED_DEMO`).

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::domain::{DomainError, Role};
use crate::models::user;
use crate::services::account_service::{self, RegisterInput};
use crate::services::book_service::{self, BookInput};
use crate::services::challenge_service::{self, ChallengeInput};
use crate::services::group_service::{self, GroupInput};

const DEMO_BOOKS: &[(&str, &str, &str)] = &[
    ("The Hobbit", "9780547928227", "J.R.R. Tolkien"),
    ("Foundation", "9780553293357", "Isaac Asimov"),
    ("Dune", "9780441172719", "Frank Herbert"),
];

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    if user::Entity::find().count(db).await? > 0 {
        tracing::info!("Users already present, skipping demo data");
        return Ok(());
    }

    let admin = account_service::create_account(
        db,
        RegisterInput {
            name: "Admin".to_string(),
            email: "admin@bookclub.local".to_string(),
            password: "admin123".to_string(),
        },
        Role::Admin,
    )
    .await?;
    let reader = account_service::create_account(
        db,
        RegisterInput {
            name: "Reader".to_string(),
            email: "reader@bookclub.local".to_string(),
            password: "reader123".to_string(),
        },
        Role::User,
    )
    .await?;

    let mut first_book = None;
    for (title, isbn, author) in DEMO_BOOKS {
        let book = book_service::create_book(
            db,
            BookInput {
                title: title.to_string(),
                isbn: Some(isbn.to_string()),
                author_names: vec![author.to_string()],
                ..Default::default()
            },
        )
        .await?;
        first_book.get_or_insert(book.id);
    }

    let group = group_service::create_group(
        db,
        admin.id,
        GroupInput {
            name: "Classic Sci-Fi Circle".to_string(),
            description: Some("Monthly reads from the golden age".to_string()),
            topic: Some("Science fiction".to_string()),
            cover_url: None,
            current_book_id: first_book,
        },
    )
    .await?;
    group_service::join_group(db, reader.id, group.id).await?;

    let now = Utc::now();
    let challenge = challenge_service::create_challenge(
        db,
        ChallengeInput {
            title: "Read 12 books this year".to_string(),
            description: Some("One book a month".to_string()),
            cover_url: None,
            target_books: 12,
            start_date: now,
            end_date: now + Duration::days(365),
            xp_reward: 500,
            badge: Some("bookworm".to_string()),
            tags: Some("yearly".to_string()),
        },
    )
    .await?;
    challenge_service::join_challenge(db, reader.id, challenge.id).await?;

    tracing::info!(
        "Seeded {} books, group {} and challenge {}",
        DEMO_BOOKS.len(),
        group.id,
        challenge.id
    );
    Ok(())
}
