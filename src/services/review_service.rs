//! Review Service
//!
//! Writing a review also records its rating on the reviewer's reading-list
//! entry for the book, creating the entry when there is none.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::*;
use serde::Deserialize;

use crate::domain::values::validate_rating;
use crate::domain::{Actor, DomainError, Pagination, ReadingStatus};
use crate::models::review::{self, Entity as Review};
use crate::models::user_book;
use crate::services::book_service::find_book;
use crate::services::reading_list_service::find_entry;

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub book_id: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub book_id: i32,
    pub rating: f64,
    pub review_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<f64>,
    pub review_text: Option<String>,
}

/// Record `rating` on the user's entry for the book, creating the entry
/// (want_to_read, progress 0) if the book is not on their list yet.
async fn sync_reading_list_rating<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    book_id: i32,
    rating: f64,
) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();
    match find_entry(conn, user_id, book_id).await? {
        Some(entry) => {
            let mut active: user_book::ActiveModel = entry.into();
            active.rating = Set(Some(rating));
            active.updated_at = Set(Some(now));
            active.update(conn).await?;
        }
        None => {
            user_book::ActiveModel {
                user_id: Set(user_id),
                book_id: Set(book_id),
                status: Set(ReadingStatus::WantToRead.as_str().to_string()),
                progress: Set(0),
                rating: Set(Some(rating)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

/// Load a review for its author. Other users' reviews read as not found.
async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    review_id: i32,
) -> Result<review::Model, DomainError> {
    Review::find_by_id(review_id)
        .filter(review::Column::UserId.eq(actor.id))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Review"))
}

pub async fn list_reviews(
    db: &DatabaseConnection,
    filter: ReviewFilter,
    page: Pagination,
) -> Result<Vec<review::Model>, DomainError> {
    let mut query = Review::find();
    if let Some(book_id) = filter.book_id {
        query = query.filter(review::Column::BookId.eq(book_id));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(review::Column::UserId.eq(user_id));
    }

    Ok(query
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?)
}

pub async fn list_book_reviews(
    db: &DatabaseConnection,
    book_id: i32,
    page: Pagination,
) -> Result<Vec<review::Model>, DomainError> {
    find_book(db, book_id).await?;
    list_reviews(
        db,
        ReviewFilter {
            book_id: Some(book_id),
            user_id: None,
        },
        page,
    )
    .await
}

pub async fn get_review(db: &DatabaseConnection, review_id: i32) -> Result<review::Model, DomainError> {
    Review::find_by_id(review_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Review"))
}

pub async fn create_review(
    db: &DatabaseConnection,
    user_id: i32,
    input: ReviewInput,
) -> Result<review::Model, DomainError> {
    validate_rating(input.rating)?;

    let txn = db.begin().await?;

    find_book(&txn, input.book_id).await?;
    let review = review::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(input.book_id),
        rating: Set(input.rating),
        review_text: Set(input.review_text),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    sync_reading_list_rating(&txn, user_id, input.book_id, input.rating).await?;

    txn.commit().await?;
    tracing::info!("User {} reviewed book {} ({})", user_id, review.book_id, review.rating);
    Ok(review)
}

pub async fn update_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: i32,
    update: ReviewUpdate,
) -> Result<review::Model, DomainError> {
    if let Some(rating) = update.rating {
        validate_rating(rating)?;
    }

    let txn = db.begin().await?;

    let existing = find_owned(&txn, actor, review_id).await?;
    let book_id = existing.book_id;
    let mut active: review::ActiveModel = existing.into();
    if let Some(rating) = update.rating {
        active.rating = Set(rating);
    }
    if let Some(text) = update.review_text {
        active.review_text = Set(Some(text));
    }
    active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
    let review = active.update(&txn).await?;

    if let Some(rating) = update.rating {
        sync_reading_list_rating(&txn, actor.id, book_id, rating).await?;
    }

    txn.commit().await?;
    Ok(review)
}

pub async fn delete_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: i32,
) -> Result<(), DomainError> {
    let existing = find_owned(db, actor, review_id).await?;
    existing.delete(db).await?;
    tracing::info!("Review {} deleted by its author", review_id);
    Ok(())
}

/// Admin removal, not scoped to an owner.
pub async fn remove_review(db: &DatabaseConnection, review_id: i32) -> Result<(), DomainError> {
    let result = Review::delete_by_id(review_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Review"));
    }
    tracing::info!("Review {} removed by an admin", review_id);
    Ok(())
}

pub async fn count_reviews(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(Review::find().count(db).await?)
}
