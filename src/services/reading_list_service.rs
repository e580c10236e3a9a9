//! Reading List Service - a user's shelf of books with status and progress
//!
//! Rows are always looked up scoped to their owner, so another user's entry
//! reads as "not found".
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use std::str::FromStr;

use sea_orm::*;
use serde::Deserialize;

use crate::domain::values::{validate_percent, validate_rating};
use crate::domain::{DomainError, ReadingStatus};
use crate::models::user_book::{self, Entity as UserBook, UserBookDto};
use crate::services::book_service::{book_dto, find_book};

pub const ALREADY_IN_LIST: &str = "Book already in your list";
pub const NOT_IN_LIST: &str = "Book not found in your list";

#[derive(Debug, Clone, Deserialize)]
pub struct UserBookInput {
    pub book_id: i32,
    #[serde(default)]
    pub status: ReadingStatus,
    #[serde(default)]
    pub progress: i32,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserBookUpdate {
    pub status: Option<ReadingStatus>,
    pub progress: Option<i32>,
    pub rating: Option<f64>,
}

async fn to_dto<C: ConnectionTrait>(conn: &C, model: user_book::Model) -> Result<UserBookDto, DomainError> {
    let book = find_book(conn, model.book_id).await?;
    Ok(UserBookDto::new(model, book_dto(conn, book).await?))
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    user_book_id: i32,
) -> Result<user_book::Model, DomainError> {
    UserBook::find_by_id(user_book_id)
        .filter(user_book::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::NotFound(NOT_IN_LIST.to_string()))
}

pub(crate) async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    book_id: i32,
) -> Result<Option<user_book::Model>, DbErr> {
    UserBook::find()
        .filter(user_book::Column::UserId.eq(user_id))
        .filter(user_book::Column::BookId.eq(book_id))
        .one(conn)
        .await
}

pub async fn list_user_books(
    db: &DatabaseConnection,
    user_id: i32,
    status: Option<&str>,
) -> Result<Vec<UserBookDto>, DomainError> {
    let mut query = UserBook::find().filter(user_book::Column::UserId.eq(user_id));
    if let Some(raw) = status
        && !raw.is_empty()
    {
        let status = ReadingStatus::from_str(raw)?;
        query = query.filter(user_book::Column::Status.eq(status.as_str()));
    }

    let rows = query.order_by_asc(user_book::Column::Id).all(db).await?;
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        result.push(to_dto(db, row).await?);
    }
    Ok(result)
}

pub async fn add_user_book(
    db: &DatabaseConnection,
    user_id: i32,
    input: UserBookInput,
) -> Result<UserBookDto, DomainError> {
    validate_percent(input.progress)?;
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    let txn = db.begin().await?;

    find_book(&txn, input.book_id).await?;
    if find_entry(&txn, user_id, input.book_id).await?.is_some() {
        return Err(DomainError::Conflict(ALREADY_IN_LIST.to_string()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let started_at = (input.status == ReadingStatus::Reading).then(|| now.clone());
    let completed_at = (input.status == ReadingStatus::Completed).then(|| now.clone());
    let model = user_book::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(input.book_id),
        status: Set(input.status.as_str().to_string()),
        progress: Set(input.progress),
        rating: Set(input.rating),
        started_at: Set(started_at),
        completed_at: Set(completed_at),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let dto = to_dto(&txn, model).await?;
    txn.commit().await?;
    tracing::info!("User {} added book {} to their list", user_id, input.book_id);
    Ok(dto)
}

pub async fn update_user_book(
    db: &DatabaseConnection,
    user_id: i32,
    user_book_id: i32,
    update: UserBookUpdate,
) -> Result<UserBookDto, DomainError> {
    if let Some(progress) = update.progress {
        validate_percent(progress)?;
    }
    if let Some(rating) = update.rating {
        validate_rating(rating)?;
    }

    let txn = db.begin().await?;

    let existing = find_owned(&txn, user_id, user_book_id).await?;
    let now = chrono::Utc::now().to_rfc3339();
    let needs_start = existing.started_at.is_none();
    let needs_completion = existing.completed_at.is_none();

    let mut active: user_book::ActiveModel = existing.into();
    if let Some(status) = update.status {
        active.status = Set(status.as_str().to_string());
        // Stamps are set on the first transition only.
        if status == ReadingStatus::Reading && needs_start {
            active.started_at = Set(Some(now.clone()));
        }
        if status == ReadingStatus::Completed && needs_completion {
            active.completed_at = Set(Some(now.clone()));
        }
    }
    if let Some(progress) = update.progress {
        active.progress = Set(progress);
    }
    if let Some(rating) = update.rating {
        active.rating = Set(Some(rating));
    }
    active.updated_at = Set(Some(now));
    let model = active.update(&txn).await?;

    let dto = to_dto(&txn, model).await?;
    txn.commit().await?;
    Ok(dto)
}

pub async fn remove_user_book(
    db: &DatabaseConnection,
    user_id: i32,
    user_book_id: i32,
) -> Result<(), DomainError> {
    let existing = find_owned(db, user_id, user_book_id).await?;
    existing.delete(db).await?;
    tracing::info!("User {} removed entry {} from their list", user_id, user_book_id);
    Ok(())
}

pub async fn count_user_books(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(UserBook::find().count(db).await?)
}
