//! Author Service - authors, followers and author notifications
//!
//! `followers_count` is denormalized and moves together with the
//! `user_author_follow` rows.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Pagination};
use crate::models::author::{self, Entity as Author};
use crate::models::author_notification::{self, Entity as Notification};
use crate::models::book::{self, BookDto, Entity as Book};
use crate::models::user_author_follow::{self, Entity as AuthorFollow};
use crate::services::book_service::{book_dtos, find_book};

pub const ALREADY_FOLLOWING: &str = "Already following this author";
pub const NOT_FOLLOWING: &str = "Not following this author";
pub const DEFAULT_NOTIFICATION_TYPE: &str = "new_book";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorInput {
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStatistics {
    pub total_books: u64,
    pub total_followers: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationInput {
    pub title: String,
    pub content: String,
    pub notification_type: Option<String>,
    pub book_id: Option<i32>,
    pub cover_url: Option<String>,
}

async fn find_author<C: ConnectionTrait>(
    conn: &C,
    author_id: i32,
) -> Result<author::Model, DomainError> {
    Author::find_by_id(author_id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Author"))
}

async fn set_followers_count<C: ConnectionTrait>(
    conn: &C,
    author: author::Model,
    delta: i32,
) -> Result<author::Model, DbErr> {
    let next = (author.followers_count + delta).max(0);
    let mut active: author::ActiveModel = author.into();
    active.followers_count = Set(next);
    active.update(conn).await
}

pub async fn list_authors(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: Pagination,
) -> Result<Vec<author::Model>, DomainError> {
    let mut query = Author::find();
    if let Some(term) = search
        && !term.is_empty()
    {
        query = query.filter(author::Column::Name.contains(term));
    }
    Ok(query
        .order_by_asc(author::Column::Name)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?)
}

pub async fn get_author(db: &DatabaseConnection, author_id: i32) -> Result<author::Model, DomainError> {
    find_author(db, author_id).await
}

/// Create an author, or return the existing one with the same name.
pub async fn create_author(
    db: &DatabaseConnection,
    input: AuthorInput,
) -> Result<author::Model, DomainError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("Author name is required".to_string()));
    }

    if let Some(existing) = Author::find()
        .filter(author::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let model = author::ActiveModel {
        name: Set(name.to_string()),
        bio: Set(input.bio),
        avatar_url: Set(input.avatar_url),
        followers_count: Set(0),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Author {} created: {}", model.id, model.name);
    Ok(model)
}

pub async fn follow_author(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<author::Model, DomainError> {
    let txn = db.begin().await?;

    let author = find_author(&txn, author_id).await?;
    if AuthorFollow::find_by_id((user_id, author_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict(ALREADY_FOLLOWING.to_string()));
    }

    let follow = user_author_follow::ActiveModel {
        user_id: Set(user_id),
        author_id: Set(author_id),
    };
    AuthorFollow::insert(follow)
        .exec_without_returning(&txn)
        .await
        .map_err(|e| DomainError::conflict_on_duplicate(e, ALREADY_FOLLOWING))?;
    let author = set_followers_count(&txn, author, 1).await?;

    txn.commit().await?;
    tracing::info!("User {} follows author {}", user_id, author_id);
    Ok(author)
}

pub async fn unfollow_author(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<author::Model, DomainError> {
    let txn = db.begin().await?;

    let author = find_author(&txn, author_id).await?;
    let follow = AuthorFollow::find_by_id((user_id, author_id))
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::Conflict(NOT_FOLLOWING.to_string()))?;
    follow.delete(&txn).await?;
    let author = set_followers_count(&txn, author, -1).await?;

    txn.commit().await?;
    tracing::info!("User {} unfollowed author {}", user_id, author_id);
    Ok(author)
}

async fn followed_author_ids<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Vec<i32>, DbErr> {
    AuthorFollow::find()
        .select_only()
        .column(user_author_follow::Column::AuthorId)
        .filter(user_author_follow::Column::UserId.eq(user_id))
        .into_tuple()
        .all(conn)
        .await
}

pub async fn list_followed_authors(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<author::Model>, DomainError> {
    let ids = followed_author_ids(db, user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Author::find()
        .filter(author::Column::Id.is_in(ids))
        .order_by_asc(author::Column::Name)
        .all(db)
        .await?)
}

/// Remove every follow held by the user, keeping counters in step.
/// Runs inside the caller's transaction.
pub(crate) async fn drop_all_follows<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<(), DbErr> {
    for author_id in followed_author_ids(conn, user_id).await? {
        AuthorFollow::delete_many()
            .filter(user_author_follow::Column::UserId.eq(user_id))
            .filter(user_author_follow::Column::AuthorId.eq(author_id))
            .exec(conn)
            .await?;
        if let Some(author) = Author::find_by_id(author_id).one(conn).await? {
            set_followers_count(conn, author, -1).await?;
        }
    }
    Ok(())
}

pub async fn list_author_books(
    db: &DatabaseConnection,
    author_id: i32,
    page: Pagination,
) -> Result<Vec<BookDto>, DomainError> {
    let author = find_author(db, author_id).await?;
    let books = author
        .find_related(Book)
        .order_by_asc(book::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok(book_dtos(db, books).await?)
}

pub async fn author_statistics(
    db: &DatabaseConnection,
    author_id: i32,
) -> Result<AuthorStatistics, DomainError> {
    let author = find_author(db, author_id).await?;
    let total_books = author.find_related(Book).count(db).await?;
    Ok(AuthorStatistics {
        total_books,
        total_followers: author.followers_count,
    })
}

pub async fn create_notification(
    db: &DatabaseConnection,
    admin_id: i32,
    author_id: i32,
    input: NotificationInput,
) -> Result<author_notification::Model, DomainError> {
    if input.title.trim().is_empty() || input.content.trim().is_empty() {
        return Err(DomainError::Validation(
            "Notification title and content are required".to_string(),
        ));
    }

    find_author(db, author_id).await?;
    if let Some(book_id) = input.book_id {
        find_book(db, book_id).await?;
    }

    let model = author_notification::ActiveModel {
        author_id: Set(author_id),
        title: Set(input.title),
        content: Set(input.content),
        notification_type: Set(input
            .notification_type
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string())),
        book_id: Set(input.book_id),
        cover_url: Set(input.cover_url),
        created_by: Set(admin_id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Notification {} published for author {}", model.id, author_id);
    Ok(model)
}

/// Active notifications for one author, newest first.
pub async fn list_author_notifications(
    db: &DatabaseConnection,
    author_id: i32,
    page: Pagination,
) -> Result<Vec<author_notification::Model>, DomainError> {
    find_author(db, author_id).await?;
    Ok(Notification::find()
        .filter(author_notification::Column::AuthorId.eq(author_id))
        .filter(author_notification::Column::IsActive.eq(true))
        .order_by_desc(author_notification::Column::CreatedAt)
        .order_by_desc(author_notification::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?)
}

/// Active notifications from every author the user follows, newest first.
pub async fn list_user_notifications(
    db: &DatabaseConnection,
    user_id: i32,
    page: Pagination,
) -> Result<Vec<author_notification::Model>, DomainError> {
    let ids = followed_author_ids(db, user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Notification::find()
        .filter(author_notification::Column::AuthorId.is_in(ids))
        .filter(author_notification::Column::IsActive.eq(true))
        .order_by_desc(author_notification::Column::CreatedAt)
        .order_by_desc(author_notification::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?)
}
