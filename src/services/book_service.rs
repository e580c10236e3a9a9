//! Book Service - catalog, statistics and book follows
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use std::collections::HashMap;

use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Pagination};
use crate::models::author::{self, Entity as Author};
use crate::models::book::{self, BookDto, Entity as Book};
use crate::models::book_authors::{self, Entity as BookAuthor};
use crate::models::review::{self, Entity as Review};
use crate::models::user_book::{self, Entity as UserBook};
use crate::models::user_book_follow::{self, Entity as UserBookFollow};

pub const ALREADY_FOLLOWING_BOOK: &str = "Already following this book";
pub const NOT_FOLLOWING_BOOK: &str = "Not following this book";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub file_url: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    pub google_books_id: Option<String>,
    #[serde(default)]
    pub author_names: Vec<String>,
}

/// Partial update; `author_names`, when present, replaces the author set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub file_url: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    pub author_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookStatistics {
    pub total_reviews: u64,
    pub average_rating: Option<f64>,
    pub total_readers: u64,
}

pub(crate) async fn find_book<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<book::Model, DomainError> {
    Book::find_by_id(book_id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))
}

/// Attach the author list to a book row.
pub async fn book_dto<C: ConnectionTrait>(conn: &C, model: book::Model) -> Result<BookDto, DbErr> {
    let authors = model
        .find_related(Author)
        .order_by_asc(author::Column::Name)
        .all(conn)
        .await?;
    Ok(BookDto::new(model, authors))
}

pub async fn book_dtos<C: ConnectionTrait>(
    conn: &C,
    models: Vec<book::Model>,
) -> Result<Vec<BookDto>, DbErr> {
    let mut dtos = Vec::with_capacity(models.len());
    for model in models {
        dtos.push(book_dto(conn, model).await?);
    }
    Ok(dtos)
}

/// Find each named author, creating the ones that do not exist yet.
pub(crate) async fn resolve_authors<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> Result<Vec<author::Model>, DbErr> {
    let mut authors: Vec<author::Model> = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if authors.iter().any(|a| a.name == name) {
            continue;
        }
        let existing = Author::find()
            .filter(author::Column::Name.eq(name))
            .one(conn)
            .await?;
        let author = match existing {
            Some(author) => author,
            None => {
                author::ActiveModel {
                    name: Set(name.to_string()),
                    followers_count: Set(0),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                    ..Default::default()
                }
                .insert(conn)
                .await?
            }
        };
        authors.push(author);
    }
    Ok(authors)
}

async fn link_authors<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    authors: &[author::Model],
) -> Result<(), DbErr> {
    for author in authors {
        let link = book_authors::ActiveModel {
            book_id: Set(book_id),
            author_id: Set(author.id),
        };
        BookAuthor::insert(link).exec_without_returning(conn).await?;
    }
    Ok(())
}

pub async fn list_books(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: Pagination,
) -> Result<Vec<BookDto>, DomainError> {
    tracing::debug!("List books - search={:?}", search);

    let mut query = Book::find();
    if let Some(term) = search
        && !term.is_empty()
    {
        query = query.filter(
            Condition::any()
                .add(book::Column::Title.contains(term))
                .add(book::Column::Description.contains(term)),
        );
    }

    let books = query
        .order_by_asc(book::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok(book_dtos(db, books).await?)
}

pub async fn get_book(db: &DatabaseConnection, book_id: i32) -> Result<BookDto, DomainError> {
    let book = find_book(db, book_id).await?;
    Ok(book_dto(db, book).await?)
}

/// Create a book. A book whose ISBN or catalog id is already known is
/// returned as-is instead of being duplicated.
pub async fn create_book(db: &DatabaseConnection, input: BookInput) -> Result<BookDto, DomainError> {
    if input.title.trim().is_empty() {
        return Err(DomainError::Validation("Title is required".to_string()));
    }

    let txn = db.begin().await?;

    if let Some(isbn) = input.isbn.as_deref()
        && let Some(existing) = Book::find()
            .filter(book::Column::Isbn.eq(isbn))
            .one(&txn)
            .await?
    {
        return Ok(book_dto(&txn, existing).await?);
    }
    if let Some(external_id) = input.google_books_id.as_deref()
        && let Some(existing) = Book::find()
            .filter(book::Column::GoogleBooksId.eq(external_id))
            .one(&txn)
            .await?
    {
        return Ok(book_dto(&txn, existing).await?);
    }

    let model = book::ActiveModel {
        title: Set(input.title),
        isbn: Set(input.isbn),
        cover_url: Set(input.cover_url),
        file_url: Set(input.file_url),
        description: Set(input.description),
        published_date: Set(input.published_date),
        page_count: Set(input.page_count),
        google_books_id: Set(input.google_books_id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| DomainError::conflict_on_duplicate(e, "Book already exists"))?;

    let authors = resolve_authors(&txn, &input.author_names).await?;
    link_authors(&txn, model.id, &authors).await?;

    txn.commit().await?;
    tracing::info!("Book {} created: {}", model.id, model.title);
    Ok(BookDto::new(model, authors))
}

pub async fn update_book(
    db: &DatabaseConnection,
    book_id: i32,
    update: BookUpdate,
) -> Result<BookDto, DomainError> {
    let txn = db.begin().await?;

    let existing = find_book(&txn, book_id).await?;
    let mut active: book::ActiveModel = existing.into();
    if let Some(title) = update.title {
        active.title = Set(title);
    }
    if let Some(isbn) = update.isbn {
        active.isbn = Set(Some(isbn));
    }
    if let Some(cover_url) = update.cover_url {
        active.cover_url = Set(Some(cover_url));
    }
    if let Some(file_url) = update.file_url {
        active.file_url = Set(Some(file_url));
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description));
    }
    if let Some(published_date) = update.published_date {
        active.published_date = Set(Some(published_date));
    }
    if let Some(page_count) = update.page_count {
        active.page_count = Set(Some(page_count));
    }
    let model = active
        .update(&txn)
        .await
        .map_err(|e| DomainError::conflict_on_duplicate(e, "Another book already uses this ISBN"))?;

    if let Some(names) = update.author_names {
        BookAuthor::delete_many()
            .filter(book_authors::Column::BookId.eq(book_id))
            .exec(&txn)
            .await?;
        let authors = resolve_authors(&txn, &names).await?;
        link_authors(&txn, book_id, &authors).await?;
    }

    let dto = book_dto(&txn, model).await?;
    txn.commit().await?;
    tracing::info!("Book {} updated", book_id);
    Ok(dto)
}

pub async fn delete_book(db: &DatabaseConnection, book_id: i32) -> Result<(), DomainError> {
    let result = Book::delete_by_id(book_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Book"));
    }
    tracing::info!("Book {} deleted", book_id);
    Ok(())
}

pub async fn count_books(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(Book::find().count(db).await?)
}

pub async fn book_statistics(
    db: &DatabaseConnection,
    book_id: i32,
) -> Result<BookStatistics, DomainError> {
    find_book(db, book_id).await?;

    let ratings: Vec<f64> = Review::find()
        .select_only()
        .column(review::Column::Rating)
        .filter(review::Column::BookId.eq(book_id))
        .into_tuple()
        .all(db)
        .await?;
    let total_readers = UserBook::find()
        .filter(user_book::Column::BookId.eq(book_id))
        .count(db)
        .await?;

    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    Ok(BookStatistics {
        total_reviews: ratings.len() as u64,
        average_rating,
        total_readers,
    })
}

/// Order `(book_id, readers, reviews)` by readers, then reviews, then id.
fn rank_popular(mut tallies: Vec<(i32, u64, u64)>) -> Vec<i32> {
    tallies.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));
    tallies.into_iter().map(|(id, _, _)| id).collect()
}

/// Books ranked by how many reading lists hold them, then by review count.
pub async fn popular_books(
    db: &DatabaseConnection,
    page: Pagination,
) -> Result<Vec<BookDto>, DomainError> {
    let book_ids: Vec<i32> = Book::find()
        .select_only()
        .column(book::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    let reader_rows: Vec<i32> = UserBook::find()
        .select_only()
        .column(user_book::Column::BookId)
        .into_tuple()
        .all(db)
        .await?;
    let review_rows: Vec<i32> = Review::find()
        .select_only()
        .column(review::Column::BookId)
        .into_tuple()
        .all(db)
        .await?;

    let mut readers: HashMap<i32, u64> = HashMap::new();
    for id in reader_rows {
        *readers.entry(id).or_insert(0) += 1;
    }
    let mut reviews: HashMap<i32, u64> = HashMap::new();
    for id in review_rows {
        *reviews.entry(id).or_insert(0) += 1;
    }

    let tallies = book_ids
        .into_iter()
        .map(|id| {
            (
                id,
                readers.get(&id).copied().unwrap_or(0),
                reviews.get(&id).copied().unwrap_or(0),
            )
        })
        .collect();

    let mut result = Vec::new();
    for id in rank_popular(tallies)
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
    {
        if let Some(model) = Book::find_by_id(id).one(db).await? {
            result.push(book_dto(db, model).await?);
        }
    }
    Ok(result)
}

pub async fn follow_book(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
) -> Result<BookDto, DomainError> {
    let txn = db.begin().await?;

    let book = find_book(&txn, book_id).await?;
    if UserBookFollow::find_by_id((user_id, book_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict(ALREADY_FOLLOWING_BOOK.to_string()));
    }
    let follow = user_book_follow::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    };
    UserBookFollow::insert(follow)
        .exec_without_returning(&txn)
        .await
        .map_err(|e| DomainError::conflict_on_duplicate(e, ALREADY_FOLLOWING_BOOK))?;

    let dto = book_dto(&txn, book).await?;
    txn.commit().await?;
    tracing::info!("User {} follows book {}", user_id, book_id);
    Ok(dto)
}

pub async fn unfollow_book(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
) -> Result<BookDto, DomainError> {
    let txn = db.begin().await?;

    let book = find_book(&txn, book_id).await?;
    let follow = UserBookFollow::find_by_id((user_id, book_id))
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::Conflict(NOT_FOLLOWING_BOOK.to_string()))?;
    follow.delete(&txn).await?;

    let dto = book_dto(&txn, book).await?;
    txn.commit().await?;
    tracing::info!("User {} unfollowed book {}", user_id, book_id);
    Ok(dto)
}

pub async fn list_followed_books(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<BookDto>, DomainError> {
    let ids: Vec<i32> = UserBookFollow::find()
        .select_only()
        .column(user_book_follow::Column::BookId)
        .filter(user_book_follow::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let books = Book::find()
        .filter(book::Column::Id.is_in(ids))
        .order_by_asc(book::Column::Title)
        .all(db)
        .await?;
    Ok(book_dtos(db, books).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popular_ranks_readers_before_reviews() {
        let ranked = rank_popular(vec![(1, 0, 9), (2, 3, 0), (3, 3, 1), (4, 0, 0)]);
        assert_eq!(ranked, vec![3, 2, 1, 4]);
    }
}
