use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::domain::{DomainError, Pagination};
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::AppState;
use crate::models::BookDto;
use crate::services::book_service::{self, BookInput, BookUpdate};
use crate::services::reading_list_service::{self, UserBookInput, UserBookUpdate};
use crate::services::review_service;

#[derive(Debug, Deserialize)]
pub struct BookListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct MyBooksQuery {
    pub status: Option<String>,
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<Vec<BookDto>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    let books = book_service::list_books(state.db(), query.search.as_deref(), page).await?;
    Ok(Json(books))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BookDto>, DomainError> {
    Ok(Json(book_service::get_book(state.db(), id).await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(payload): Json<BookInput>,
) -> Result<impl IntoResponse, DomainError> {
    let book = book_service::create_book(state.db(), payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update_book(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<BookDto>, DomainError> {
    Ok(Json(book_service::update_book(state.db(), id, payload).await?))
}

pub async fn book_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let page = Pagination::with_default(query.skip, query.limit, 20)?;
    Ok(Json(review_service::list_book_reviews(state.db(), id, page).await?))
}

pub async fn book_statistics(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(book_service::book_statistics(state.db(), id).await?))
}

pub async fn popular_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<BookDto>>, DomainError> {
    let page = Pagination::with_default(query.skip, query.limit, 20)?;
    Ok(Json(book_service::popular_books(state.db(), page).await?))
}

pub async fn follow_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<BookDto>, DomainError> {
    Ok(Json(book_service::follow_book(state.db(), current.id(), id).await?))
}

pub async fn unfollow_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<BookDto>, DomainError> {
    Ok(Json(book_service::unfollow_book(state.db(), current.id(), id).await?))
}

pub async fn followed_books(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<BookDto>>, DomainError> {
    Ok(Json(book_service::list_followed_books(state.db(), current.id()).await?))
}

// Reading list

pub async fn my_books(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<MyBooksQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let books =
        reading_list_service::list_user_books(state.db(), current.id(), query.status.as_deref())
            .await?;
    Ok(Json(books))
}

pub async fn add_my_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UserBookInput>,
) -> Result<impl IntoResponse, DomainError> {
    let entry = reading_list_service::add_user_book(state.db(), current.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_my_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UserBookUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let entry = reading_list_service::update_user_book(state.db(), current.id(), id, payload).await?;
    Ok(Json(entry))
}

pub async fn remove_my_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    reading_list_service::remove_user_book(state.db(), current.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
