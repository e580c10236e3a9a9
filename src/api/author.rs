use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::domain::{DomainError, Pagination};
use crate::infrastructure::auth::{AdminUser, CurrentUser};
use crate::infrastructure::AppState;
use crate::models::author;
use crate::services::author_service::{self, AuthorInput, NotificationInput};

#[derive(Debug, Deserialize)]
pub struct AuthorListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorListQuery>,
) -> Result<Json<Vec<author::Model>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        author_service::list_authors(state.db(), query.search.as_deref(), page).await?,
    ))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<author::Model>, DomainError> {
    Ok(Json(author_service::get_author(state.db(), id).await?))
}

pub async fn create_author(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(payload): Json<AuthorInput>,
) -> Result<impl IntoResponse, DomainError> {
    let author = author_service::create_author(state.db(), payload).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn follow_author(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<author::Model>, DomainError> {
    Ok(Json(author_service::follow_author(state.db(), current.id(), id).await?))
}

pub async fn unfollow_author(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<author::Model>, DomainError> {
    Ok(Json(author_service::unfollow_author(state.db(), current.id(), id).await?))
}

pub async fn followed_authors(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<author::Model>>, DomainError> {
    Ok(Json(author_service::list_followed_authors(state.db(), current.id()).await?))
}

pub async fn author_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(author_service::list_author_books(state.db(), id, page).await?))
}

pub async fn author_statistics(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(author_service::author_statistics(state.db(), id).await?))
}

pub async fn author_notifications(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let page = Pagination::with_default(query.skip, query.limit, 20)?;
    Ok(Json(
        author_service::list_author_notifications(state.db(), id, page).await?,
    ))
}

pub async fn my_notifications(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let page = Pagination::with_default(query.skip, query.limit, 20)?;
    Ok(Json(
        author_service::list_user_notifications(state.db(), current.id(), page).await?,
    ))
}

pub async fn create_notification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<NotificationInput>,
) -> Result<impl IntoResponse, DomainError> {
    let notification =
        author_service::create_notification(state.db(), admin.id(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
