//! Admin endpoints. Every handler requires the `AdminUser` extractor.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::domain::{DomainError, Pagination};
use crate::infrastructure::auth::AdminUser;
use crate::infrastructure::AppState;
use crate::models::{challenge, review, BookDto, GroupDto, UserDto};
use crate::services::admin_service::{self, AdminStats, AdminUserUpdate, UserFilter};
use crate::services::{book_service, challenge_service, group_service, review_service};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserDto>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    let filter = UserFilter {
        search: query.search,
        role: query.role,
    };
    let users = admin_service::list_users(state.db(), filter, page).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, DomainError> {
    Ok(Json(admin_service::get_user(state.db(), id).await?.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Json<UserDto>, DomainError> {
    let user = admin_service::update_user(state.db(), &admin.actor(), id, payload).await?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    admin_service::delete_user(state.db(), &admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_books(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<BookDto>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        book_service::list_books(state.db(), query.search.as_deref(), page).await?,
    ))
}

pub async fn delete_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    book_service::delete_book(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_reviews(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<review::Model>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        review_service::list_reviews(state.db(), Default::default(), page).await?,
    ))
}

pub async fn delete_review(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    review_service::remove_review(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_groups(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<GroupDto>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        group_service::list_groups(state.db(), query.search.as_deref(), page).await?,
    ))
}

pub async fn delete_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    group_service::delete_group(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_challenges(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<challenge::Model>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        challenge_service::list_challenges(state.db(), query.search.as_deref(), page).await?,
    ))
}

pub async fn delete_challenge(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    challenge_service::delete_challenge(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AdminStats>, DomainError> {
    Ok(Json(admin_service::stats(state.db()).await?))
}
