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
use crate::services::review_service::{self, ReviewFilter, ReviewInput, ReviewUpdate};

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub book_id: Option<i32>,
    pub user_id: Option<i32>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    let filter = ReviewFilter {
        book_id: query.book_id,
        user_id: query.user_id,
    };
    Ok(Json(review_service::list_reviews(state.db(), filter, page).await?))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(review_service::get_review(state.db(), id).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ReviewInput>,
) -> Result<impl IntoResponse, DomainError> {
    let review = review_service::create_review(state.db(), current.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let review = review_service::update_review(state.db(), &current.actor(), id, payload).await?;
    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    review_service::delete_review(state.db(), &current.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
