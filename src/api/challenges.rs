use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{DomainError, Pagination};
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::AppState;
use crate::models::challenge;
use crate::models::user_challenge::UserChallengeDto;
use crate::services::challenge_service::{self, ChallengeInput, ChallengeStatistics};

#[derive(Debug, Deserialize)]
pub struct ChallengeListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: i32,
}

pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ChallengeListQuery>,
) -> Result<Json<Vec<challenge::Model>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        challenge_service::list_challenges(state.db(), query.search.as_deref(), page).await?,
    ))
}

pub async fn get_challenge(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<challenge::Model>, DomainError> {
    Ok(Json(challenge_service::get_challenge(state.db(), id).await?))
}

pub async fn create_challenge(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(payload): Json<ChallengeInput>,
) -> Result<impl IntoResponse, DomainError> {
    let challenge = challenge_service::create_challenge(state.db(), payload).await?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

#[utoipa::path(
    post,
    path = "/api/challenges/{id}/join",
    params(("id" = i32, Path, description = "Challenge id")),
    responses(
        (status = 201, description = "Joined with progress 0"),
        (status = 400, description = "Already participating"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn join_challenge(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let participation = challenge_service::join_challenge(state.db(), current.id(), id).await?;
    Ok((StatusCode::CREATED, Json(participation)))
}

#[utoipa::path(
    patch,
    path = "/api/challenges/{id}/progress",
    params(("id" = i32, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "Updated progress and completion"),
        (status = 400, description = "Not participating"),
        (status = 404, description = "Challenge not found"),
        (status = 422, description = "Negative progress")
    )
)]
pub async fn update_progress(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ProgressRequest>,
) -> Result<Json<UserChallengeDto>, DomainError> {
    let participation =
        challenge_service::update_progress(state.db(), current.id(), id, payload.progress).await?;
    Ok(Json(participation))
}

#[utoipa::path(
    post,
    path = "/api/challenges/{id}/leave",
    params(("id" = i32, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "Participation removed"),
        (status = 400, description = "Not participating")
    )
)]
pub async fn leave_challenge(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    challenge_service::leave_challenge(state.db(), current.id(), id).await?;
    Ok(Json(json!({ "message": "Successfully left the challenge" })))
}

pub async fn my_challenges(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<UserChallengeDto>>, DomainError> {
    Ok(Json(
        challenge_service::list_user_challenges(state.db(), current.id()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/challenges/{id}/statistics",
    params(("id" = i32, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "total_participants, completed_count, average_progress"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn challenge_statistics(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ChallengeStatistics>, DomainError> {
    Ok(Json(challenge_service::challenge_statistics(state.db(), id).await?))
}
