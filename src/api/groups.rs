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
use crate::models::GroupDto;
use crate::services::group_activity_service::{
    self as activity, DiscussionInput, EventInput, EventUpdate, ScheduleInput, ScheduleUpdate,
};
use crate::services::group_service::{self, GroupInput, GroupUpdate};

#[derive(Debug, Deserialize)]
pub struct GroupListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentBookRequest {
    pub book_id: Option<i32>,
}

pub async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<GroupListQuery>,
) -> Result<Json<Vec<GroupDto>>, DomainError> {
    let page = Pagination::new(query.skip, query.limit)?;
    Ok(Json(
        group_service::list_groups(state.db(), query.search.as_deref(), page).await?,
    ))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GroupDto>, DomainError> {
    Ok(Json(group_service::get_group(state.db(), id).await?))
}

pub async fn create_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<GroupInput>,
) -> Result<impl IntoResponse, DomainError> {
    let group = group_service::create_group(state.db(), current.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    patch,
    path = "/api/groups/{id}",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 200, description = "Updated group"),
        (status = 403, description = "Requester is not the group creator"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn update_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<GroupUpdate>,
) -> Result<Json<GroupDto>, DomainError> {
    Ok(Json(
        group_service::update_group(state.db(), &current.actor(), id, payload).await?,
    ))
}

pub async fn set_current_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<CurrentBookRequest>,
) -> Result<Json<GroupDto>, DomainError> {
    Ok(Json(
        group_service::set_current_book(state.db(), &current.actor(), id, payload.book_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/groups/{id}/join",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group with updated members_count"),
        (status = 400, description = "Already a member"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn join_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<GroupDto>, DomainError> {
    Ok(Json(group_service::join_group(state.db(), current.id(), id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{id}/leave",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group with updated members_count"),
        (status = 400, description = "Not a member"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn leave_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<GroupDto>, DomainError> {
    Ok(Json(group_service::leave_group(state.db(), current.id(), id).await?))
}

pub async fn my_groups(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<GroupDto>>, DomainError> {
    Ok(Json(group_service::list_user_groups(state.db(), current.id()).await?))
}

pub async fn group_members(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(group_service::list_members(state.db(), id).await?))
}

// Discussions

pub async fn list_discussions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(activity::list_discussions(state.db(), id).await?))
}

pub async fn create_discussion(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<DiscussionInput>,
) -> Result<impl IntoResponse, DomainError> {
    let post = activity::create_discussion(state.db(), &current.actor(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_discussion(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, discussion_id)): Path<(i32, i32)>,
) -> Result<StatusCode, DomainError> {
    activity::delete_discussion(state.db(), &current.actor(), id, discussion_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Schedules

pub async fn list_schedules(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(activity::list_schedules(state.db(), id).await?))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ScheduleInput>,
) -> Result<impl IntoResponse, DomainError> {
    let schedule = activity::create_schedule(state.db(), &current.actor(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, schedule_id)): Path<(i32, i32)>,
    Json(payload): Json<ScheduleUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let schedule =
        activity::update_schedule(state.db(), &current.actor(), id, schedule_id, payload).await?;
    Ok(Json(schedule))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, schedule_id)): Path<(i32, i32)>,
) -> Result<StatusCode, DomainError> {
    activity::delete_schedule(state.db(), &current.actor(), id, schedule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Events

pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(activity::list_events(state.db(), id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<EventInput>,
) -> Result<impl IntoResponse, DomainError> {
    let event = activity::create_event(state.db(), &current.actor(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, event_id)): Path<(i32, i32)>,
    Json(payload): Json<EventUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let event = activity::update_event(state.db(), &current.actor(), id, event_id, payload).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, event_id)): Path<(i32, i32)>,
) -> Result<StatusCode, DomainError> {
    activity::delete_event(state.db(), &current.actor(), id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
