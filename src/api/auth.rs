use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::auth::{create_jwt, CurrentUser};
use crate::infrastructure::AppState;
use crate::models::UserDto;
use crate::services::account_service::{self, PasswordChange, ProfileUpdate, RegisterInput};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<impl IntoResponse, DomainError> {
    let user = account_service::register(state.db(), payload).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let user = account_service::authenticate(state.db(), &payload.email, &payload.password).await?;

    let token = create_jwt(
        &user,
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
    )
    .map_err(|e| {
        tracing::error!("Token creation failed: {}", e);
        DomainError::Internal("Could not issue token".to_string())
    })?;

    tracing::info!("User {} logged in", user.id);
    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer"
    })))
}

pub async fn get_me(current: CurrentUser) -> Json<UserDto> {
    Json(UserDto::from(current.user))
}

pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserDto>, DomainError> {
    let user = account_service::update_profile(state.db(), current.user, payload).await?;
    Ok(Json(UserDto::from(user)))
}

pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<PasswordChange>,
) -> Result<impl IntoResponse, DomainError> {
    account_service::change_password(state.db(), current.user, payload).await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
