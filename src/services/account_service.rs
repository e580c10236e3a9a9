//! Account Service - registration, credentials and profile

use sea_orm::*;
use serde::Deserialize;

use crate::domain::{DomainError, Role};
use crate::infrastructure::auth::{hash_password, verify_password};
use crate::models::user::{self, Entity as User};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const EMAIL_TAKEN: &str = "Email already registered";
pub const BAD_CREDENTIALS: &str = "Incorrect email or password";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

fn check_password_strength(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn hash(password: &str) -> Result<String, DomainError> {
    hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        DomainError::Internal("Could not hash password".to_string())
    })
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DomainError::Validation("Invalid email address".to_string())),
    }
}

pub async fn find_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, DomainError> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

/// Create a user account with the given role.
pub async fn create_account(
    db: &DatabaseConnection,
    input: RegisterInput,
    role: Role,
) -> Result<user::Model, DomainError> {
    if input.name.trim().is_empty() {
        return Err(DomainError::Validation("Name is required".to_string()));
    }
    let email = normalize_email(&input.email)?;
    check_password_strength(&input.password)?;

    if User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let model = user::ActiveModel {
        name: Set(input.name.trim().to_string()),
        email: Set(email),
        hashed_password: Set(hash(&input.password)?),
        avatar_url: Set(None),
        role: Set(role.as_str().to_string()),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| DomainError::conflict_on_duplicate(e, EMAIL_TAKEN))?;

    tracing::info!("Registered user {} ({})", model.id, role);
    Ok(model)
}

pub async fn register(db: &DatabaseConnection, input: RegisterInput) -> Result<user::Model, DomainError> {
    create_account(db, input, Role::User).await
}

/// Check an email/password pair. Unknown email and wrong password fail the same way.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model, DomainError> {
    let email = email.trim().to_lowercase();
    let user = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Unauthenticated(BAD_CREDENTIALS.to_string()))?;

    let valid = verify_password(password, &user.hashed_password).unwrap_or(false);
    if !valid {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(DomainError::Unauthenticated(BAD_CREDENTIALS.to_string()));
    }
    if !user.is_active {
        return Err(DomainError::Forbidden("User account is inactive".to_string()));
    }
    Ok(user)
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user: user::Model,
    update: ProfileUpdate,
) -> Result<user::Model, DomainError> {
    let mut active: user::ActiveModel = user.into();
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("Name is required".to_string()));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(avatar_url) = update.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }
    active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
    Ok(active.update(db).await?)
}

pub async fn change_password(
    db: &DatabaseConnection,
    user: user::Model,
    change: PasswordChange,
) -> Result<(), DomainError> {
    if !verify_password(&change.current_password, &user.hashed_password).unwrap_or(false) {
        return Err(DomainError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }
    check_password_strength(&change.new_password)?;

    let user_id = user.id;
    let mut active: user::ActiveModel = user.into();
    active.hashed_password = Set(hash(&change.new_password)?);
    active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
    active.update(db).await?;

    tracing::info!("User {} changed their password", user_id);
    Ok(())
}
