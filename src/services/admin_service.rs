//! Admin Service - user management and dashboard counts
//!
//! Self-protection rules are evaluated before any write to the target user.

use std::str::FromStr;

use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::{policy, Actor, DomainError, Pagination, Role};
use crate::models::user::{self, Entity as User};
use crate::services::account_service::{find_user, normalize_email};
use crate::services::{
    author_service, book_service, challenge_service, group_service, reading_list_service,
    review_service,
};

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_books: u64,
    pub total_reviews: u64,
    pub total_groups: u64,
    pub total_challenges: u64,
    pub total_user_books: u64,
    pub active_users: u64,
    pub admin_users: u64,
}

pub async fn list_users(
    db: &DatabaseConnection,
    filter: UserFilter,
    page: Pagination,
) -> Result<Vec<user::Model>, DomainError> {
    let mut query = User::find();
    if let Some(term) = filter.search.as_deref()
        && !term.is_empty()
    {
        query = query.filter(
            Condition::any()
                .add(user::Column::Name.contains(term))
                .add(user::Column::Email.contains(term)),
        );
    }
    if let Some(role) = filter.role.as_deref()
        && !role.is_empty()
    {
        let role = Role::from_str(role)?;
        query = query.filter(user::Column::Role.eq(role.as_str()));
    }

    Ok(query
        .order_by_asc(user::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?)
}

pub async fn get_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, DomainError> {
    find_user(db, user_id).await
}

pub async fn update_user(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: i32,
    update: AdminUserUpdate,
) -> Result<user::Model, DomainError> {
    let new_role = update.role.as_deref().map(Role::from_str).transpose()?;

    let txn = db.begin().await?;

    let target = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))?;
    policy::admin_update_user(actor, target.id, new_role, update.is_active).into_result()?;

    let mut active: user::ActiveModel = target.into();
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("Name is required".to_string()));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = update.email {
        let email = normalize_email(&email)?;
        let taken = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .filter(user::Column::Id.ne(user_id))
            .one(&txn)
            .await?
            .is_some();
        if taken {
            return Err(DomainError::Conflict("Email already in use".to_string()));
        }
        active.email = Set(email);
    }
    if let Some(role) = new_role {
        active.role = Set(role.as_str().to_string());
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
    let updated = active
        .update(&txn)
        .await
        .map_err(|e| DomainError::conflict_on_duplicate(e, "Email already in use"))?;

    txn.commit().await?;
    tracing::info!("Admin {} updated user {}", actor.id, user_id);
    Ok(updated)
}

/// Delete a user. Memberships and follows are released first so that
/// group and author counters stay accurate; the rest cascades.
pub async fn delete_user(db: &DatabaseConnection, actor: &Actor, user_id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let target = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))?;
    policy::admin_delete_user(actor, target.id).into_result()?;

    group_service::drop_all_memberships(&txn, user_id).await?;
    author_service::drop_all_follows(&txn, user_id).await?;
    target.delete(&txn).await?;

    txn.commit().await?;
    tracing::info!("Admin {} deleted user {}", actor.id, user_id);
    Ok(())
}

pub async fn stats(db: &DatabaseConnection) -> Result<AdminStats, DomainError> {
    Ok(AdminStats {
        total_users: User::find().count(db).await?,
        total_books: book_service::count_books(db).await?,
        total_reviews: review_service::count_reviews(db).await?,
        total_groups: group_service::count_groups(db).await?,
        total_challenges: challenge_service::count_challenges(db).await?,
        total_user_books: reading_list_service::count_user_books(db).await?,
        active_users: User::find()
            .filter(user::Column::IsActive.eq(true))
            .count(db)
            .await?,
        admin_users: User::find()
            .filter(user::Column::Role.eq(Role::Admin.as_str()))
            .count(db)
            .await?,
    })
}
