//! Group Service - reading groups and their membership
//!
//! `members_count` is denormalized: every membership change updates it in
//! the same transaction as the `user_group` row.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::*;
use serde::Deserialize;

use crate::domain::{policy, Actor, DomainError, Pagination};
use crate::models::group::{self, Entity as Group, GroupDto};
use crate::models::user::{self, Entity as User, UserDto};
use crate::models::user_group::{self, Entity as UserGroup};
use crate::services::book_service::{book_dto, find_book};

pub const ALREADY_MEMBER: &str = "Already a member of this group";
pub const NOT_MEMBER: &str = "Not a member of this group";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupInput {
    pub name: String,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub cover_url: Option<String>,
    pub current_book_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub cover_url: Option<String>,
    pub current_book_id: Option<i32>,
}

pub(crate) async fn find_group<C: ConnectionTrait>(
    conn: &C,
    group_id: i32,
) -> Result<group::Model, DomainError> {
    Group::find_by_id(group_id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Group"))
}

pub async fn is_member<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    group_id: i32,
) -> Result<bool, DbErr> {
    Ok(UserGroup::find_by_id((user_id, group_id))
        .one(conn)
        .await?
        .is_some())
}

pub(crate) async fn group_dto<C: ConnectionTrait>(
    conn: &C,
    model: group::Model,
) -> Result<GroupDto, DomainError> {
    let current_book = match model.current_book_id {
        Some(book_id) => match crate::models::book::Entity::find_by_id(book_id).one(conn).await? {
            Some(book) => Some(book_dto(conn, book).await?),
            None => None,
        },
        None => None,
    };
    Ok(GroupDto::new(model, current_book))
}

async fn group_dtos<C: ConnectionTrait>(
    conn: &C,
    models: Vec<group::Model>,
) -> Result<Vec<GroupDto>, DomainError> {
    let mut dtos = Vec::with_capacity(models.len());
    for model in models {
        dtos.push(group_dto(conn, model).await?);
    }
    Ok(dtos)
}

/// Shift `members_count` by `delta`, never below zero.
async fn adjust_members_count<C: ConnectionTrait>(
    conn: &C,
    group_id: i32,
    delta: i32,
) -> Result<group::Model, DomainError> {
    let group = find_group(conn, group_id).await?;
    let next = next_members_count(group.members_count, delta);
    let mut active: group::ActiveModel = group.into();
    active.members_count = Set(next);
    Ok(active.update(conn).await?)
}

pub(crate) fn next_members_count(current: i32, delta: i32) -> i32 {
    (current + delta).max(0)
}

/// Insert a membership row; a duplicate pair fails on the primary key.
async fn insert_membership<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    group_id: i32,
) -> Result<(), DomainError> {
    let membership = user_group::ActiveModel {
        user_id: Set(user_id),
        group_id: Set(group_id),
    };
    UserGroup::insert(membership)
        .exec_without_returning(conn)
        .await
        .map_err(|e| DomainError::conflict_on_duplicate(e, ALREADY_MEMBER))?;
    Ok(())
}

pub async fn list_groups(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: Pagination,
) -> Result<Vec<GroupDto>, DomainError> {
    let mut query = Group::find();
    if let Some(term) = search
        && !term.is_empty()
    {
        query = query.filter(
            Condition::any()
                .add(group::Column::Name.contains(term))
                .add(group::Column::Description.contains(term))
                .add(group::Column::Topic.contains(term)),
        );
    }

    let groups = query
        .order_by_asc(group::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    group_dtos(db, groups).await
}

pub async fn get_group(db: &DatabaseConnection, group_id: i32) -> Result<GroupDto, DomainError> {
    let group = find_group(db, group_id).await?;
    group_dto(db, group).await
}

/// Create a group; the creator becomes its first member.
pub async fn create_group(
    db: &DatabaseConnection,
    creator_id: i32,
    input: GroupInput,
) -> Result<GroupDto, DomainError> {
    if input.name.trim().is_empty() {
        return Err(DomainError::Validation("Group name is required".to_string()));
    }

    let txn = db.begin().await?;

    if let Some(book_id) = input.current_book_id {
        find_book(&txn, book_id).await?;
    }

    let created = group::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        topic: Set(input.topic),
        cover_url: Set(input.cover_url),
        current_book_id: Set(input.current_book_id),
        members_count: Set(0),
        created_by: Set(creator_id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_membership(&txn, creator_id, created.id).await?;

    let mut active: group::ActiveModel = created.into();
    active.members_count = Set(1);
    let model = active.update(&txn).await?;

    let dto = group_dto(&txn, model).await?;
    txn.commit().await?;
    tracing::info!("Group {} created by user {}", dto.id, creator_id);
    Ok(dto)
}

pub async fn update_group(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    update: GroupUpdate,
) -> Result<GroupDto, DomainError> {
    let txn = db.begin().await?;

    let existing = find_group(&txn, group_id).await?;
    policy::edit_group(actor, existing.created_by).into_result()?;

    if let Some(book_id) = update.current_book_id {
        find_book(&txn, book_id).await?;
    }

    let mut active: group::ActiveModel = existing.into();
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("Group name is required".to_string()));
        }
        active.name = Set(name);
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description));
    }
    if let Some(topic) = update.topic {
        active.topic = Set(Some(topic));
    }
    if let Some(cover_url) = update.cover_url {
        active.cover_url = Set(Some(cover_url));
    }
    if let Some(book_id) = update.current_book_id {
        active.current_book_id = Set(Some(book_id));
    }
    let model = active.update(&txn).await?;

    let dto = group_dto(&txn, model).await?;
    txn.commit().await?;
    tracing::info!("Group {} updated by user {}", group_id, actor.id);
    Ok(dto)
}

/// Set or clear the book the group is currently reading.
pub async fn set_current_book(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    book_id: Option<i32>,
) -> Result<GroupDto, DomainError> {
    let txn = db.begin().await?;

    let existing = find_group(&txn, group_id).await?;
    policy::edit_group(actor, existing.created_by).into_result()?;
    if let Some(book_id) = book_id {
        find_book(&txn, book_id).await?;
    }

    let mut active: group::ActiveModel = existing.into();
    active.current_book_id = Set(book_id);
    let model = active.update(&txn).await?;

    let dto = group_dto(&txn, model).await?;
    txn.commit().await?;
    Ok(dto)
}

pub async fn join_group(
    db: &DatabaseConnection,
    user_id: i32,
    group_id: i32,
) -> Result<GroupDto, DomainError> {
    let txn = db.begin().await?;

    find_group(&txn, group_id).await?;
    if is_member(&txn, user_id, group_id).await? {
        return Err(DomainError::Conflict(ALREADY_MEMBER.to_string()));
    }

    insert_membership(&txn, user_id, group_id).await?;
    let group = adjust_members_count(&txn, group_id, 1).await?;

    let dto = group_dto(&txn, group).await?;
    txn.commit().await?;
    tracing::info!("User {} joined group {} ({} members)", user_id, group_id, dto.members_count);
    Ok(dto)
}

pub async fn leave_group(
    db: &DatabaseConnection,
    user_id: i32,
    group_id: i32,
) -> Result<GroupDto, DomainError> {
    let txn = db.begin().await?;

    find_group(&txn, group_id).await?;
    let deleted = UserGroup::delete_many()
        .filter(user_group::Column::UserId.eq(user_id))
        .filter(user_group::Column::GroupId.eq(group_id))
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(DomainError::Conflict(NOT_MEMBER.to_string()));
    }
    let group = adjust_members_count(&txn, group_id, -1).await?;

    let dto = group_dto(&txn, group).await?;
    txn.commit().await?;
    tracing::info!("User {} left group {} ({} members)", user_id, group_id, dto.members_count);
    Ok(dto)
}

pub async fn list_user_groups(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<GroupDto>, DomainError> {
    let ids: Vec<i32> = UserGroup::find()
        .select_only()
        .column(user_group::Column::GroupId)
        .filter(user_group::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let groups = Group::find()
        .filter(group::Column::Id.is_in(ids))
        .order_by_asc(group::Column::Id)
        .all(db)
        .await?;
    group_dtos(db, groups).await
}

pub async fn list_members(
    db: &DatabaseConnection,
    group_id: i32,
) -> Result<Vec<UserDto>, DomainError> {
    let group = find_group(db, group_id).await?;
    let members = group
        .find_related(User)
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;
    Ok(members.into_iter().map(UserDto::from).collect())
}

/// Remove the user from every group they belong to, keeping counters in step.
/// Runs inside the caller's transaction.
pub(crate) async fn drop_all_memberships<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<(), DomainError> {
    let group_ids: Vec<i32> = UserGroup::find()
        .select_only()
        .column(user_group::Column::GroupId)
        .filter(user_group::Column::UserId.eq(user_id))
        .into_tuple()
        .all(conn)
        .await?;
    for group_id in group_ids {
        UserGroup::delete_many()
            .filter(user_group::Column::UserId.eq(user_id))
            .filter(user_group::Column::GroupId.eq(group_id))
            .exec(conn)
            .await?;
        adjust_members_count(conn, group_id, -1).await?;
    }
    Ok(())
}

/// Delete a group; discussions, schedules, events and memberships go with it.
pub async fn delete_group(db: &DatabaseConnection, group_id: i32) -> Result<(), DomainError> {
    let result = Group::delete_by_id(group_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Group"));
    }
    tracing::info!("Group {} deleted", group_id);
    Ok(())
}

pub async fn count_groups(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(Group::find().count(db).await?)
}
