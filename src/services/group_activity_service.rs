//! Group Activity Service - discussions, reading schedules and events
//!
//! Every child record is looked up under its parent group, so an id that
//! belongs to another group reads as not found. Authorization rules run
//! before any write.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Deserialize;

use crate::domain::{policy, Actor, DomainError, GroupContent};
use crate::models::group_discussion::{self, DiscussionDto, Entity as Discussion};
use crate::models::group_event::{self, Entity as Event};
use crate::models::group_schedule::{self, Entity as Schedule};
use crate::models::user::{self, Entity as User};
use crate::services::group_service::{find_group, is_member};

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionInput {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

fn require_text(value: &str, field: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Discussions
// ---------------------------------------------------------------------------

/// Newest first.
pub async fn list_discussions(
    db: &DatabaseConnection,
    group_id: i32,
) -> Result<Vec<DiscussionDto>, DomainError> {
    find_group(db, group_id).await?;

    let posts = Discussion::find()
        .filter(group_discussion::Column::GroupId.eq(group_id))
        .order_by_desc(group_discussion::Column::CreatedAt)
        .order_by_desc(group_discussion::Column::Id)
        .all(db)
        .await?;

    let mut author_ids: Vec<i32> = posts.iter().map(|p| p.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<i32, user::Model> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        User::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.user_id).cloned();
            DiscussionDto::new(post, author)
        })
        .collect())
}

pub async fn create_discussion(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    input: DiscussionInput,
) -> Result<DiscussionDto, DomainError> {
    require_text(&input.content, "content")?;

    let txn = db.begin().await?;

    find_group(&txn, group_id).await?;
    let member = is_member(&txn, actor.id, group_id).await?;
    policy::post_discussion(member).into_result()?;

    let post = group_discussion::ActiveModel {
        group_id: Set(group_id),
        user_id: Set(actor.id),
        content: Set(input.content),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let author = User::find_by_id(actor.id).one(&txn).await?;

    txn.commit().await?;
    tracing::info!("User {} posted discussion {} in group {}", actor.id, post.id, group_id);
    Ok(DiscussionDto::new(post, author))
}

pub async fn delete_discussion(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    discussion_id: i32,
) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    let post = Discussion::find_by_id(discussion_id)
        .filter(group_discussion::Column::GroupId.eq(group_id))
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Discussion"))?;
    policy::delete_discussion(actor, post.user_id, group.created_by).into_result()?;

    post.delete(&txn).await?;
    txn.commit().await?;
    tracing::info!("Discussion {} removed by user {}", discussion_id, actor.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

pub async fn list_schedules(
    db: &DatabaseConnection,
    group_id: i32,
) -> Result<Vec<group_schedule::Model>, DomainError> {
    find_group(db, group_id).await?;
    Ok(Schedule::find()
        .filter(group_schedule::Column::GroupId.eq(group_id))
        .order_by_asc(group_schedule::Column::ScheduledDate)
        .all(db)
        .await?)
}

async fn find_schedule<C: ConnectionTrait>(
    conn: &C,
    group_id: i32,
    schedule_id: i32,
) -> Result<group_schedule::Model, DomainError> {
    Schedule::find_by_id(schedule_id)
        .filter(group_schedule::Column::GroupId.eq(group_id))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Schedule"))
}

pub async fn create_schedule(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    input: ScheduleInput,
) -> Result<group_schedule::Model, DomainError> {
    require_text(&input.title, "title")?;

    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    policy::manage_group_content(actor, group.created_by, GroupContent::Schedule).into_result()?;

    let schedule = group_schedule::ActiveModel {
        group_id: Set(group_id),
        title: Set(input.title),
        description: Set(input.description),
        scheduled_date: Set(input.scheduled_date.to_rfc3339()),
        created_by: Set(actor.id),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!("Schedule {} added to group {}", schedule.id, group_id);
    Ok(schedule)
}

pub async fn update_schedule(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    schedule_id: i32,
    update: ScheduleUpdate,
) -> Result<group_schedule::Model, DomainError> {
    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    let existing = find_schedule(&txn, group_id, schedule_id).await?;
    policy::manage_group_content(actor, group.created_by, GroupContent::Schedule).into_result()?;

    let mut active: group_schedule::ActiveModel = existing.into();
    if let Some(title) = update.title {
        require_text(&title, "title")?;
        active.title = Set(title);
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description));
    }
    if let Some(date) = update.scheduled_date {
        active.scheduled_date = Set(date.to_rfc3339());
    }
    let schedule = active.update(&txn).await?;

    txn.commit().await?;
    Ok(schedule)
}

pub async fn delete_schedule(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    schedule_id: i32,
) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    let existing = find_schedule(&txn, group_id, schedule_id).await?;
    policy::manage_group_content(actor, group.created_by, GroupContent::Schedule).into_result()?;

    existing.delete(&txn).await?;
    txn.commit().await?;
    tracing::info!("Schedule {} removed from group {}", schedule_id, group_id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub async fn list_events(
    db: &DatabaseConnection,
    group_id: i32,
) -> Result<Vec<group_event::Model>, DomainError> {
    find_group(db, group_id).await?;
    Ok(Event::find()
        .filter(group_event::Column::GroupId.eq(group_id))
        .order_by_asc(group_event::Column::EventDate)
        .all(db)
        .await?)
}

async fn find_event<C: ConnectionTrait>(
    conn: &C,
    group_id: i32,
    event_id: i32,
) -> Result<group_event::Model, DomainError> {
    Event::find_by_id(event_id)
        .filter(group_event::Column::GroupId.eq(group_id))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Event"))
}

pub async fn create_event(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    input: EventInput,
) -> Result<group_event::Model, DomainError> {
    require_text(&input.title, "title")?;

    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    policy::manage_group_content(actor, group.created_by, GroupContent::Event).into_result()?;

    let event = group_event::ActiveModel {
        group_id: Set(group_id),
        title: Set(input.title),
        description: Set(input.description),
        event_date: Set(input.event_date.to_rfc3339()),
        location: Set(input.location),
        created_by: Set(actor.id),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!("Event {} added to group {}", event.id, group_id);
    Ok(event)
}

pub async fn update_event(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    event_id: i32,
    update: EventUpdate,
) -> Result<group_event::Model, DomainError> {
    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    let existing = find_event(&txn, group_id, event_id).await?;
    policy::manage_group_content(actor, group.created_by, GroupContent::Event).into_result()?;

    let mut active: group_event::ActiveModel = existing.into();
    if let Some(title) = update.title {
        require_text(&title, "title")?;
        active.title = Set(title);
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description));
    }
    if let Some(date) = update.event_date {
        active.event_date = Set(date.to_rfc3339());
    }
    if let Some(location) = update.location {
        active.location = Set(Some(location));
    }
    let event = active.update(&txn).await?;

    txn.commit().await?;
    Ok(event)
}

pub async fn delete_event(
    db: &DatabaseConnection,
    actor: &Actor,
    group_id: i32,
    event_id: i32,
) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let group = find_group(&txn, group_id).await?;
    let existing = find_event(&txn, group_id, event_id).await?;
    policy::manage_group_content(actor, group.created_by, GroupContent::Event).into_result()?;

    existing.delete(&txn).await?;
    txn.commit().await?;
    tracing::info!("Event {} removed from group {}", event_id, group_id);
    Ok(())
}
