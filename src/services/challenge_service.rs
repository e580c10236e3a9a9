//! Challenge Service - reading challenges and their participants
//!
//! Participation is a junction row carrying `progress` and a sticky
//! `completed` flag. Every mutation runs in its own transaction.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Pagination};
use crate::models::challenge::{self, Entity as Challenge};
use crate::models::user_challenge::{self, Entity as UserChallenge, UserChallengeDto};

pub const ALREADY_PARTICIPATING: &str = "Already participating in this challenge";
pub const NOT_PARTICIPATING: &str = "You are not participating in this challenge";

/// Fields accepted when creating a challenge
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeInput {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub target_books: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub xp_reward: i32,
    pub badge: Option<String>,
    pub tags: Option<String>,
}

impl ChallengeInput {
    fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if self.target_books < 1 {
            return Err(DomainError::Validation(
                "target_books must be at least 1".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }
        if self.xp_reward < 0 {
            return Err(DomainError::Validation(
                "xp_reward must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeStatistics {
    pub total_participants: u64,
    pub completed_count: u64,
    pub average_progress: f64,
}

impl ChallengeStatistics {
    pub fn from_participations(rows: &[user_challenge::Model]) -> Self {
        let total = rows.len() as u64;
        let completed = rows.iter().filter(|r| r.completed).count() as u64;
        let average_progress = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.progress as f64).sum::<f64>() / rows.len() as f64
        };
        Self {
            total_participants: total,
            completed_count: completed,
            average_progress,
        }
    }
}

/// A participant reaches completion once progress covers the target.
/// An already completed participation stays completed.
pub fn completion_after(previous: bool, progress: i32, target_books: i32) -> bool {
    previous || progress >= target_books
}

async fn find_challenge<C: ConnectionTrait>(
    conn: &C,
    challenge_id: i32,
) -> Result<challenge::Model, DomainError> {
    Challenge::find_by_id(challenge_id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Challenge"))
}

async fn find_participation<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    challenge_id: i32,
) -> Result<Option<user_challenge::Model>, DbErr> {
    UserChallenge::find_by_id((user_id, challenge_id))
        .one(conn)
        .await
}

/// List challenges, optionally filtered by a substring of title or description
pub async fn list_challenges(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: Pagination,
) -> Result<Vec<challenge::Model>, DomainError> {
    let mut query = Challenge::find();

    if let Some(term) = search
        && !term.is_empty()
    {
        query = query.filter(
            Condition::any()
                .add(challenge::Column::Title.contains(term))
                .add(challenge::Column::Description.contains(term)),
        );
    }

    Ok(query
        .order_by_asc(challenge::Column::Id)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?)
}

pub async fn get_challenge(
    db: &DatabaseConnection,
    challenge_id: i32,
) -> Result<challenge::Model, DomainError> {
    find_challenge(db, challenge_id).await
}

pub async fn create_challenge(
    db: &DatabaseConnection,
    input: ChallengeInput,
) -> Result<challenge::Model, DomainError> {
    input.validate()?;

    let model = challenge::ActiveModel {
        title: Set(input.title),
        description: Set(input.description),
        cover_url: Set(input.cover_url),
        target_books: Set(input.target_books),
        start_date: Set(input.start_date.to_rfc3339()),
        end_date: Set(input.end_date.to_rfc3339()),
        xp_reward: Set(input.xp_reward),
        badge: Set(input.badge),
        tags: Set(input.tags),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Challenge {} created: {}", model.id, model.title);
    Ok(model)
}

/// Insert a fresh participation row. A concurrent join that slipped past the
/// existence check loses on the primary key and reports the same Conflict.
async fn insert_participation<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    challenge_id: i32,
) -> Result<(), DomainError> {
    let row = user_challenge::ActiveModel {
        user_id: Set(user_id),
        challenge_id: Set(challenge_id),
        progress: Set(0),
        completed: Set(false),
    };
    UserChallenge::insert(row)
        .exec_without_returning(conn)
        .await
        .map_err(|e| DomainError::conflict_on_duplicate(e, ALREADY_PARTICIPATING))?;
    Ok(())
}

/// Enroll `user_id` in a challenge at progress 0.
pub async fn join_challenge(
    db: &DatabaseConnection,
    user_id: i32,
    challenge_id: i32,
) -> Result<UserChallengeDto, DomainError> {
    let txn = db.begin().await?;

    let challenge = find_challenge(&txn, challenge_id).await?;
    if find_participation(&txn, user_id, challenge_id)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict(ALREADY_PARTICIPATING.to_string()));
    }

    insert_participation(&txn, user_id, challenge_id).await?;

    txn.commit().await?;
    tracing::info!("User {} joined challenge {}", user_id, challenge_id);

    Ok(UserChallengeDto {
        challenge,
        progress: 0,
        completed: false,
    })
}

pub async fn update_progress(
    db: &DatabaseConnection,
    user_id: i32,
    challenge_id: i32,
    progress: i32,
) -> Result<UserChallengeDto, DomainError> {
    if progress < 0 {
        return Err(DomainError::Validation(
            "progress must not be negative".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let challenge = find_challenge(&txn, challenge_id).await?;
    let participation = find_participation(&txn, user_id, challenge_id)
        .await?
        .ok_or_else(|| DomainError::Conflict(NOT_PARTICIPATING.to_string()))?;

    let completed = completion_after(participation.completed, progress, challenge.target_books);
    let mut active: user_challenge::ActiveModel = participation.into();
    active.progress = Set(progress);
    active.completed = Set(completed);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    tracing::debug!(
        "User {} progress on challenge {}: {} (completed={})",
        user_id,
        challenge_id,
        updated.progress,
        updated.completed
    );

    Ok(UserChallengeDto {
        challenge,
        progress: updated.progress,
        completed: updated.completed,
    })
}

/// Drop the participation row; progress is not kept.
pub async fn leave_challenge(
    db: &DatabaseConnection,
    user_id: i32,
    challenge_id: i32,
) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    find_challenge(&txn, challenge_id).await?;
    let participation = find_participation(&txn, user_id, challenge_id)
        .await?
        .ok_or_else(|| DomainError::Conflict(NOT_PARTICIPATING.to_string()))?;
    participation.delete(&txn).await?;

    txn.commit().await?;
    tracing::info!("User {} left challenge {}", user_id, challenge_id);
    Ok(())
}

pub async fn list_user_challenges(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<UserChallengeDto>, DomainError> {
    let participations = UserChallenge::find()
        .filter(user_challenge::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    if participations.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = participations.iter().map(|p| p.challenge_id).collect();
    let by_challenge: HashMap<i32, user_challenge::Model> = participations
        .into_iter()
        .map(|p| (p.challenge_id, p))
        .collect();

    let challenges = Challenge::find()
        .filter(challenge::Column::Id.is_in(ids))
        .order_by_asc(challenge::Column::Id)
        .all(db)
        .await?;

    Ok(challenges
        .into_iter()
        .map(|challenge| {
            let (progress, completed) = by_challenge
                .get(&challenge.id)
                .map(|p| (p.progress, p.completed))
                .unwrap_or((0, false));
            UserChallengeDto {
                challenge,
                progress,
                completed,
            }
        })
        .collect())
}

pub async fn challenge_statistics(
    db: &DatabaseConnection,
    challenge_id: i32,
) -> Result<ChallengeStatistics, DomainError> {
    find_challenge(db, challenge_id).await?;

    let rows = UserChallenge::find()
        .filter(user_challenge::Column::ChallengeId.eq(challenge_id))
        .all(db)
        .await?;

    Ok(ChallengeStatistics::from_participations(&rows))
}

/// Delete a challenge together with its participation rows.
pub async fn delete_challenge(db: &DatabaseConnection, challenge_id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    find_challenge(&txn, challenge_id).await?;
    let cleared = UserChallenge::delete_many()
        .filter(user_challenge::Column::ChallengeId.eq(challenge_id))
        .exec(&txn)
        .await?;
    Challenge::delete_by_id(challenge_id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        "Challenge {} deleted ({} participations cleared)",
        challenge_id,
        cleared.rows_affected
    );
    Ok(())
}

pub async fn count_challenges(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(Challenge::find().count(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(progress: i32, completed: bool) -> user_challenge::Model {
        user_challenge::Model {
            user_id: 1,
            challenge_id: 1,
            progress,
            completed,
        }
    }

    #[test]
    fn completion_is_sticky() {
        assert!(completion_after(false, 5, 5));
        assert!(!completion_after(false, 4, 5));
        assert!(completion_after(true, 0, 5));
    }

    #[test]
    fn statistics_of_empty_challenge() {
        let stats = ChallengeStatistics::from_participations(&[]);
        assert_eq!(stats.total_participants, 0);
        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.average_progress, 0.0);
    }

    #[test]
    fn statistics_average_all_rows() {
        let stats = ChallengeStatistics::from_participations(&[row(5, true), row(0, false)]);
        assert_eq!(stats.total_participants, 2);
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.average_progress, 2.5);
    }

    #[tokio::test]
    async fn duplicate_participation_row_is_a_conflict() {
        let db = crate::db::init_db("sqlite::memory:").await.unwrap();
        let user = crate::services::account_service::create_account(
            &db,
            crate::services::account_service::RegisterInput {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            },
            crate::domain::Role::User,
        )
        .await
        .unwrap();
        let now = Utc::now();
        let challenge = create_challenge(
            &db,
            ChallengeInput {
                title: "Sprint".to_string(),
                description: None,
                cover_url: None,
                target_books: 1,
                start_date: now,
                end_date: now,
                xp_reward: 0,
                badge: None,
                tags: None,
            },
        )
        .await
        .unwrap();

        insert_participation(&db, user.id, challenge.id).await.unwrap();
        let second = insert_participation(&db, user.id, challenge.id).await;
        assert_eq!(
            second,
            Err(DomainError::Conflict(ALREADY_PARTICIPATING.to_string()))
        );
    }
}
