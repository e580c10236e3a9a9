use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub cover_url: Option<String>,
    pub current_book_id: Option<i32>,
    /// Denormalized; equals the number of `user_group` rows for this group.
    pub members_count: i32,
    pub created_by: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::CurrentBookId",
        to = "super::book::Column::Id",
        on_delete = "SetNull"
    )]
    CurrentBook,
    #[sea_orm(has_many = "super::group_discussion::Entity")]
    Discussions,
    #[sea_orm(has_many = "super::group_schedule::Entity")]
    Schedules,
    #[sea_orm(has_many = "super::group_event::Entity")]
    Events,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CurrentBook.def()
    }
}

impl Related<super::group_discussion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discussions.def()
    }
}

impl Related<super::group_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
}

impl Related<super::group_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_group::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_group::Relation::Group.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub cover_url: Option<String>,
    pub members_count: i32,
    pub current_book: Option<super::book::BookDto>,
    pub created_by: i32,
    pub created_at: String,
}

impl GroupDto {
    pub fn new(model: Model, current_book: Option<super::book::BookDto>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            topic: model.topic,
            cover_url: model.cover_url,
            members_count: model.members_count,
            current_book,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}
