use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub file_url: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    #[sea_orm(unique)]
    pub google_books_id: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_book::Entity")]
    UserBooks,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::user_book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserBooks.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDto {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub file_url: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    pub google_books_id: Option<String>,
    pub authors: Vec<super::author::Model>,
    pub created_at: String,
}

impl BookDto {
    pub fn new(model: Model, authors: Vec<super::author::Model>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            isbn: model.isbn,
            cover_url: model.cover_url,
            file_url: model.file_url,
            description: model.description,
            published_date: model.published_date,
            page_count: model.page_count,
            google_books_id: model.google_books_id,
            authors,
            created_at: model.created_at,
        }
    }
}
