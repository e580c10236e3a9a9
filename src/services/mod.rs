//! Services Layer
//!
//! Business logic behind the HTTP handlers. Every function takes the
//! database connection explicitly and returns `DomainError` on failure.

pub mod account_service;
pub mod admin_service;
pub mod author_service;
pub mod book_service;
pub mod challenge_service;
pub mod group_activity_service;
pub mod group_service;
pub mod reading_list_service;
pub mod review_service;
