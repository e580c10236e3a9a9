pub mod author;
pub mod author_notification;
pub mod book;
pub mod book_authors;
pub mod challenge;
pub mod group;
pub mod group_discussion;
pub mod group_event;
pub mod group_schedule;
pub mod review;
pub mod user;
pub mod user_author_follow;
pub mod user_book;
pub mod user_book_follow;
pub mod user_challenge;
pub mod user_group;

pub use book::BookDto;
pub use group::GroupDto;
pub use user::UserDto;
