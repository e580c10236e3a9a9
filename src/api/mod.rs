pub mod admin;
pub mod auth;
pub mod author;
pub mod books;
pub mod challenges;
pub mod error;
pub mod groups;
pub mod health;
pub mod reviews;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::infrastructure::AppState;

// Multipart framing needs a little room above the file size limit.
const UPLOAD_BODY_LIMIT: usize = upload::BOOK_FILE.max_bytes + 1024 * 1024;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me).patch(auth::update_me))
        .route("/auth/change-password", post(auth::change_password))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/popular/list", get(books::popular_books))
        .route("/books/user/my-books", get(books::my_books))
        .route("/books/user/add", post(books::add_my_book))
        .route("/books/user/followed", get(books::followed_books))
        .route(
            "/books/user/:id",
            patch(books::update_my_book).delete(books::remove_my_book),
        )
        .route("/books/:id", get(books::get_book).patch(books::update_book))
        .route("/books/:id/reviews", get(books::book_reviews))
        .route("/books/:id/statistics", get(books::book_statistics))
        .route("/books/:id/follow", post(books::follow_book))
        .route("/books/:id/unfollow", post(books::unfollow_book))
        // Reviews
        .route("/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/reviews/:id",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        // Authors
        .route("/authors", get(author::list_authors).post(author::create_author))
        .route("/authors/user/followed", get(author::followed_authors))
        .route("/authors/user/notifications", get(author::my_notifications))
        .route("/authors/:id", get(author::get_author))
        .route("/authors/:id/follow", post(author::follow_author))
        .route("/authors/:id/unfollow", post(author::unfollow_author))
        .route("/authors/:id/books", get(author::author_books))
        .route("/authors/:id/statistics", get(author::author_statistics))
        .route("/authors/:id/notifications", get(author::author_notifications))
        // Groups
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/user/my-groups", get(groups::my_groups))
        .route("/groups/:id", get(groups::get_group).patch(groups::update_group))
        .route("/groups/:id/join", post(groups::join_group))
        .route("/groups/:id/leave", post(groups::leave_group))
        .route("/groups/:id/members", get(groups::group_members))
        .route("/groups/:id/current-book", put(groups::set_current_book))
        .route(
            "/groups/:id/discussions",
            get(groups::list_discussions).post(groups::create_discussion),
        )
        .route(
            "/groups/:id/discussions/:discussion_id",
            axum::routing::delete(groups::delete_discussion),
        )
        .route(
            "/groups/:id/schedules",
            get(groups::list_schedules).post(groups::create_schedule),
        )
        .route(
            "/groups/:id/schedules/:schedule_id",
            patch(groups::update_schedule).delete(groups::delete_schedule),
        )
        .route(
            "/groups/:id/events",
            get(groups::list_events).post(groups::create_event),
        )
        .route(
            "/groups/:id/events/:event_id",
            patch(groups::update_event).delete(groups::delete_event),
        )
        // Challenges
        .route(
            "/challenges",
            get(challenges::list_challenges).post(challenges::create_challenge),
        )
        .route("/challenges/user/my-challenges", get(challenges::my_challenges))
        .route("/challenges/:id", get(challenges::get_challenge))
        .route("/challenges/:id/join", post(challenges::join_challenge))
        .route("/challenges/:id/progress", patch(challenges::update_progress))
        .route("/challenges/:id/leave", post(challenges::leave_challenge))
        .route("/challenges/:id/statistics", get(challenges::challenge_statistics))
        // Uploads
        .route(
            "/upload/book-cover",
            post(upload::upload_book_cover).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/upload/book-file",
            post(upload::upload_book_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/upload/book-covers", get(upload::list_book_covers))
        // Admin
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/:id",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/admin/books", get(admin::list_books))
        .route("/admin/books/:id", axum::routing::delete(admin::delete_book))
        .route("/admin/reviews", get(admin::list_reviews))
        .route("/admin/reviews/:id", axum::routing::delete(admin::delete_review))
        .route("/admin/groups", get(admin::list_groups))
        .route("/admin/groups/:id", axum::routing::delete(admin::delete_group))
        .route("/admin/challenges", get(admin::list_challenges))
        .route(
            "/admin/challenges/:id",
            axum::routing::delete(admin::delete_challenge),
        )
        .route(
            "/admin/authors/:id/notifications",
            post(author::create_notification),
        )
        .with_state(state)
}
