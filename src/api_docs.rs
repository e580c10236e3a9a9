use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::challenges::join_challenge,
        api::challenges::update_progress,
        api::challenges::leave_challenge,
        api::challenges::challenge_statistics,
        api::groups::update_group,
        api::groups::join_group,
        api::groups::leave_group,
    ),
    tags(
        (name = "bookclub", description = "Book club API: challenges, groups, books and reviews")
    )
)]
pub struct ApiDoc;
