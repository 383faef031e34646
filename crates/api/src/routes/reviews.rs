//! Review endpoint handlers.
//!
//! Checks run in a fixed order: identifier, bathroom existence, session,
//! then request body.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{AuthoredReview, Bathroom, Review, SubmitReviewRequest};
use domain::services::ReviewDeletion;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{json_or_default, CurrentUser, OptionalCurrentUser};
use crate::middleware::metrics::{record_review_deleted, record_review_submitted};
use crate::routes::bathrooms::parse_path_id;

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub osm_id: i64,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct MyReviewsResponse {
    pub reviews: Vec<AuthoredReview>,
}

/// Either the updated bathroom or a no-op message.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DeleteReviewResponse {
    Deleted(Bathroom),
    NoReview { message: &'static str },
}

impl From<ReviewDeletion> for DeleteReviewResponse {
    fn from(deletion: ReviewDeletion) -> Self {
        match deletion {
            ReviewDeletion::Deleted(bathroom) => DeleteReviewResponse::Deleted(bathroom),
            ReviewDeletion::NoReview => DeleteReviewResponse::NoReview {
                message: ReviewDeletion::NO_REVIEW_MESSAGE,
            },
        }
    }
}

/// GET /api/bathrooms/:id/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    let reviews = state.reviews.list(osm_id).await?;
    Ok(Json(ReviewListResponse { osm_id, reviews }))
}

/// Create or replace the caller's review.
///
/// POST /api/bathrooms/:id/reviews
pub async fn submit_review(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: OptionalCurrentUser,
    payload: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Bathroom>), ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    state.reviews.ensure_exists(osm_id).await?;
    let author = session.require()?;
    let request = json_or_default(payload)?;

    let bathroom = state.reviews.submit(osm_id, &author, &request).await?;
    record_review_submitted();
    Ok((StatusCode::CREATED, Json(bathroom)))
}

/// Remove the caller's review.
///
/// DELETE /api/bathrooms/:id/reviews
pub async fn delete_review(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: OptionalCurrentUser,
) -> Result<Json<DeleteReviewResponse>, ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    state.reviews.ensure_exists(osm_id).await?;
    let author = session.require()?;

    let deletion = state.reviews.delete(osm_id, &author.email).await?;
    if matches!(deletion, ReviewDeletion::Deleted(_)) {
        record_review_deleted();
    }
    Ok(Json(deletion.into()))
}

/// GET /api/my-reviews
pub async fn my_reviews(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MyReviewsResponse>, ApiError> {
    let reviews = state.reviews.by_author(&user.email).await?;
    Ok(Json(MyReviewsResponse { reviews }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_review_serializes_as_message() {
        let value = serde_json::to_value(DeleteReviewResponse::from(ReviewDeletion::NoReview))
            .unwrap();
        assert_eq!(value["message"], "No review from this user to delete.");
        assert!(value.get("osm_id").is_none());
    }

    #[test]
    fn test_deleted_serializes_as_bathroom() {
        let bathroom = Bathroom::new(9, 40.0, -73.0, Default::default());
        let value =
            serde_json::to_value(DeleteReviewResponse::from(ReviewDeletion::Deleted(bathroom)))
                .unwrap();
        assert_eq!(value["osm_id"], 9);
        assert!(value["average_rating"].is_null());
    }
}
