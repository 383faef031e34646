//! Review aggregation.
//!
//! Each author holds at most one review per bathroom. Submitting again
//! replaces the earlier review, and the average is recomputed from the
//! surviving reviews every time.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::error::DomainError;
use crate::models::{AuthoredReview, Bathroom, Identity, Review, SubmitReviewRequest};
use crate::ports::{BathroomStore, ReviewMutation};

/// Review list together with its derived aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAggregate {
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

impl ReviewAggregate {
    fn from_reviews(reviews: Vec<Review>) -> Self {
        let average_rating = mean_rating(&reviews);
        let rating_count = reviews.len() as i64;
        Self {
            reviews,
            average_rating,
            rating_count,
        }
    }

    /// Overwrites the bathroom's reviews and aggregates.
    pub fn write_to(self, bathroom: &mut Bathroom) {
        bathroom.reviews = self.reviews;
        bathroom.average_rating = self.average_rating;
        bathroom.rating_count = self.rating_count;
    }
}

/// Arithmetic mean of the ratings, `None` for an empty list.
pub fn mean_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    Some(total / reviews.len() as f64)
}

/// Drops any review by `author_email` and appends `review`.
pub fn upsert_review(existing: &[Review], author_email: &str, review: Review) -> ReviewAggregate {
    let mut reviews: Vec<Review> = existing
        .iter()
        .filter(|r| r.user_email != author_email)
        .cloned()
        .collect();
    reviews.push(review);
    ReviewAggregate::from_reviews(reviews)
}

/// Removes the review by `author_email`.
///
/// Returns `None` when the author has no review on the list.
pub fn delete_review(existing: &[Review], author_email: &str) -> Option<ReviewAggregate> {
    if !existing.iter().any(|r| r.user_email == author_email) {
        return None;
    }
    let survivors = existing
        .iter()
        .filter(|r| r.user_email != author_email)
        .cloned()
        .collect();
    Some(ReviewAggregate::from_reviews(survivors))
}

impl ReviewMutation {
    /// Computes the new aggregate, or `None` when nothing changes.
    pub fn apply(&self, existing: &[Review]) -> Option<ReviewAggregate> {
        match self {
            ReviewMutation::Upsert(review) => {
                Some(upsert_review(existing, &review.user_email, review.clone()))
            }
            ReviewMutation::Delete { user_email } => delete_review(existing, user_email),
        }
    }
}

/// Current time as an RFC 3339 UTC string with a `Z` suffix.
pub fn review_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Outcome of a review delete.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDeletion {
    Deleted(Bathroom),
    /// The author had no review on this bathroom.
    NoReview,
}

impl ReviewDeletion {
    pub const NO_REVIEW_MESSAGE: &'static str = "No review from this user to delete.";
}

/// Review operations over the bathroom store.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn BathroomStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn BathroomStore>) -> Self {
        Self { store }
    }

    /// Loads the bathroom or fails with not found.
    pub async fn ensure_exists(&self, osm_id: i64) -> Result<Bathroom, DomainError> {
        self.store
            .find_by_osm_id(osm_id)
            .await?
            .ok_or_else(DomainError::bathroom_not_found)
    }

    pub async fn list(&self, osm_id: i64) -> Result<Vec<Review>, DomainError> {
        Ok(self.ensure_exists(osm_id).await?.reviews)
    }

    /// Validates the request and replaces the author's review.
    ///
    /// The store is not touched when validation fails.
    pub async fn submit(
        &self,
        osm_id: i64,
        author: &Identity,
        request: &SubmitReviewRequest,
    ) -> Result<Bathroom, DomainError> {
        let rating = request.parse_rating()?;
        let review = Review {
            user_email: author.email.clone(),
            user_name: author.review_name(),
            rating,
            comment: request.trimmed_comment(),
            created_at: review_timestamp(),
        };

        let outcome = self
            .store
            .apply_review_mutation(osm_id, ReviewMutation::Upsert(review))
            .await?
            .ok_or_else(DomainError::bathroom_not_found)?;

        info!(
            osm_id = osm_id,
            user_email = %author.email,
            rating = rating,
            rating_count = outcome.bathroom.rating_count,
            "Review submitted"
        );
        Ok(outcome.bathroom)
    }

    pub async fn delete(
        &self,
        osm_id: i64,
        author_email: &str,
    ) -> Result<ReviewDeletion, DomainError> {
        let outcome = self
            .store
            .apply_review_mutation(
                osm_id,
                ReviewMutation::Delete {
                    user_email: author_email.to_string(),
                },
            )
            .await?
            .ok_or_else(DomainError::bathroom_not_found)?;

        if !outcome.changed {
            return Ok(ReviewDeletion::NoReview);
        }

        info!(osm_id = osm_id, user_email = %author_email, "Review deleted");
        Ok(ReviewDeletion::Deleted(outcome.bathroom))
    }

    /// Every review written by `email`, one entry per bathroom.
    pub async fn by_author(&self, email: &str) -> Result<Vec<AuthoredReview>, DomainError> {
        let bathrooms = self.store.find_reviews_by_author(email).await?;
        Ok(bathrooms
            .iter()
            .filter_map(|bathroom| {
                bathroom.review_by(email).map(|review| AuthoredReview {
                    osm_id: bathroom.osm_id,
                    bathroom_name: bathroom.display_name(),
                    rating: review.rating,
                    comment: review.comment.clone(),
                    created_at: review.created_at.clone(),
                })
            })
            .collect())
    }
}
