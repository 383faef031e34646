//! Domain services for the bathroom review service.
//!
//! Services contain business logic that operates on domain models and
//! reach storage only through the ports.

pub mod bathroom_query;
pub mod favorites;
pub mod recommendation;
pub mod review_aggregation;

pub use bathroom_query::{apply_query, BathroomService};
pub use favorites::FavoritesLedger;
pub use recommendation::{recommend, RecommendationService};
pub use review_aggregation::{
    delete_review, mean_rating, upsert_review, ReviewAggregate, ReviewDeletion, ReviewService,
};
