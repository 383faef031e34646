//! Domain models for the bathroom review service.

pub mod bathroom;
pub mod query;
pub mod recommendation;
pub mod user;

pub use bathroom::{
    AddBathroomRequest, AddImageRequest, AuthoredReview, Bathroom, BathroomSummary, NewBathroom,
    Review, SubmitReviewRequest, Tags,
};
pub use query::{BathroomQuery, BathroomSort, BoundingBox, ListBathroomsQuery};
pub use recommendation::{RecommendationQuery, Recommendations, RECOMMENDATION_LIST_SIZE};
pub use user::{GoogleLoginRequest, Identity, User, UserProfile};
