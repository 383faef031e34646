//! Recommendation domain models.

use serde::{Deserialize, Serialize};

use super::bathroom::BathroomSummary;

/// Number of entries in each recommendation list.
pub const RECOMMENDATION_LIST_SIZE: usize = 5;

/// The three independently ranked recommendation lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub top_rated: Vec<BathroomSummary>,
    pub most_favorited: Vec<BathroomSummary>,
    pub nearest: Vec<BathroomSummary>,
}

/// Raw query string of GET /api/bathrooms/recommendations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}
