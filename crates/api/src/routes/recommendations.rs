//! Recommendation endpoint handler.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{RecommendationQuery, Recommendations};

use crate::app::AppState;
use crate::error::ApiError;

/// Three ranked lists: best rated, most favorited, and nearest to the point.
///
/// GET /api/bathrooms/recommendations?lat=<f64>&lon=<f64>
pub async fn get_recommendations(
    State(state): State<AppState>,
    query: Option<Query<RecommendationQuery>>,
) -> Result<Json<Recommendations>, ApiError> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    Ok(Json(state.recommendations.recommend(&query).await?))
}
