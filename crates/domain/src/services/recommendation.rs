//! Recommendation lists: top rated, most favorited and nearest.
//!
//! All three lists come from one read of the whole collection and are
//! computed independently, so a bathroom may appear in several of them.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::DomainError;
use crate::models::{
    Bathroom, BathroomSummary, RecommendationQuery, Recommendations, RECOMMENDATION_LIST_SIZE,
};
use crate::ports::BathroomStore;

/// Rated bathrooms by descending average. Ties keep natural order.
pub fn top_rated(bathrooms: &[Bathroom]) -> Vec<BathroomSummary> {
    let mut rated: Vec<(&Bathroom, f64)> = bathrooms
        .iter()
        .filter_map(|b| b.average_rating.map(|avg| (b, avg)))
        .collect();
    rated.sort_by(|(_, x), (_, y)| y.partial_cmp(x).unwrap_or(Ordering::Equal));
    rated
        .into_iter()
        .take(RECOMMENDATION_LIST_SIZE)
        .map(|(b, _)| b.summary())
        .collect()
}

/// Favorited bathrooms by descending favorite count.
pub fn most_favorited(bathrooms: &[Bathroom]) -> Vec<BathroomSummary> {
    let mut favorited: Vec<&Bathroom> = bathrooms.iter().filter(|b| b.favorite_count > 0).collect();
    favorited.sort_by(|a, b| b.favorite_count.cmp(&a.favorite_count));
    favorited
        .into_iter()
        .take(RECOMMENDATION_LIST_SIZE)
        .map(Bathroom::summary)
        .collect()
}

/// Squared Euclidean distance in raw degrees. Not geodesic.
pub fn squared_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat1 - lat2;
    let dlon = lon1 - lon2;
    dlat * dlat + dlon * dlon
}

/// Closest bathrooms to the reference point, regardless of rating.
pub fn nearest(bathrooms: &[Bathroom], lat: f64, lon: f64) -> Vec<BathroomSummary> {
    let mut by_distance: Vec<(&Bathroom, f64)> = bathrooms
        .iter()
        .map(|b| (b, squared_distance(lat, lon, b.lat, b.lon)))
        .collect();
    by_distance.sort_by(|(_, x), (_, y)| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    by_distance
        .into_iter()
        .take(RECOMMENDATION_LIST_SIZE)
        .map(|(b, _)| b.summary())
        .collect()
}

pub fn recommend(bathrooms: &[Bathroom], lat: f64, lon: f64) -> Recommendations {
    Recommendations {
        top_rated: top_rated(bathrooms),
        most_favorited: most_favorited(bathrooms),
        nearest: nearest(bathrooms, lat, lon),
    }
}

/// Both coordinates must be present and finite.
pub fn parse_coordinates(query: &RecommendationQuery) -> Result<(f64, f64), DomainError> {
    let parse = |raw: &Option<String>| {
        raw.as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    match (parse(&query.lat), parse(&query.lon)) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(DomainError::Validation("Invalid lat/lon".into())),
    }
}

#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn BathroomStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn BathroomStore>) -> Self {
        Self { store }
    }

    pub async fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Recommendations, DomainError> {
        let (lat, lon) = parse_coordinates(query)?;
        let bathrooms = self.store.find_all().await?;
        Ok(recommend(&bathrooms, lat, lon))
    }
}
