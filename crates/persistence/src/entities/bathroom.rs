//! Bathroom entity (database row mapping).

use domain::models::{Bathroom, Review, Tags};
use sqlx::types::Json;
use sqlx::FromRow;

/// Column list shared by every bathroom query.
pub const BATHROOM_COLUMNS: &str =
    "id, osm_id, lat, lon, tags, reviews, images, average_rating, rating_count, favorite_count";

/// Database row mapping for the bathrooms table.
///
/// `id` is the insertion sequence and defines natural order.
#[derive(Debug, Clone, FromRow)]
pub struct BathroomEntity {
    pub id: i64,
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: Json<Tags>,
    pub reviews: Json<Vec<Review>>,
    pub images: Json<Vec<String>>,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub favorite_count: i64,
}

impl From<BathroomEntity> for Bathroom {
    fn from(entity: BathroomEntity) -> Self {
        Self {
            osm_id: entity.osm_id,
            lat: entity.lat,
            lon: entity.lon,
            tags: entity.tags.0,
            reviews: entity.reviews.0,
            images: entity.images.0,
            average_rating: entity.average_rating,
            rating_count: entity.rating_count,
            favorite_count: entity.favorite_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let entity = BathroomEntity {
            id: 10,
            osm_id: 4242,
            lat: 40.73,
            lon: -73.99,
            tags: Json(Tags::from([("name".to_string(), "Union Square".to_string())])),
            reviews: Json(vec![Review {
                user_email: "a@nyu.edu".into(),
                user_name: "A".into(),
                rating: 4.0,
                comment: "ok".into(),
                created_at: "2024-03-01T12:00:00.000Z".into(),
            }]),
            images: Json(vec![]),
            average_rating: Some(4.0),
            rating_count: 1,
            favorite_count: 2,
        };

        let bathroom: Bathroom = entity.into();
        assert_eq!(bathroom.osm_id, 4242);
        assert_eq!(bathroom.name(), Some("Union Square"));
        assert_eq!(bathroom.reviews.len(), 1);
        assert_eq!(bathroom.favorite_count, 2);
    }
}
