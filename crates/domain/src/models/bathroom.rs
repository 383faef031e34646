//! Bathroom (point of interest) domain model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::DomainError;

/// Free-form OpenStreetMap tags (name, address fragments, opening hours...).
pub type Tags = BTreeMap<String, String>;

/// A review embedded in a bathroom document.
///
/// At most one review per `user_email` exists on a bathroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_email: String,
    pub user_name: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    pub created_at: String,
}

/// A bathroom document with its embedded reviews, images and aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bathroom {
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: i64,
    #[serde(default)]
    pub favorite_count: i64,
}

impl Bathroom {
    /// Creates a bathroom with no reviews, images or favorites.
    pub fn new(osm_id: i64, lat: f64, lon: f64, tags: Tags) -> Self {
        Self {
            osm_id,
            lat,
            lon,
            tags,
            reviews: Vec::new(),
            images: Vec::new(),
            average_rating: None,
            rating_count: 0,
            favorite_count: 0,
        }
    }

    /// The `name` tag, if any.
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }

    /// Name shown to users, falling back to the identifier.
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Bathroom {}", self.osm_id),
        }
    }

    /// The review written by `email`, if any.
    pub fn review_by(&self, email: &str) -> Option<&Review> {
        self.reviews.iter().find(|r| r.user_email == email)
    }

    /// Lightweight view without reviews and images.
    pub fn summary(&self) -> BathroomSummary {
        BathroomSummary {
            osm_id: self.osm_id,
            lat: self.lat,
            lon: self.lon,
            tags: self.tags.clone(),
            average_rating: self.average_rating,
            rating_count: self.rating_count,
            favorite_count: self.favorite_count,
        }
    }
}

/// Listing payload: a bathroom minus its embedded reviews and images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BathroomSummary {
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub favorite_count: i64,
}

impl From<&Bathroom> for BathroomSummary {
    fn from(bathroom: &Bathroom) -> Self {
        bathroom.summary()
    }
}

/// Fields written by an insert-or-merge of a bathroom.
///
/// Reviews, images and aggregates are never touched by the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewBathroom {
    #[validate(custom(function = "shared::validation::validate_osm_id"))]
    pub osm_id: i64,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub lat: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub lon: f64,

    pub tags: Tags,
}

/// Request payload for POST /api/bathrooms/add.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddBathroomRequest {
    pub osm_id: Option<i64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: Tags,
}

impl AddBathroomRequest {
    /// Checks required fields in order and validates coordinate ranges.
    pub fn into_new_bathroom(self) -> Result<NewBathroom, DomainError> {
        let osm_id = self.osm_id.ok_or_else(|| missing("osm_id"))?;
        let lat = self.lat.ok_or_else(|| missing("lat"))?;
        let lon = self.lon.ok_or_else(|| missing("lon"))?;

        let bathroom = NewBathroom {
            osm_id,
            lat,
            lon,
            tags: self.tags,
        };
        bathroom.validate()?;
        Ok(bathroom)
    }
}

fn missing(field: &str) -> DomainError {
    DomainError::Validation(format!("Missing field: {}", field))
}

/// Request payload for POST /api/bathrooms/{id}/reviews.
///
/// `rating` is kept untyped so that numeric strings are accepted and a
/// missing value can be told apart from a malformed one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReviewRequest {
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SubmitReviewRequest {
    /// Parses and range-checks the rating.
    pub fn parse_rating(&self) -> Result<f64, DomainError> {
        let rating = match &self.rating {
            None | Some(Value::Null) => {
                return Err(DomainError::Validation("rating is required".into()))
            }
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        }
        .ok_or_else(|| DomainError::Validation("rating must be a number".into()))?;

        shared::validation::validate_rating(rating)?;
        Ok(rating)
    }

    /// The comment with surrounding whitespace removed.
    pub fn trimmed_comment(&self) -> String {
        self.comment.as_deref().unwrap_or_default().trim().to_string()
    }
}

/// Request payload for POST /api/bathrooms/{id}/images.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddImageRequest {
    #[serde(default)]
    pub image: Option<String>,
}

impl AddImageRequest {
    pub fn into_image(self) -> Result<String, DomainError> {
        match self.image {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(DomainError::Validation("No image data provided".into())),
        }
    }
}

/// One entry of GET /api/my-reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthoredReview {
    pub osm_id: i64,
    pub bathroom_name: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: String,
}
