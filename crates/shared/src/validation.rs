//! Common validation utilities.

use validator::ValidationError;

/// Lowest rating a review may carry.
pub const MIN_RATING: f64 = 0.0;

/// Highest rating a review may carry.
pub const MAX_RATING: f64 = 5.0;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that a rating lies in the inclusive range 0 to 5.
///
/// NaN is rejected along with out-of-range values.
pub fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        let mut err = ValidationError::new("rating_range");
        err.message = Some("rating must be between 0 and 5".into());
        Err(err)
    }
}

/// Validates that an external identifier is positive.
pub fn validate_osm_id(osm_id: i64) -> Result<(), ValidationError> {
    if osm_id > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("osm_id_range");
        err.message = Some("osm_id must be a positive integer".into());
        Err(err)
    }
}

/// Parses a path segment into an external identifier.
///
/// Leading and trailing whitespace is not tolerated; the segment must be a
/// plain base-10 integer.
pub fn parse_osm_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}
