//! Listing query parameters and their parsed form.

use serde::Deserialize;

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Builds a box only when all four bounds are present.
    pub fn from_bounds(
        min_lat: Option<f64>,
        max_lat: Option<f64>,
        min_lon: Option<f64>,
        max_lon: Option<f64>,
    ) -> Option<Self> {
        Some(Self {
            min_lat: min_lat?,
            max_lat: max_lat?,
            min_lon: min_lon?,
            max_lon: max_lon?,
        })
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Result ordering for bathroom listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BathroomSort {
    /// Highest average rating first; unrated bathrooms last.
    Rating,
    /// Most reviews first.
    Reviews,
    /// Ascending by name tag; unnamed bathrooms first.
    Name,
}

impl BathroomSort {
    /// Unknown values yield `None`, meaning natural store order.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "rating" => Some(BathroomSort::Rating),
            "reviews" => Some(BathroomSort::Reviews),
            "name" => Some(BathroomSort::Name),
            _ => None,
        }
    }
}

/// Parsed listing query handed to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BathroomQuery {
    pub bbox: Option<BoundingBox>,
    /// Case-insensitive substring of the name tag. Never empty.
    pub keyword: Option<String>,
    pub sort: Option<BathroomSort>,
    /// Maximum number of results. `None` means unbounded.
    pub limit: Option<usize>,
}

/// Raw query string of GET /api/bathrooms.
///
/// Every value arrives as text so that a malformed number degrades to
/// "absent" instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBathroomsQuery {
    pub min_lat: Option<String>,
    pub max_lat: Option<String>,
    pub min_lon: Option<String>,
    pub max_lon: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
}

impl ListBathroomsQuery {
    pub fn parse(&self) -> BathroomQuery {
        let bbox = BoundingBox::from_bounds(
            lenient_f64(&self.min_lat),
            lenient_f64(&self.max_lat),
            lenient_f64(&self.min_lon),
            lenient_f64(&self.max_lon),
        );

        let keyword = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let sort = self.sort.as_deref().and_then(BathroomSort::parse);

        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l as usize);

        BathroomQuery {
            bbox,
            keyword,
            sort,
            limit,
        }
    }
}

fn lenient_f64(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
