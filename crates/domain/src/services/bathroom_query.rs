//! Bathroom listing, lookup and creation.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::info;

use crate::error::DomainError;
use crate::models::{
    AddBathroomRequest, AddImageRequest, Bathroom, BathroomQuery, BathroomSort, BathroomSummary,
};
use crate::ports::{BathroomStore, UpsertOutcome};

/// Whether `bathroom` passes the bounding box and keyword filters.
pub fn matches(bathroom: &Bathroom, query: &BathroomQuery) -> bool {
    if let Some(bbox) = &query.bbox {
        if !bbox.contains(bathroom.lat, bathroom.lon) {
            return false;
        }
    }
    if let Some(keyword) = &query.keyword {
        let needle = keyword.to_lowercase();
        match bathroom.name() {
            Some(name) if name.to_lowercase().contains(&needle) => {}
            _ => return false,
        }
    }
    true
}

/// Orders two bathrooms under `sort`. Ties compare equal so that a stable
/// sort keeps natural order.
pub fn compare(a: &Bathroom, b: &Bathroom, sort: BathroomSort) -> Ordering {
    match sort {
        BathroomSort::Rating => match (a.average_rating, b.average_rating) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        BathroomSort::Reviews => b.rating_count.cmp(&a.rating_count),
        BathroomSort::Name => a.name().cmp(&b.name()),
    }
}

/// Filters, sorts and limits bathrooms already in natural order.
pub fn apply_query<I>(bathrooms: I, query: &BathroomQuery) -> Vec<Bathroom>
where
    I: IntoIterator<Item = Bathroom>,
{
    let mut selected: Vec<Bathroom> = bathrooms
        .into_iter()
        .filter(|b| matches(b, query))
        .collect();

    if let Some(sort) = query.sort {
        selected.sort_by(|a, b| compare(a, b, sort));
    }
    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }
    selected
}

/// Read and write operations on bathroom documents.
#[derive(Clone)]
pub struct BathroomService {
    store: Arc<dyn BathroomStore>,
}

impl BathroomService {
    pub fn new(store: Arc<dyn BathroomStore>) -> Self {
        Self { store }
    }

    /// Summaries matching the query.
    pub async fn list(&self, query: &BathroomQuery) -> Result<Vec<BathroomSummary>, DomainError> {
        let bathrooms = self.store.find_many(query).await?;
        Ok(bathrooms.iter().map(BathroomSummary::from).collect())
    }

    /// Every bathroom with reviews and images.
    pub async fn full(&self) -> Result<Vec<Bathroom>, DomainError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn detail(&self, osm_id: i64) -> Result<Bathroom, DomainError> {
        self.store
            .find_by_osm_id(osm_id)
            .await?
            .ok_or_else(DomainError::bathroom_not_found)
    }

    /// Inserts a bathroom or merges location and tags into the existing one.
    pub async fn add(
        &self,
        request: AddBathroomRequest,
    ) -> Result<(UpsertOutcome, Bathroom), DomainError> {
        let new_bathroom = request.into_new_bathroom()?;
        let osm_id = new_bathroom.osm_id;

        let outcome = self.store.upsert_by_osm_id(new_bathroom).await?;
        let bathroom = self.detail(osm_id).await?;

        info!(osm_id = osm_id, outcome = ?outcome, "Bathroom upserted");
        Ok((outcome, bathroom))
    }

    pub async fn add_image(
        &self,
        osm_id: i64,
        request: AddImageRequest,
    ) -> Result<Bathroom, DomainError> {
        let image = request.into_image()?;
        let bathroom = self
            .store
            .push_image(osm_id, image)
            .await?
            .ok_or_else(DomainError::bathroom_not_found)?;

        info!(osm_id = osm_id, images = bathroom.images.len(), "Image added");
        Ok(bathroom)
    }
}
