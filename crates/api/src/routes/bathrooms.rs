//! Bathroom endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    AddBathroomRequest, AddImageRequest, Bathroom, BathroomSummary, ListBathroomsQuery,
};
use domain::ports::UpsertOutcome;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{json_or_default, OptionalCurrentUser};

#[derive(Debug, Serialize)]
pub struct BathroomListResponse<T> {
    pub bathrooms: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct AddBathroomResponse {
    pub message: &'static str,
    pub bathroom: Bathroom,
}

/// Parses a path identifier, rejecting anything that is not an integer.
pub(crate) fn parse_path_id(raw: &str) -> Result<i64, ApiError> {
    shared::validation::parse_osm_id(raw).ok_or_else(ApiError::invalid_osm_id)
}

/// List bathroom summaries.
///
/// GET /api/bathrooms?min_lat&max_lat&min_lon&max_lon&q&sort&limit
///
/// Malformed parameters are ignored rather than rejected.
pub async fn list_bathrooms(
    State(state): State<AppState>,
    query: Option<Query<ListBathroomsQuery>>,
) -> Result<Json<BathroomListResponse<BathroomSummary>>, ApiError> {
    let query = query.map(|Query(q)| q).unwrap_or_default().parse();
    let bathrooms = state.bathrooms.list(&query).await?;
    Ok(Json(BathroomListResponse { bathrooms }))
}

/// GET /api/bathrooms/full
pub async fn list_bathrooms_full(
    State(state): State<AppState>,
) -> Result<Json<BathroomListResponse<Bathroom>>, ApiError> {
    let bathrooms = state.bathrooms.full().await?;
    Ok(Json(BathroomListResponse { bathrooms }))
}

/// Insert a bathroom or merge location and tags into an existing one.
///
/// POST /api/bathrooms/add
///
/// Returns 201 when a new bathroom was created and 200 for a merge.
pub async fn add_bathroom(
    State(state): State<AppState>,
    payload: Result<Json<AddBathroomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddBathroomResponse>), ApiError> {
    let request = json_or_default(payload)?;
    let (outcome, bathroom) = state.bathrooms.add(request).await?;

    let status = match outcome {
        UpsertOutcome::Inserted => StatusCode::CREATED,
        UpsertOutcome::Modified | UpsertOutcome::Unchanged => StatusCode::OK,
    };
    Ok((
        status,
        Json(AddBathroomResponse {
            message: "Bathroom added!",
            bathroom,
        }),
    ))
}

/// GET /api/bathrooms/:id
pub async fn get_bathroom(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Bathroom>, ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    Ok(Json(state.bathrooms.detail(osm_id).await?))
}

/// Attach an image reference to a bathroom.
///
/// POST /api/bathrooms/:id/images
pub async fn add_image(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: OptionalCurrentUser,
    payload: Result<Json<AddImageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Bathroom>), ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    state.bathrooms.detail(osm_id).await?;
    let uploader = session.require()?;
    let request = json_or_default(payload)?;

    let bathroom = state.bathrooms.add_image(osm_id, request).await?;
    tracing::debug!(osm_id = osm_id, user_email = %uploader.email, "Image attached");
    Ok((StatusCode::CREATED, Json(bathroom)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_id() {
        assert_eq!(parse_path_id("42").unwrap(), 42);
        assert_eq!(parse_path_id("-7").unwrap(), -7);
        assert!(matches!(parse_path_id("abc"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_path_id("4.5"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_add_response_shape() {
        let response = AddBathroomResponse {
            message: "Bathroom added!",
            bathroom: Bathroom::new(1, 40.0, -73.0, Default::default()),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["message"], "Bathroom added!");
        assert_eq!(value["bathroom"]["osm_id"], 1);
    }
}
