//! Favorites endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::services::favorites::{ADDED_MESSAGE, REMOVED_MESSAGE};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::OptionalCurrentUser;
use crate::middleware::metrics::{record_favorite_added, record_favorite_removed};
use crate::routes::bathrooms::parse_path_id;

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteToggleResponse {
    pub message: &'static str,
    pub osm_id: i64,
}

/// GET /api/users/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    session: OptionalCurrentUser,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let user = session.require()?;
    let favorites = state.favorites.list(&user.email).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// Add a bathroom to the caller's favorites. Repeating the call is a no-op.
///
/// POST /api/users/favorites/:id
pub async fn add_favorite(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: OptionalCurrentUser,
) -> Result<Json<FavoriteToggleResponse>, ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    let user = session.require()?;

    if state.favorites.add(&user.email, osm_id).await? {
        record_favorite_added();
    }
    Ok(Json(FavoriteToggleResponse {
        message: ADDED_MESSAGE,
        osm_id,
    }))
}

/// DELETE /api/users/favorites/:id
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: OptionalCurrentUser,
) -> Result<Json<FavoriteToggleResponse>, ApiError> {
    let osm_id = parse_path_id(&raw_id)?;
    let user = session.require()?;

    if state.favorites.remove(&user.email, osm_id).await? {
        record_favorite_removed();
    }
    Ok(Json(FavoriteToggleResponse {
        message: REMOVED_MESSAGE,
        osm_id,
    }))
}
