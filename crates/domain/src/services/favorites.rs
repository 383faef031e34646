//! Favorites ledger.
//!
//! A user's favorite set and each bathroom's `favorite_count` move together.
//! The store applies both changes atomically and only when the set changes,
//! so repeated adds or removes leave the counter untouched.

use std::sync::Arc;

use tracing::info;

use crate::error::DomainError;
use crate::ports::UserStore;

pub const ADDED_MESSAGE: &str = "Added to favorites";
pub const REMOVED_MESSAGE: &str = "Removed from favorites";

#[derive(Clone)]
pub struct FavoritesLedger {
    users: Arc<dyn UserStore>,
}

impl FavoritesLedger {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Idempotent add. Returns `true` when the id was newly inserted.
    pub async fn add(&self, email: &str, osm_id: i64) -> Result<bool, DomainError> {
        let changed = self.users.add_favorite(email, osm_id).await?;
        if changed {
            info!(osm_id = osm_id, user_email = %email, "Favorite added");
        }
        Ok(changed)
    }

    /// Idempotent remove. Returns `true` when the id was present.
    pub async fn remove(&self, email: &str, osm_id: i64) -> Result<bool, DomainError> {
        let changed = self.users.remove_favorite(email, osm_id).await?;
        if changed {
            info!(osm_id = osm_id, user_email = %email, "Favorite removed");
        }
        Ok(changed)
    }

    pub async fn list(&self, email: &str) -> Result<Vec<i64>, DomainError> {
        Ok(self.users.list_favorites(email).await?)
    }
}
