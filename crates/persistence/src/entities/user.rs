//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::User;
use sqlx::FromRow;

/// Database row mapping for the users table.
///
/// Favorites live in `user_favorites` and are attached separately.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    pub fn into_user(self, favorites: Vec<i64>) -> User {
        User {
            email: self.email,
            name: self.name,
            picture: self.picture,
            favorites,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
