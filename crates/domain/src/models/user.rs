//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An identity confirmed by the external identity provider.
///
/// This is all a request handler knows about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl Identity {
    /// Name recorded on reviews written by this identity.
    pub fn review_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => "Anonymous".to_string(),
        }
    }
}

/// A stored user with profile snapshot and favorites set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Favorited bathroom identifiers, ascending and without duplicates.
    #[serde(default)]
    pub favorites: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public profile returned by the auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub favorites: Vec<i64>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
            picture: user.picture,
            favorites: user.favorites,
        }
    }
}

/// Request payload for POST /api/auth/google.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub id_token: Option<String>,
}
