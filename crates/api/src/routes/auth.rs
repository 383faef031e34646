//! Login, logout and session introspection.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use domain::models::{GoogleLoginRequest, Identity, UserProfile};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{json_or_default, CurrentUser};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// Exchange a Google ID token for a session.
///
/// POST /api/auth/google
///
/// The token is also set as an `HttpOnly` session cookie.
pub async fn google_login(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let request = json_or_default(payload)?;
    let id_token = request
        .id_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("id_token is required".to_string()))?;

    let identity = state.identity.verify(id_token).await?;
    let user = state.users.upsert_profile(&identity).await?;

    let (token, jti) = state
        .sessions
        .issue(
            &identity.email,
            identity.name.as_deref(),
            identity.picture.as_deref(),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to issue session token: {}", e)))?;

    info!(user_email = %identity.email, jti = %jti, "User logged in");

    let mut headers = HeaderMap::new();
    state.cookie.set(&mut headers, &token);

    Ok((
        headers,
        Json(LoginResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds. Tokens are stateless, so this only clears the cookie.
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<LogoutResponse>) {
    let mut headers = HeaderMap::new();
    state.cookie.clear(&mut headers);
    (
        headers,
        Json(LogoutResponse {
            message: "Logged out",
        }),
    )
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = match state.users.find_by_email(&identity.email).await? {
        Some(user) => user.into(),
        None => profile_from_identity(identity),
    };
    Ok(Json(MeResponse { user }))
}

/// Profile for a session whose user record has not been stored.
fn profile_from_identity(identity: Identity) -> UserProfile {
    UserProfile {
        email: identity.email,
        name: identity.name,
        picture: identity.picture,
        favorites: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_identity() {
        let profile = profile_from_identity(Identity {
            email: "new@nyu.edu".into(),
            name: Some("New".into()),
            picture: None,
        });
        assert_eq!(profile.email, "new@nyu.edu");
        assert!(profile.favorites.is_empty());
    }
}
