//! Session extractors.
//!
//! The session token is read from the session cookie first, then from an
//! `Authorization: Bearer` header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use domain::models::Identity;
use shared::jwt::SessionClaims;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller. Rejects with 401 "User not logged in".
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

/// Caller identity if a valid session is present.
///
/// Handlers that must check other things before authentication take this
/// and call [`OptionalCurrentUser::require`] at the right point.
#[derive(Debug, Clone)]
pub struct OptionalCurrentUser(pub Option<Identity>);

impl OptionalCurrentUser {
    pub fn require(self) -> Result<Identity, ApiError> {
        self.0.ok_or_else(ApiError::not_logged_in)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn identity_from_claims(claims: SessionClaims) -> Identity {
    Identity {
        email: claims.sub,
        name: claims.name,
        picture: claims.picture,
    }
}

/// Resolves the caller from request headers. Invalid tokens count as absent.
pub fn session_identity(headers: &HeaderMap, state: &AppState) -> Option<Identity> {
    let token = state
        .cookie
        .extract(headers)
        .or_else(|| bearer_token(headers))?;

    match state.sessions.validate(token) {
        Ok(claims) => Some(identity_from_claims(claims)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_identity(&parts.headers, state)
            .map(CurrentUser)
            .ok_or_else(ApiError::not_logged_in)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalCurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalCurrentUser(session_identity(&parts.headers, state)))
    }
}
