//! Google identity verification.

use async_trait::async_trait;
use domain::models::Identity;
use domain::ports::{IdentityError, IdentityProvider};
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Google tokeninfo response structure.
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    /// Audience (client ID the token was issued for)
    aud: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifies Google ID tokens with the tokeninfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    tokeninfo_url: String,
    /// Expected audience. `None` skips the check.
    client_id: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(client_id: &str) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(GOOGLE_TOKENINFO_URL, client_id)
    }

    pub fn with_endpoint(tokeninfo_url: &str, client_id: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let client_id = Some(client_id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if client_id.is_none() {
            tracing::warn!("Google OAuth client ID not configured - audience validation skipped");
        }
        Ok(Self {
            client,
            tokeninfo_url: tokeninfo_url.to_string(),
            client_id,
        })
    }

    fn check(&self, info: GoogleTokenInfo) -> Result<Identity, IdentityError> {
        if let Some(expected) = &self.client_id {
            let actual = info.aud.as_deref().unwrap_or("");
            if actual != expected {
                tracing::warn!(
                    expected = %expected,
                    actual = %actual,
                    "Google token audience mismatch"
                );
                return Err(IdentityError::Rejected("audience mismatch".into()));
            }
        }

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| IdentityError::Rejected("no email in Google token".into()))?;

        Ok(Identity {
            email,
            name: info.name,
            picture: info.picture,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify(&self, credential: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Google API error: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::Rejected(format!("tokeninfo returned {}", status)));
        }
        if !status.is_success() {
            return Err(IdentityError::Unavailable(format!("tokeninfo returned {}", status)));
        }

        let info: GoogleTokenInfo = response.json().await.map_err(|e| {
            IdentityError::Unavailable(format!("Failed to parse Google response: {}", e))
        })?;

        self.check(info)
    }
}
