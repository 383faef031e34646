//! Session cookie handling.
//!
//! The session token travels in a single `HttpOnly` cookie with
//! `SameSite=Lax`, so the browser sends it on top-level navigation back
//! from the OAuth flow.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::config::SessionConfig;

#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age_secs: i64,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool, max_age_secs: i64) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age_secs,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.cookie_name, config.cookie_secure, config.expiry_secs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set-Cookie value carrying `token`.
    pub fn build(&self, token: &str) -> String {
        self.with_attributes(format!(
            "{}={}; Path=/; Max-Age={}",
            self.name, token, self.max_age_secs
        ))
    }

    /// Set-Cookie value that expires the cookie.
    pub fn build_clear(&self) -> String {
        self.with_attributes(format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name
        ))
    }

    fn with_attributes(&self, mut cookie: String) -> String {
        cookie.push_str("; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn set(&self, headers: &mut HeaderMap, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&self.build(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    pub fn clear(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.build_clear()) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// The session token from the request's Cookie headers, if present.
    pub fn extract<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .map(str::trim)
            .find_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                (name == self.name && !value.is_empty()).then_some(value)
            })
    }
}
