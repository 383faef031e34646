//! Security headers middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;

/// Security header names as constants for testing and documentation.
pub mod headers {
    pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
    pub const X_FRAME_OPTIONS: &str = "x-frame-options";
    pub const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
}

/// Adds `nosniff`, `X-Frame-Options: DENY` and, when
/// `security.hsts_enabled` is set, Strict-Transport-Security.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let response_headers = response.headers_mut();

    response_headers.insert(
        header::HeaderName::from_static(headers::X_CONTENT_TYPE_OPTIONS),
        HeaderValue::from_static("nosniff"),
    );
    response_headers.insert(
        header::HeaderName::from_static(headers::X_FRAME_OPTIONS),
        HeaderValue::from_static("DENY"),
    );

    if state.config.security.hsts_enabled {
        response_headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(headers::HSTS_VALUE),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_constants_are_valid_names() {
        for name in [headers::X_CONTENT_TYPE_OPTIONS, headers::X_FRAME_OPTIONS] {
            assert_eq!(header::HeaderName::from_static(name).as_str(), name);
        }
    }

    #[test]
    fn test_hsts_is_one_year() {
        assert!(headers::HSTS_VALUE.contains(&(365 * 24 * 60 * 60).to_string()));
    }
}
