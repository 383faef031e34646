//! Lenient JSON body handling.

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::ApiError;

/// Unwraps a JSON body, treating a request without a JSON content type as
/// an empty object. Malformed JSON is a validation error.
///
/// Handlers take `Result<Json<T>, JsonRejection>` and call this once the
/// checks that must precede body validation have passed.
pub fn json_or_default<T: Default>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
    };
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Payload {
        #[serde(default)]
        value: Option<i64>,
    }

    async fn extract(request: Request<Body>) -> Result<Payload, ApiError> {
        json_or_default(Json::<Payload>::from_request(request, &()).await)
    }

    #[tokio::test]
    async fn test_valid_body() {
        let request = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"value": 3}"#))
            .unwrap();
        assert_eq!(extract(request).await.unwrap().value, Some(3));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_empty_object() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract(request).await.unwrap(), Payload::default());
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let request = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        assert!(matches!(extract(request).await, Err(ApiError::Validation(_))));
    }
}
