//! Domain error types.

use thiserror::Error;

use crate::ports::StoreError;

/// Failures surfaced by domain services.
///
/// A no-op (deleting something that is not there) is not an error; services
/// report it through their return values instead.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn bathroom_not_found() -> Self {
        DomainError::NotFound("Bathroom not found".into())
    }
}

impl From<validator::ValidationError> for DomainError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        DomainError::Validation(message)
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();

        DomainError::Validation(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::Validation("bad".into()).to_string(),
            "Validation error: bad"
        );
        assert_eq!(
            DomainError::bathroom_not_found().to_string(),
            "Not found: Bathroom not found"
        );
    }

    #[test]
    fn test_from_validation_error_uses_message() {
        let err: DomainError = shared::validation::validate_rating(9.0).unwrap_err().into();
        match err {
            DomainError::Validation(msg) => assert_eq!(msg, "rating must be between 0 and 5"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_from_store_error() {
        let err: DomainError = StoreError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, DomainError::Store(_)));
    }
}
