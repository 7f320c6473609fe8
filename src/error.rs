use axum::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(String),
    InvalidId(String),
    NotFound(String),
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use StoreError::*;
        match self {
            Validation(s) => write!(f, "Validation: {}", s),
            InvalidId(s) => write!(f, "InvalidId: {}", s),
            NotFound(s) => write!(f, "NotFound: {}", s),
            Database(s) => write!(f, "Database: {}", s),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        use StoreError::*;
        match self {
            Validation(_) => StatusCode::BAD_REQUEST,
            InvalidId(_) => StatusCode::BAD_REQUEST,
            NotFound(_) => StatusCode::NOT_FOUND,
            Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> Self {
        StoreError::Database(error.to_string())
    }
}

impl From<mongodb::bson::document::ValueAccessError> for StoreError {
    fn from(error: mongodb::bson::document::ValueAccessError) -> Self {
        StoreError::Database(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StoreError::Validation("name is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::InvalidId("xyz".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::NotFound("no author".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::Database("connection reset".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_carries_kind_and_message() {
        let err = StoreError::Validation("name is required".into());
        assert_eq!(err.to_string(), "Validation: name is required");

        let err = StoreError::NotFound("no book with id 507f1f77bcf86cd799439011".into());
        assert!(err.to_string().starts_with("NotFound: "));
    }
}
