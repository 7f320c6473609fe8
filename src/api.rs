use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

pub fn not_found(msg: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

pub fn failure(err: &StoreError) -> Response {
    (
        err.status(),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_200() {
        let resp = success("Updated author successfully");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_is_404() {
        let resp = not_found("Author not found");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_failure_maps_error_kind() {
        let resp = failure(&StoreError::Validation("name is required".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = failure(&StoreError::NotFound("no such record".into()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = failure(&StoreError::Database("pool closed".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
