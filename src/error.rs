use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Errors surfaced by the search pipeline and the gated operations
///
/// None of these are retried by the service; callers decide.
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FinderError {
    /// Short machine-readable code for the JSON error body
    pub fn code(&self) -> &'static str {
        match self {
            FinderError::InvalidLocation(_) => "invalid_location",
            FinderError::SearchFailed(_) => "search_failed",
            FinderError::Unauthorized(_) => "unauthorized",
            FinderError::InvalidToken(_) => "invalid_token",
            FinderError::NotFound(_) => "not_found",
            FinderError::Validation(_) => "validation_failed",
            FinderError::Store(_) => "store_error",
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
        }
    }
}

impl From<validator::ValidationErrors> for FinderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FinderError::Validation(errors.to_string())
    }
}

impl ResponseError for FinderError {
    fn status_code(&self) -> StatusCode {
        match self {
            FinderError::InvalidLocation(_) | FinderError::Validation(_) => StatusCode::BAD_REQUEST,
            FinderError::Unauthorized(_) => StatusCode::FORBIDDEN,
            FinderError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            FinderError::NotFound(_) => StatusCode::NOT_FOUND,
            FinderError::SearchFailed(_) => StatusCode::BAD_GATEWAY,
            FinderError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            FinderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FinderError::InvalidLocation("????".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FinderError::SearchFailed("Places API error: OVER_QUERY_LIMIT".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            FinderError::Unauthorized("admin only".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            FinderError::Store(StoreError::NotFound("gym g1".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_response_body() {
        let body = FinderError::NotFound("gym g9".into()).to_response_body();
        assert_eq!(body.error, "not_found");
        assert_eq!(body.status_code, 404);
        assert_eq!(body.message, "Not found: gym g9");
    }
}
