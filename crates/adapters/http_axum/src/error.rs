//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use homeauto_domain::error::{HomeAutoError, NotFoundError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HomeAutoError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(HomeAutoError);

impl From<HomeAutoError> for ApiError {
    fn from(err: HomeAutoError) -> Self {
        Self(err)
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HomeAutoError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HomeAutoError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HomeAutoError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
