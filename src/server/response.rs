//! JSON response envelopes and error mapping for the HTTP layer

use crate::store::StoreError;
use crate::RummageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error envelope returned to clients
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// A typed HTTP error carrying the status it maps to
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<RummageError> for ApiError {
    fn from(err: RummageError) -> Self {
        match err {
            RummageError::InvalidRequest(message) => Self::bad_request(message),
            RummageError::NotFound(message) => Self::not_found(message),
            RummageError::Store(StoreError::NotFound(id)) => {
                Self::not_found(format!("job not found: {}", id))
            }
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::from(RummageError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}
