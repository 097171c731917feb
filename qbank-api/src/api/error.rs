//! API error responses
//!
//! Every error leaves the gateway as the uniform envelope
//! `{success: false, error}` with a status code matching the error class.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use qbank_common::api::types::Ack;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request data (400)
    BadRequest(String),
    /// Missing, invalid, or insufficient credentials (401)
    Unauthorized(String),
    /// Target row does not exist (404)
    NotFound(String),
    /// Database or downstream failure (500)
    Internal(String),
}

impl From<qbank_common::Error> for ApiError {
    fn from(err: qbank_common::Error) -> Self {
        match err {
            qbank_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            qbank_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(Ack::err(message))).into_response()
    }
}
