//! HTTP error rendering.
//!
//! Handlers return `Result<_, ApiError>`. Every service error converts into
//! an `ApiError` carrying the HTTP status, the service's stable error code,
//! and a message, rendered as `{ "code": ..., "message": ... }`. Database
//! and hashing failures are logged here and reach the client only as a
//! generic 500.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt::Display;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canvas::error::ErrorCode;
use serde::Serialize;
use tracing::error;

use crate::services::account::AuthError;
use crate::services::board::BoardError;
use crate::services::note::NoteError;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED", "not signed in")
    }

    /// Log `err` and hide its detail behind a generic 500.
    pub fn internal(err: &(impl ErrorCode + Display)) -> Self {
        error!(code = err.error_code(), error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.error_code(), INTERNAL_MESSAGE)
    }

    fn from_service(status: StatusCode, err: &(impl ErrorCode + Display)) -> Self {
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.code, message: &self.message };
        (self.status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal(&DatabaseFailure(err))
    }
}

/// Gives a bare `sqlx::Error` an error code.
#[derive(Debug, thiserror::Error)]
#[error("database error: {0}")]
struct DatabaseFailure(sqlx::Error);

impl ErrorCode for DatabaseFailure {
    fn error_code(&self) -> &'static str {
        "E_DATABASE"
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials | AuthError::WrongPassword => Self::from_service(StatusCode::BAD_REQUEST, &err),
            AuthError::EmailTaken => Self::from_service(StatusCode::CONFLICT, &err),
            AuthError::InvalidCredentials => Self::from_service(StatusCode::UNAUTHORIZED, &err),
            AuthError::UnknownEmail => Self::from_service(StatusCode::NOT_FOUND, &err),
            AuthError::BoardTitleMismatch => Self::from_service(StatusCode::FORBIDDEN, &err),
            AuthError::Hash(_) | AuthError::Database(_) => Self::internal(&err),
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::NotFound(_) => Self::from_service(StatusCode::NOT_FOUND, &err),
            BoardError::EmptyTitle | BoardError::InvalidOrder(_) => Self::from_service(StatusCode::BAD_REQUEST, &err),
            BoardError::Database(_) => Self::internal(&err),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::BoardNotFound(_) | NoteError::NotFound(_) => Self::from_service(StatusCode::NOT_FOUND, &err),
            NoteError::Forbidden(_) => Self::from_service(StatusCode::FORBIDDEN, &err),
            NoteError::Invalid(_) => Self::from_service(StatusCode::BAD_REQUEST, &err),
            NoteError::Database(_) => Self::internal(&err),
        }
    }
}
