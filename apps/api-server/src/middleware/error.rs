//! Error handling - maps service failures to the wire envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::error::{PostError, RepoError};
use quill_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to `{message}` /
/// `{errors: [...]}` responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Conflict(String),
    Internal(String),
    Validation(Vec<&'static str>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Validation(fields) => write!(f, "Validation errors: {:?}", fields),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // The dashboard keys off the message body, and the original
            // API reported conflicts as plain 400s, so Conflict shares
            // the status with validation failures.
            AppError::BadRequest(_) | AppError::Conflict(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(detail) => ErrorResponse::message(detail.clone()),
            AppError::BadRequest(detail) => ErrorResponse::message(detail.clone()),
            AppError::Unauthorized => ErrorResponse::message("Not authenticated"),
            AppError::Forbidden => ErrorResponse::message("Not authorized"),
            AppError::Conflict(detail) => ErrorResponse::message(detail.clone()),
            AppError::Internal(detail) => {
                // Log internal errors; the body stays generic.
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::message("Internal server error")
            }
            AppError::Validation(fields) => ErrorResponse::missing_fields(fields),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

// Conversion from service errors
impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Validation(fields) => AppError::Validation(fields),
            PostError::SlugExists => AppError::Conflict("Slug already exists".to_string()),
            PostError::NotFound(_) => AppError::NotFound("Post not found".to_string()),
            PostError::Forbidden => AppError::Forbidden,
            PostError::Repo(err) => err.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
