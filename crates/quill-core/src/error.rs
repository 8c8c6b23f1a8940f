//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Post service errors - every way a CRUD operation can fail.
#[derive(Debug, Error)]
pub enum PostError {
    /// Required fields that were missing or empty.
    #[error("validation failed for: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    /// The slug is already taken. Raised by the pre-check and by the
    /// store's unique constraint alike, so callers see one conflict kind
    /// no matter which layer detects it.
    #[error("slug already exists")]
    SlugExists,

    #[error("post {0} not found")]
    NotFound(Uuid),

    /// Acting identity is neither the post's author nor an admin.
    #[error("not authorized")]
    Forbidden,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query execution failed: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),
}
