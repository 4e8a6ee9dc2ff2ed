use learnhub_directory::DirectoryError;
use sea_orm::DbErr;
use thiserror::Error;

/// Failure kinds surfaced by the core services
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// A referenced user, course, module or enrollment does not exist
    #[error("{0}")]
    NotFound(String),

    /// The write would violate a uniqueness rule
    #[error("{0}")]
    Conflict(String),

    /// The authentication service could not answer
    #[error("Authentication service error: {0}")]
    Upstream(#[from] DirectoryError),

    /// A read or write against the database failed
    #[error("Database error: {0}")]
    Persistence(#[from] DbErr),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            CoreError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}
