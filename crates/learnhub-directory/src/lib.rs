//! Read-only access to user records owned by the authentication service
//!
//! Courses, enrollments and progress reference users by id only. This crate
//! resolves those ids through the [`UserDirectory`] trait:
//! [`HttpUserDirectory`] talks to the authentication service over HTTP and
//! [`StaticUserDirectory`] keeps records in memory for tests and local runs.
//!
//! Contract: one `GET /users/{id}` per lookup, bounded by the configured
//! timeout, never retried. A 404 is an absent user, any other non-200 status
//! or transport failure is an error.

pub mod http;
pub mod memory;
pub mod user;

pub use http::HttpUserDirectory;
pub use memory::StaticUserDirectory;
pub use user::{UserRecord, UserRole};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while talking to the authentication service
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication service returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Malformed user record: {0}")]
    Decode(String),
}

/// Lookup of users by id
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch one user; `Ok(None)` when the service reports it absent.
    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, DirectoryError>;
}
