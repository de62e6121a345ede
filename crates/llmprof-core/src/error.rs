//! Error types for profile operations

use thiserror::Error;
use uuid::Uuid;

use crate::profile::ValidationError;
use crate::secrets::SecretError;
use crate::storage::db::DatabaseError;

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors that can occur during profile store operations
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Candidate profile has missing or invalid fields
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced profile does not exist
    #[error("Profile not found: {id}")]
    NotFound { id: Uuid },

    /// Storage failure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Secret backend failure
    #[error(transparent)]
    Secret(#[from] SecretError),
}

impl ProfileError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Database(_) => "STORAGE_ERROR",
            Self::Secret(_) => "SECRET_ERROR",
        }
    }
}

impl From<rusqlite::Error> for ProfileError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.into())
    }
}
