//! Centralized error types for directory operations.

use thiserror::Error;

/// Main error type for directory operations.
///
/// Messages of the first three variants are shown to API callers as-is.
/// `Store` messages are logged but never returned to a caller.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Graph store error: {0}")]
    Store(String),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl DirectoryError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn employee_not_found(name: &str) -> Self {
        Self::NotFound(format!("Employee '{}' not found", name))
    }

    pub fn employee_exists(name: &str) -> Self {
        Self::Conflict(format!("Employee '{}' already exists", name))
    }

    pub fn department_not_found(name: &str) -> Self {
        Self::NotFound(format!("Department '{}' not found", name))
    }
}
