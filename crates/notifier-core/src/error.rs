//! Core error types for notifier-rs
//!
//! One taxonomy for the whole library. Transport-level delivery failures
//! have their own error type at the backend boundary and are recorded as
//! failed deliveries rather than surfacing here.

use thiserror::Error;

/// Core error type for all notifier operations
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Cannot delete backend {name}: still referenced")]
    ProtectedDeletion { name: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotifierError {
    /// Check if the error is a uniqueness/immutability conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, NotifierError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NotifierError::NotFound { .. })
    }
}
