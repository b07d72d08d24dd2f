//! Result type aliases

use crate::error::NotifierError;

/// Standard Result type for notifier operations
pub type NotifierResult<T> = Result<T, NotifierError>;
