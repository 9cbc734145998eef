//! Error types for index operations

use std::collections::TryReserveError;

use thiserror::Error;

/// Result type for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while mutating or querying a [`TwoThreeIndex`].
///
/// [`TwoThreeIndex`]: crate::TwoThreeIndex
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The key is not present in the index
    #[error("key not found: {0:?}")]
    NotFound(String),

    /// Growing an occurrence list, key or the word list failed
    #[error("allocation failure: {0}")]
    AllocationFailure(#[from] TryReserveError),
}

impl IndexError {
    /// Create a not-found error for `key`
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Whether this is a [`IndexError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
