//! Error types for the storage adapters.

use std::fmt::Display;

/// Durable-store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object key does not exist.
    #[error("object not found: {key}")]
    NotFound {
        /// Key that was requested.
        key: String,
    },

    /// The store could not be reached or refused the operation.
    #[error("durable store unavailable: {message}")]
    Unavailable {
        /// Human-readable cause.
        message: String,
    },
}

impl StoreError {
    /// Wrap any displayable cause as an availability failure.
    pub fn unavailable(cause: impl Display) -> Self {
        Self::Unavailable {
            message: cause.to_string(),
        }
    }

    /// `true` for [`StoreError::NotFound`].
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Local-replica failure (writes only; reads fall back instead of failing).
#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    /// Filesystem error while writing the replica.
    #[error("replica io error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest could not be serialized.
    #[error("replica serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
