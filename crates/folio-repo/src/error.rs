//! Repository error type.

use folio_store::{ReplicaError, StoreError};

/// Failure while moving manifest state between its three copies.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Durable-store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Local replica write failed.
    #[error(transparent)]
    Replica(#[from] ReplicaError),

    /// The durable manifest object did not parse as a manifest.
    #[error("manifest decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RepoError {
    /// `true` when the underlying cause is a missing durable object.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_not_found())
    }
}
