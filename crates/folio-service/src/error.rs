//! Error taxonomy of the track service.
//!
//! Everything a store or repository can throw is captured here; nothing
//! propagates past the HTTP boundary unconverted.

use folio_repo::RepoError;
use folio_store::StoreError;

/// Track-service failure.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The requested key is absent or is not a track bucket.
    #[error("invalid track type: {0}")]
    InvalidType(String),

    /// Wrong number of uploaded files for the target bucket.
    #[error("{bucket} uploads require exactly {expected} file(s), got {actual}")]
    InvalidFileCount {
        /// Normalized bucket name.
        bucket: String,
        /// Required file count for that bucket.
        expected: usize,
        /// Files actually supplied.
        actual: usize,
    },

    /// The `links` payload did not parse as a link mapping.
    #[error("invalid links payload: {0}")]
    InvalidLinks(String),

    /// A required field was empty or missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No track with the given ID exists in any bucket.
    #[error("track not found: {0}")]
    NotFound(String),

    /// The write path exceeded its configured timeout.
    #[error("write operation timed out")]
    Timeout,

    /// Durable-store failure outside the repository protocol.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Manifest repository failure.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    /// `true` for client-input errors (400-equivalent).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidType(_)
                | Self::InvalidFileCount { .. }
                | Self::InvalidLinks(_)
                | Self::MissingField(_)
        )
    }
}
