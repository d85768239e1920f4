//! The object-storage seam.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// Asynchronous object-storage contract.
///
/// Implementations own no manifest state and perform no retries; a failed
/// call is reported once and the caller decides what to do with it.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch an object's bytes.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when the key is absent,
    /// [`StoreError::Unavailable`] for anything else.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Create or overwrite an object.
    ///
    /// # Errors
    /// [`StoreError::Unavailable`] when the write is refused.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Delete an object. Deleting an absent key is not an error.
    ///
    /// # Errors
    /// [`StoreError::Unavailable`] when the delete is refused.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Names of the buckets visible to the configured credentials.
    ///
    /// # Errors
    /// [`StoreError::Unavailable`] when the listing is refused.
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError>;

    /// Time-limited read URL for an object.
    ///
    /// # Errors
    /// [`StoreError::Unavailable`] when the URL cannot be produced.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;
}
