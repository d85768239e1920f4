//! In-memory durable store for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::durable::DurableStore;
use crate::error::StoreError;

/// One stored object.
#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Bytes,
    content_type: String,
}

/// Map-backed [`DurableStore`].
///
/// Besides the trait contract it records delete calls and can be flipped
/// into an "unavailable" state, so tests can assert outage behavior and
/// delete idempotency without a real object store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    deletes: RwLock<Vec<String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate (or clear) a store outage; while set, every operation
    /// fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Raw bytes of a stored object, if present.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.read().get(key).map(|o| o.bytes.clone())
    }

    /// Content type recorded for a stored object, if present.
    #[must_use]
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|o| o.content_type.clone())
    }

    /// `true` when the key currently holds an object.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    /// Number of objects currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// `true` when no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// How many delete calls were issued for `key`.
    #[must_use]
    pub fn delete_calls(&self, key: &str) -> usize {
        self.deletes.read().iter().filter(|k| *k == key).count()
    }

    /// Total delete calls across all keys.
    #[must_use]
    pub fn delete_calls_total(&self) -> usize {
        self.deletes.read().len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.check_available()?;
        self.object(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.deletes.write().push(key.to_string());
        // Deleting an absent key succeeds, matching S3 semantics.
        self.objects.write().remove(key);
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        Ok(vec!["memory".to_string()])
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        self.check_available()?;
        Ok(format!("memory://{key}?expires={}", ttl.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = MemoryStore::new();
        store
            .put("tracks/wip/a.mp3", Bytes::from_static(b"audio"), "audio/mpeg")
            .await
            .unwrap();

        assert_eq!(store.get("tracks/wip/a.mp3").await.unwrap(), "audio");
        assert_eq!(store.content_type("tracks/wip/a.mp3").unwrap(), "audio/mpeg");

        store.delete("tracks/wip/a.mp3").await.unwrap();
        assert!(store.get("tracks/wip/a.mp3").await.unwrap_err().is_not_found());
        assert_eq!(store.delete_calls("tracks/wip/a.mp3"), 1);
    }

    #[tokio::test]
    async fn outage_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Unavailable { .. })
        ));
        assert!(matches!(
            store.put("k", Bytes::new(), "text/plain").await,
            Err(StoreError::Unavailable { .. })
        ));

        store.set_unavailable(false);
        assert!(store.put("k", Bytes::new(), "text/plain").await.is_ok());
    }

    #[tokio::test]
    async fn signed_urls_embed_key_and_ttl() {
        let store = MemoryStore::new();
        let url = store
            .signed_url("tracks/reel/x.wav", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(url, "memory://tracks/reel/x.wav?expires=3600");
    }
}
