//! A failed backup must stop the write path before the cache refresh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use folio_manifest::Manifest;
use folio_repo::{ManifestRepository, RepoError};
use folio_store::{DurableStore, StoreError};
use folio_test_utils::{temp_replica, wip_track};
use mockall::mock;
use mockall::predicate::eq;

mock! {
    pub Store {}

    #[async_trait]
    impl DurableStore for Store {
        async fn get(&self, key: &str) -> Result<Bytes, StoreError>;
        async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StoreError>;
        async fn delete(&self, key: &str) -> Result<(), StoreError>;
        async fn list_buckets(&self) -> Result<Vec<String>, StoreError>;
        async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;
    }
}

#[tokio::test]
async fn failed_backup_surfaces_and_skips_the_refresh() {
    let mut store = MockStore::new();
    // The manifest upload is refused; any get afterwards would be a refresh,
    // which must not happen.
    store
        .expect_put()
        .with(
            eq("state/manifest.json"),
            mockall::predicate::always(),
            eq("application/json"),
        )
        .times(1)
        .returning(|_, _, _| Err(StoreError::unavailable("put refused")));
    store.expect_get().times(0);

    let (dir, replica) = temp_replica();
    let repo = ManifestRepository::new(Arc::new(store), replica);

    let mut manifest = Manifest::default();
    manifest.ensure_bucket("WIP").push(wip_track("Demo", "Me"));

    let err = repo.commit(&manifest).await.unwrap_err();
    assert!(matches!(err, RepoError::Store(StoreError::Unavailable { .. })));

    // Step 3 already ran: the replica now diverges from the durable copy
    // until the next successful write or reconcile.
    let replica_bytes = tokio::fs::read(dir.path().join("data/manifest.json"))
        .await
        .unwrap();
    assert_eq!(Manifest::from_json_bytes(&replica_bytes).unwrap(), manifest);

    // The cache was never touched.
    assert_eq!(*repo.cached(), Manifest::default());
    assert!(repo.last_fetch().is_none());
}
