//! The manifest repository: cache, snapshots, and the write-path protocol.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use folio_manifest::Manifest;
use folio_store::{DurableStore, LocalReplica, StoreError};
use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::RepoError;

/// Durable object key holding the canonical manifest JSON.
pub const DEFAULT_MANIFEST_KEY: &str = "state/manifest.json";

/// Default cadence of the background cache refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);

/// Result of reconciling the local replica against the durable copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// `true` when the replica differed and was overwritten.
    pub changed: bool,
}

/// Owns the in-memory manifest cache and mediates all reads/writes to the
/// durable store and the local replica.
///
/// Constructed once at process start and shared via `Arc`; nothing else
/// mutates the cache or the durable manifest object.
pub struct ManifestRepository {
    durable: Arc<dyn DurableStore>,
    replica: LocalReplica,
    manifest_key: String,
    refresh_interval: Duration,
    cache: RwLock<Arc<Manifest>>,
    last_fetch: RwLock<Option<DateTime<Utc>>>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for ManifestRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestRepository")
            .field("manifest_key", &self.manifest_key)
            .field("refresh_interval", &self.refresh_interval)
            .field("last_fetch", &self.last_fetch())
            .finish_non_exhaustive()
    }
}

impl ManifestRepository {
    /// Repository with the default manifest key and refresh interval.
    #[must_use]
    pub fn new(durable: Arc<dyn DurableStore>, replica: LocalReplica) -> Self {
        Self::with_settings(
            durable,
            replica,
            DEFAULT_MANIFEST_KEY,
            DEFAULT_REFRESH_INTERVAL,
        )
    }

    /// Repository with explicit manifest key and refresh interval.
    #[must_use]
    pub fn with_settings(
        durable: Arc<dyn DurableStore>,
        replica: LocalReplica,
        manifest_key: impl Into<String>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            durable,
            replica,
            manifest_key: manifest_key.into(),
            refresh_interval,
            cache: RwLock::new(Arc::new(Manifest::default())),
            last_fetch: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Current in-memory manifest. Returns immediately, never touches a
    /// store; readers trade read-after-write freshness for latency.
    #[must_use]
    pub fn cached(&self) -> Arc<Manifest> {
        Arc::clone(&self.cache.read())
    }

    /// When the cache was last successfully refreshed from the durable
    /// store, if ever.
    #[must_use]
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        *self.last_fetch.read()
    }

    /// Configured background refresh cadence.
    #[inline]
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Serialize mutating operations within this process. Callers hold the
    /// guard across their full load/mutate/commit sequence. Cross-process
    /// writers are not serialized (single-logical-writer deployment).
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Pre-mutation snapshot for write operations.
    ///
    /// Reads the durable store; when no durable manifest object exists yet
    /// (first run), falls back to the local replica snapshot. A durable
    /// outage fails the write rather than basing it on possibly-stale
    /// local state.
    ///
    /// # Errors
    /// [`RepoError::Store`] when the durable store is unavailable,
    /// [`RepoError::Decode`] when the durable object is not a manifest.
    pub async fn load_authoritative(&self) -> Result<Manifest, RepoError> {
        match self.durable.get(&self.manifest_key).await {
            Ok(bytes) => Ok(Manifest::from_json_bytes(&bytes)?),
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!("no durable manifest yet; snapshotting from local replica");
                Ok(self.replica.load().await.manifest)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write-path step 3: persist the manifest to the local replica.
    ///
    /// # Errors
    /// [`RepoError::Replica`] on filesystem failure.
    pub async fn persist(&self, manifest: &Manifest) -> Result<(), RepoError> {
        self.replica.save(manifest).await?;
        Ok(())
    }

    /// Write-path step 4: upload the manifest to the durable store. This is
    /// what makes a mutation durable and visible to other processes.
    ///
    /// Last-write-wins: no version token is compared, so a concurrent
    /// writer in another process can be overwritten here.
    ///
    /// # Errors
    /// [`RepoError::Store`] when the upload fails. The replica may already
    /// hold the newer manifest at that point; the divergence heals on the
    /// next successful write or reconcile.
    pub async fn backup(&self, manifest: &Manifest) -> Result<(), RepoError> {
        let bytes = manifest.to_json_bytes()?;
        self.durable
            .put(&self.manifest_key, Bytes::from(bytes), "application/json")
            .await?;
        Ok(())
    }

    /// Write-path step 5 and the background refresh: fetch the durable
    /// manifest and atomically replace the cache.
    ///
    /// On any failure (including a missing durable object) the existing
    /// cache is left untouched and a warning is logged: staleness is
    /// preferred over invalidation.
    ///
    /// # Errors
    /// [`RepoError::Store`] / [`RepoError::Decode`] mirroring the logged
    /// failure, so write paths can surface it.
    pub async fn refresh_from_durable(&self) -> Result<(), RepoError> {
        let fetched: Result<Manifest, RepoError> = match self.durable.get(&self.manifest_key).await
        {
            Ok(bytes) => Manifest::from_json_bytes(&bytes).map_err(RepoError::from),
            Err(err) => Err(err.into()),
        };

        match fetched {
            Ok(manifest) => {
                *self.cache.write() = Arc::new(manifest);
                *self.last_fetch.write() = Some(Utc::now());
                tracing::debug!("manifest cache refreshed from durable store");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "manifest refresh failed; serving stale cache");
                Err(err)
            }
        }
    }

    /// Write-path steps 3–5 for a mutated snapshot: persist, back up,
    /// refresh. The cache is re-derived from the durable store, never
    /// assigned the in-memory snapshot directly.
    ///
    /// # Errors
    /// The first failing step's [`RepoError`]; later steps do not run.
    pub async fn commit(&self, manifest: &Manifest) -> Result<(), RepoError> {
        self.persist(manifest).await?;
        self.backup(manifest).await?;
        self.refresh_from_durable().await
    }

    /// Admin/migration flow: deep-compare the durable manifest against the
    /// local replica and overwrite the replica when they differ.
    ///
    /// # Errors
    /// [`RepoError`] when the durable snapshot cannot be fetched or the
    /// replica cannot be rewritten.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome, RepoError> {
        let bytes = self.durable.get(&self.manifest_key).await?;
        let durable = Manifest::from_json_bytes(&bytes)?;
        let local = self.replica.load().await.manifest;

        if durable == local {
            return Ok(ReconcileOutcome { changed: false });
        }

        self.replica.save(&durable).await?;
        tracing::info!("local replica overwritten from durable manifest");
        Ok(ReconcileOutcome { changed: true })
    }
}
