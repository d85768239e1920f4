//! Track CRUD over the manifest repository and the durable store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use folio_manifest::{normalize_bucket_name, BucketValue, Track, TrackMedia, COMPARISON_BUCKET};
use folio_repo::ManifestRepository;
use folio_store::DurableStore;
use indexmap::IndexMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::view::{BucketListing, TrackMediaView, TrackView};

/// Default lifetime of signed media URLs.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(3600);

/// Default bound on a single mutating operation.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// One uploaded audio file.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original client filename.
    pub filename: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

/// Input of [`TrackService::upload`].
#[derive(Debug, Clone)]
pub struct NewTrack {
    /// Target bucket, as supplied by the client (normalized internally).
    pub bucket: String,
    /// Display title.
    pub title: String,
    /// Artist name.
    pub artist: String,
    /// Raw `links` JSON payload, if any.
    pub links_json: Option<String>,
    /// One file, or two for the comparison bucket.
    pub files: Vec<UploadFile>,
}

/// Partial update for [`TrackService::update_by_id`]; absent fields keep
/// their current value, media keys are never touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPatch {
    /// New title.
    pub title: Option<String>,
    /// New artist.
    pub artist: Option<String>,
    /// New link mapping, replacing the old one wholesale.
    pub links: Option<IndexMap<String, String>>,
}

/// Business logic for track CRUD.
///
/// Reads come from the repository's in-memory cache; mutations run the
/// repository's write-path protocol under its write lock, bounded by
/// `write_timeout`.
pub struct TrackService {
    repo: Arc<ManifestRepository>,
    store: Arc<dyn DurableStore>,
    url_ttl: Duration,
    write_timeout: Duration,
}

impl std::fmt::Debug for TrackService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackService")
            .field("url_ttl", &self.url_ttl)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

impl TrackService {
    /// Service with default URL TTL and write timeout.
    #[must_use]
    pub fn new(repo: Arc<ManifestRepository>, store: Arc<dyn DurableStore>) -> Self {
        Self::with_limits(repo, store, DEFAULT_URL_TTL, DEFAULT_WRITE_TIMEOUT)
    }

    /// Service with explicit URL TTL and write timeout.
    #[must_use]
    pub fn with_limits(
        repo: Arc<ManifestRepository>,
        store: Arc<dyn DurableStore>,
        url_ttl: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            store,
            url_ttl,
            write_timeout,
        }
    }

    /// Every bucket of the cached manifest with signed track views.
    pub async fn list_all(&self) -> Vec<BucketListing> {
        let manifest = self.repo.cached();
        let mut listings = Vec::new();
        for (bucket, tracks) in manifest.buckets() {
            let mut views = Vec::with_capacity(tracks.len());
            for track in tracks {
                views.push(self.render(track).await);
            }
            listings.push(BucketListing {
                bucket: bucket.to_string(),
                tracks: views,
            });
        }
        listings
    }

    /// Signed track views of a single bucket.
    ///
    /// # Errors
    /// [`ServiceError::InvalidType`] when the normalized bucket name is not
    /// a track bucket in the cached manifest.
    pub async fn list_by_type(&self, raw_type: &str) -> Result<Vec<TrackView>, ServiceError> {
        let bucket = normalize_bucket_name(raw_type);
        let manifest = self.repo.cached();
        let tracks = manifest
            .tracks(&bucket)
            .ok_or_else(|| ServiceError::InvalidType(bucket.clone()))?;

        let mut views = Vec::with_capacity(tracks.len());
        for track in tracks {
            views.push(self.render(track).await);
        }
        Ok(views)
    }

    /// Validate, store the audio object(s), and append a new track to its
    /// bucket (creating the bucket when new) via the write-path protocol.
    ///
    /// On failure or timeout before the durable manifest write completed,
    /// the uploaded objects are removed again best-effort so a rejected
    /// request leaves no orphans. Once the backup step has succeeded the
    /// durable manifest references the objects, so they are never deleted;
    /// a refresh failure after that point only leaves the cache stale until
    /// the next background tick and the upload still reports success.
    ///
    /// # Errors
    /// Client-input variants before any mutation; [`ServiceError::Timeout`]
    /// / store / repo variants from the bounded write path.
    pub async fn upload(&self, new: NewTrack) -> Result<Track, ServiceError> {
        let bucket = normalize_bucket_name(&new.bucket);
        if bucket.is_empty() {
            return Err(ServiceError::MissingField("type"));
        }
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::MissingField("title"));
        }
        let artist = new.artist.trim().to_string();
        if artist.is_empty() {
            return Err(ServiceError::MissingField("artist"));
        }
        let links = parse_links(new.links_json.as_deref())?;

        let expected = required_files(&bucket);
        if new.files.len() != expected {
            return Err(ServiceError::InvalidFileCount {
                bucket,
                expected,
                actual: new.files.len(),
            });
        }

        let id = Uuid::new_v4().to_string();
        let keys: Vec<String> = new
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| object_key(&bucket, &id, index, &file.filename))
            .collect();

        let media = match keys.as_slice() {
            [before, after] => TrackMedia::Comparison {
                before: before.clone(),
                after: after.clone(),
            },
            [src] => TrackMedia::Single { src: src.clone() },
            _ => unreachable!("file count validated above"),
        };
        let track = Track {
            id,
            title,
            artist,
            links,
            media,
        };

        tracing::info!(id = %track.id, %bucket, files = keys.len(), "uploading track");

        let backed_up = AtomicBool::new(false);
        let attempt = tokio::time::timeout(
            self.write_timeout,
            self.upload_protocol(&bucket, &track, new.files, &keys, &backed_up),
        )
        .await;

        match attempt {
            Ok(Ok(())) => Ok(track),
            Ok(Err(err)) => {
                if !backed_up.load(Ordering::SeqCst) {
                    self.compensate(&keys).await;
                }
                Err(err)
            }
            Err(_) => {
                if !backed_up.load(Ordering::SeqCst) {
                    self.compensate(&keys).await;
                }
                Err(ServiceError::Timeout)
            }
        }
    }

    /// Remove a track and its stored object(s).
    ///
    /// Objects are deleted before the manifest write; a second delete of
    /// the same ID fails with `NotFound` before any store call.
    ///
    /// # Errors
    /// [`ServiceError::NotFound`], [`ServiceError::Timeout`], or the
    /// store/repo failure of the write path.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        match tokio::time::timeout(self.write_timeout, self.delete_protocol(id)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout),
        }
    }

    /// Replace a track's title/artist/links, leaving media keys untouched.
    ///
    /// # Errors
    /// [`ServiceError::NotFound`], [`ServiceError::Timeout`], or the
    /// store/repo failure of the write path.
    pub async fn update_by_id(&self, id: &str, patch: TrackPatch) -> Result<(), ServiceError> {
        match tokio::time::timeout(self.write_timeout, self.update_protocol(id, patch)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout),
        }
    }

    async fn upload_protocol(
        &self,
        bucket: &str,
        track: &Track,
        files: Vec<UploadFile>,
        keys: &[String],
        backed_up: &AtomicBool,
    ) -> Result<(), ServiceError> {
        for (file, key) in files.into_iter().zip(keys) {
            self.store.put(key, file.bytes, &file.content_type).await?;
        }

        let _guard = self.repo.lock_writes().await;
        let mut manifest = self.repo.load_authoritative().await?;
        // Non-bucket manifest values (notes, counters) must never be
        // clobbered by an upload targeting their key.
        if matches!(manifest.entry(bucket), Some(BucketValue::Other(_))) {
            return Err(ServiceError::InvalidType(bucket.to_string()));
        }
        manifest.ensure_bucket(bucket).push(track.clone());

        self.repo.persist(&manifest).await?;
        self.repo.backup(&manifest).await?;
        backed_up.store(true, Ordering::SeqCst);

        // The mutation is durable from here on. A failed refresh leaves the
        // cache stale until the next background tick and logs its own
        // warning; the objects stay because the durable manifest now
        // references them.
        let _ = self.repo.refresh_from_durable().await;
        Ok(())
    }

    async fn delete_protocol(&self, id: &str) -> Result<(), ServiceError> {
        let _guard = self.repo.lock_writes().await;
        let mut manifest = self.repo.load_authoritative().await?;

        let keys: Vec<String> = match manifest.find_track(id) {
            Some((_, track)) => track.media.object_keys().iter().map(|k| (*k).to_string()).collect(),
            None => return Err(ServiceError::NotFound(id.to_string())),
        };

        // Objects go first; a crash between here and the commit leaves the
        // manifest referencing missing objects until an out-of-band sweep.
        for key in &keys {
            self.store.delete(key).await?;
        }

        manifest.remove_track(id);
        self.repo.commit(&manifest).await?;
        tracing::info!(%id, objects = keys.len(), "track deleted");
        Ok(())
    }

    async fn update_protocol(&self, id: &str, patch: TrackPatch) -> Result<(), ServiceError> {
        let _guard = self.repo.lock_writes().await;
        let mut manifest = self.repo.load_authoritative().await?;

        {
            let Some(track) = manifest.find_track_mut(id) else {
                return Err(ServiceError::NotFound(id.to_string()));
            };
            if let Some(title) = patch.title {
                track.title = title;
            }
            if let Some(artist) = patch.artist {
                track.artist = artist;
            }
            if let Some(links) = patch.links {
                track.links = links;
            }
        }

        self.repo.commit(&manifest).await?;
        tracing::info!(%id, "track updated");
        Ok(())
    }

    async fn render(&self, track: &Track) -> TrackView {
        let media = match &track.media {
            TrackMedia::Comparison { before, after } => TrackMediaView::Comparison {
                before: self.sign_or_raw(before).await,
                after: self.sign_or_raw(after).await,
            },
            TrackMedia::Single { src } => TrackMediaView::Single {
                src: self.sign_or_raw(src).await,
            },
            TrackMedia::Linked {} => TrackMediaView::Linked {},
        };
        TrackView {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            links: track.links.clone(),
            media,
        }
    }

    async fn sign_or_raw(&self, key: &str) -> String {
        match self.store.signed_url(key, self.url_ttl).await {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(%key, error = %err, "signing failed; returning raw key");
                key.to_string()
            }
        }
    }

    async fn compensate(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.store.delete(key).await {
                tracing::warn!(%key, error = %err, "failed to remove orphaned upload");
            }
        }
    }
}

/// How many files a bucket requires per upload.
fn required_files(bucket: &str) -> usize {
    if bucket == COMPARISON_BUCKET {
        2
    } else {
        1
    }
}

/// Parse the client `links` payload; absent or blank means no links.
fn parse_links(raw: Option<&str>) -> Result<IndexMap<String, String>, ServiceError> {
    match raw {
        None => Ok(IndexMap::new()),
        Some(s) if s.trim().is_empty() => Ok(IndexMap::new()),
        Some(s) => serde_json::from_str(s).map_err(|err| ServiceError::InvalidLinks(err.to_string())),
    }
}

/// Object key layout: `tracks/<bucket-lowercase>/<id>[_version2]_<filename>`.
fn object_key(bucket: &str, id: &str, index: usize, filename: &str) -> String {
    let version = if index == 1 { "_version2" } else { "" };
    format!(
        "tracks/{}/{}{}_{}",
        bucket.to_lowercase(),
        id,
        version,
        sanitize_filename(filename)
    )
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
