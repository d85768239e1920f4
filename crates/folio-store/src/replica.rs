//! Local on-disk manifest replica.

use std::path::{Path, PathBuf};

use folio_manifest::Manifest;

use crate::error::ReplicaError;

/// Where a loaded replica snapshot actually came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaSource {
    /// Parsed from the replica file.
    File,
    /// File absent; default manifest substituted (expected on first run).
    AbsentDefault,
    /// File unreadable or unparseable; default manifest substituted.
    CorruptDefault,
}

/// A loaded manifest plus the flag telling callers whether the fallback
/// fired. "Genuinely empty" and "corrupted-file empty" are distinguishable.
#[derive(Debug, Clone)]
pub struct ReplicaSnapshot {
    /// The manifest (default-empty when the fallback fired).
    pub manifest: Manifest,
    /// Provenance of the snapshot.
    pub source: ReplicaSource,
}

/// The on-disk manifest mirror.
///
/// Advisory only: when this file disagrees with the durable store, the
/// durable store wins. Writes are plain overwrites with no file locking
/// (single-writer, single-process deployment).
#[derive(Debug, Clone)]
pub struct LocalReplica {
    path: PathBuf,
}

impl LocalReplica {
    /// Replica over the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the replica file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the replica, falling back to the default manifest instead of
    /// erroring. Fallbacks are logged at WARN and flagged in the snapshot.
    pub async fn load(&self) -> ReplicaSnapshot {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "local manifest absent; using default");
                return ReplicaSnapshot {
                    manifest: Manifest::default(),
                    source: ReplicaSource::AbsentDefault,
                };
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "local manifest unreadable; using default"
                );
                return ReplicaSnapshot {
                    manifest: Manifest::default(),
                    source: ReplicaSource::CorruptDefault,
                };
            }
        };

        match Manifest::from_json_bytes(&bytes) {
            Ok(manifest) => ReplicaSnapshot {
                manifest,
                source: ReplicaSource::File,
            },
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "local manifest unparseable; using default"
                );
                ReplicaSnapshot {
                    manifest: Manifest::default(),
                    source: ReplicaSource::CorruptDefault,
                }
            }
        }
    }

    /// Overwrite the replica file, creating its parent directory if needed.
    ///
    /// # Errors
    /// [`ReplicaError`] on serialization or filesystem failure.
    pub async fn save(&self, manifest: &Manifest) -> Result<(), ReplicaError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = manifest.to_json_bytes()?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_manifest::Track;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn absent_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let replica = LocalReplica::new(dir.path().join("data/manifest.json"));

        let snapshot = replica.load().await;
        assert_eq!(snapshot.source, ReplicaSource::AbsentDefault);
        assert_eq!(snapshot.manifest, Manifest::default());
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_default_with_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let snapshot = LocalReplica::new(&path).load().await;
        assert_eq!(snapshot.source, ReplicaSource::CorruptDefault);
        assert_eq!(snapshot.manifest, Manifest::default());
    }

    #[tokio::test]
    async fn save_creates_parent_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let replica = LocalReplica::new(dir.path().join("nested/data/manifest.json"));

        let mut manifest = Manifest::default();
        manifest.ensure_bucket("WIP").push(Track::single(
            "Demo",
            "Test Artist",
            Default::default(),
            "tracks/wip/demo.mp3",
        ));
        replica.save(&manifest).await.unwrap();

        let snapshot = replica.load().await;
        assert_eq!(snapshot.source, ReplicaSource::File);
        assert_eq!(snapshot.manifest, manifest);
    }
}
