//! Runtime configuration, loadable from flags or environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Folio server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "folio-server", version, about = "Music-portfolio track backend")]
pub struct Config {
    /// Socket address to listen on.
    #[arg(long, env = "FOLIO_BIND", default_value = "127.0.0.1:4000")]
    pub bind: SocketAddr,

    /// S3 bucket holding audio objects and the manifest.
    #[arg(long, env = "FOLIO_S3_BUCKET", default_value = "folio-media")]
    pub s3_bucket: String,

    /// S3 region override.
    #[arg(long, env = "FOLIO_S3_REGION")]
    pub s3_region: Option<String>,

    /// Custom S3-compatible endpoint (MinIO etc.); implies path style.
    #[arg(long, env = "FOLIO_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Durable object key of the manifest JSON.
    #[arg(long, env = "FOLIO_MANIFEST_KEY", default_value = folio_repo::DEFAULT_MANIFEST_KEY)]
    pub manifest_key: String,

    /// Path of the local manifest replica.
    #[arg(long, env = "FOLIO_REPLICA_PATH", default_value = "data/manifest.json")]
    pub replica_path: PathBuf,

    /// Cache refresh cadence in milliseconds.
    #[arg(long, env = "FOLIO_REFRESH_INTERVAL_MS", default_value_t = 30_000)]
    pub refresh_interval_ms: u64,

    /// Lifetime of signed media URLs in seconds.
    #[arg(long, env = "FOLIO_URL_TTL_SECS", default_value_t = 3600)]
    pub url_ttl_secs: u64,

    /// Bound on a single mutating request in seconds.
    #[arg(long, env = "FOLIO_WRITE_TIMEOUT_SECS", default_value_t = 30)]
    pub write_timeout_secs: u64,

    /// Use an in-memory store instead of S3 (local development only).
    #[arg(long, env = "FOLIO_MEMORY_STORE")]
    pub memory_store: bool,
}

impl Config {
    /// Refresh cadence as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Signed-URL lifetime as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl_secs)
    }

    /// Write bound as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}
