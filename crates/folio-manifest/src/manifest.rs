//! The manifest: an ordered bucket map with dynamic bucket discovery.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::track::Track;

/// Buckets present in a freshly initialized manifest.
pub const DEFAULT_BUCKETS: [&str; 3] = ["WIP", "REEL", "SCORING"];

/// One top-level manifest value.
///
/// Bucket discovery is structural: any key holding a track sequence is a
/// bucket; anything else (notes, counters, future metadata) is carried
/// through untouched and ignored by bucket enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketValue {
    /// A track bucket.
    Tracks(Vec<Track>),
    /// A non-bucket value, preserved verbatim across round-trips.
    Other(serde_json::Value),
}

/// Mapping from bucket name to tracks (or opaque non-bucket values).
///
/// Key order is preserved so serializing a loaded manifest reproduces the
/// original layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: IndexMap<String, BucketValue>,
}

impl Default for Manifest {
    /// The empty manifest: `{WIP: [], REEL: [], SCORING: []}`.
    fn default() -> Self {
        let mut entries = IndexMap::new();
        for bucket in DEFAULT_BUCKETS {
            entries.insert(bucket.to_string(), BucketValue::Tracks(Vec::new()));
        }
        Self { entries }
    }
}

impl Manifest {
    /// A manifest with no entries at all (not even the default buckets).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Names of every track bucket, in manifest order.
    ///
    /// Non-sequence keys are skipped; `{WIP: [], NOTES: "x"}` yields
    /// `["WIP"]`.
    #[must_use]
    pub fn bucket_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(key, value)| match value {
                BucketValue::Tracks(_) => Some(key.as_str()),
                BucketValue::Other(_) => None,
            })
            .collect()
    }

    /// Iterate over `(bucket, tracks)` pairs in manifest order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[Track])> {
        self.entries.iter().filter_map(|(key, value)| match value {
            BucketValue::Tracks(tracks) => Some((key.as_str(), tracks.as_slice())),
            BucketValue::Other(_) => None,
        })
    }

    /// Tracks of a single bucket, `None` when the key is absent or not a
    /// track sequence.
    #[must_use]
    pub fn tracks(&self, bucket: &str) -> Option<&[Track]> {
        match self.entries.get(bucket) {
            Some(BucketValue::Tracks(tracks)) => Some(tracks.as_slice()),
            _ => None,
        }
    }

    /// Mutable tracks of an existing bucket.
    #[must_use]
    pub fn tracks_mut(&mut self, bucket: &str) -> Option<&mut Vec<Track>> {
        match self.entries.get_mut(bucket) {
            Some(BucketValue::Tracks(tracks)) => Some(tracks),
            _ => None,
        }
    }

    /// Mutable tracks of a bucket, creating an empty bucket if the key is
    /// new. This is how artist-specific buckets come into existence.
    ///
    /// A non-sequence value under the same key is replaced by a bucket.
    pub fn ensure_bucket(&mut self, bucket: impl Into<String>) -> &mut Vec<Track> {
        let slot = self
            .entries
            .entry(bucket.into())
            .or_insert_with(|| BucketValue::Tracks(Vec::new()));
        if !matches!(slot, BucketValue::Tracks(_)) {
            *slot = BucketValue::Tracks(Vec::new());
        }
        match slot {
            BucketValue::Tracks(tracks) => tracks,
            BucketValue::Other(_) => unreachable!("slot was just replaced by a bucket"),
        }
    }

    /// Locate a track by ID across every bucket (string comparison).
    #[must_use]
    pub fn find_track(&self, id: &str) -> Option<(&str, &Track)> {
        self.buckets()
            .find_map(|(bucket, tracks)| tracks.iter().find(|t| t.id == id).map(|t| (bucket, t)))
    }

    /// Mutable lookup by ID across every bucket.
    #[must_use]
    pub fn find_track_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.entries.values_mut().find_map(|value| match value {
            BucketValue::Tracks(tracks) => tracks.iter_mut().find(|t| t.id == id),
            BucketValue::Other(_) => None,
        })
    }

    /// Remove a track by ID, returning it when found.
    pub fn remove_track(&mut self, id: &str) -> Option<Track> {
        for value in self.entries.values_mut() {
            if let BucketValue::Tracks(tracks) = value {
                if let Some(pos) = tracks.iter().position(|t| t.id == id) {
                    return Some(tracks.remove(pos));
                }
            }
        }
        None
    }

    /// Raw access to a top-level entry (buckets and non-buckets alike).
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&BucketValue> {
        self.entries.get(key)
    }

    /// Insert a raw top-level entry, replacing any existing value.
    pub fn insert_entry(&mut self, key: impl Into<String>, value: BucketValue) {
        self.entries.insert(key.into(), value);
    }

    /// Serialize to the on-disk / durable JSON layout.
    ///
    /// # Errors
    /// Returns the underlying serde error (only possible for non-string
    /// values smuggled into `Other`).
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Parse a manifest from JSON bytes.
    ///
    /// # Errors
    /// Returns the underlying serde error when the payload is not a JSON
    /// object of the manifest layout.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
