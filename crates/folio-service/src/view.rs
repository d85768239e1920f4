//! Client-facing track views with signed URLs.

use indexmap::IndexMap;
use serde::Serialize;

/// Media URLs rendered for one track. The same single/pair split as stored
/// media, but holding time-limited URLs instead of object keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrackMediaView {
    /// Before/after comparison pair.
    Comparison {
        /// Signed URL of the untreated version.
        before: String,
        /// Signed URL of the treated version.
        after: String,
    },
    /// Single audio source.
    Single {
        /// Signed URL of the audio file.
        src: String,
    },
    /// Link-only track; nothing to sign.
    Linked {},
}

/// One track as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    /// Track identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Artist name.
    pub artist: String,
    /// Link-type → URL mapping, passed through unchanged.
    pub links: IndexMap<String, String>,
    /// Signed media URLs, inlined like the stored shape.
    #[serde(flatten)]
    pub media: TrackMediaView,
}

/// One bucket with its rendered tracks, as returned by the list-all
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketListing {
    /// Bucket name (serialized as `type` for the UI).
    #[serde(rename = "type")]
    pub bucket: String,
    /// Rendered tracks in manifest order.
    pub tracks: Vec<TrackView>,
}
