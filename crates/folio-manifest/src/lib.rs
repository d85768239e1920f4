//! Folio Manifest Model
//!
//! The manifest is the single source of truth for track metadata: an ordered
//! mapping from bucket name to a list of tracks, serialized as one JSON
//! object. This crate owns:
//! - **Manifest**: the bucket map with dynamic bucket discovery
//! - **Track**: one audio item's metadata record
//! - **TrackMedia**: the single-src vs. before/after media shapes
//!
//! # Example
//!
//! ```rust
//! use folio_manifest::{Manifest, Track};
//!
//! let mut manifest = Manifest::default();
//! let track = Track::single("Demo", "Test Artist", Default::default(), "tracks/wip/demo.mp3");
//! let id = track.id.clone();
//! manifest.ensure_bucket("WIP").push(track);
//!
//! assert!(manifest.find_track(&id).is_some());
//! assert_eq!(manifest.bucket_keys(), vec!["WIP", "REEL", "SCORING"]);
//! ```

#![warn(missing_docs)]

pub mod manifest;
pub mod track;

// Re-exports
pub use manifest::{BucketValue, Manifest, DEFAULT_BUCKETS};
pub use track::{normalize_bucket_name, Track, TrackMedia, COMPARISON_BUCKET};
