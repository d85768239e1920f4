//! Track records and media shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The one bucket whose tracks carry a before/after object pair.
pub const COMPARISON_BUCKET: &str = "REEL";

/// Media reference(s) stored with a track.
///
/// Exactly one shape is valid per track: a single `src` object key, or a
/// `before`/`after` pair for the comparison bucket. Tracks carrying neither
/// (link-only entries from old manifests) fall into [`TrackMedia::Linked`]
/// and are passed through listings without signing.
///
/// Variant order matters: serde tries the pair first so a record with
/// `before`/`after` keys never half-matches as a single-src track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackMedia {
    /// Before/after object pair for A/B comparison playback.
    Comparison {
        /// Object key of the untreated version.
        before: String,
        /// Object key of the treated version.
        after: String,
    },
    /// Single audio object.
    Single {
        /// Object key of the audio file.
        src: String,
    },
    /// No stored media; the track only carries external links.
    Linked {},
}

impl TrackMedia {
    /// Object keys referenced by this media shape.
    #[must_use]
    pub fn object_keys(&self) -> Vec<&str> {
        match self {
            Self::Comparison { before, after } => vec![before, after],
            Self::Single { src } => vec![src],
            Self::Linked {} => Vec::new(),
        }
    }
}

/// One audio item's metadata record.
///
/// The `id` is assigned at creation and immutable; lookups compare it as a
/// plain string so manifests written by earlier versions keep working even
/// if their IDs are not canonical UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Globally unique identifier, assigned at creation.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Artist name.
    pub artist: String,
    /// Link-type → URL mapping (e.g. `song`, `artist`).
    #[serde(default)]
    pub links: IndexMap<String, String>,
    /// Stored media reference(s), inlined into the track object.
    #[serde(flatten)]
    pub media: TrackMedia,
}

impl Track {
    /// Create a single-src track with a fresh UUID.
    #[must_use]
    pub fn single(
        title: impl Into<String>,
        artist: impl Into<String>,
        links: IndexMap<String, String>,
        src: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            artist: artist.into(),
            links,
            media: TrackMedia::Single { src: src.into() },
        }
    }

    /// Create a before/after comparison track with a fresh UUID.
    #[must_use]
    pub fn comparison(
        title: impl Into<String>,
        artist: impl Into<String>,
        links: IndexMap<String, String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            artist: artist.into(),
            links,
            media: TrackMedia::Comparison {
                before: before.into(),
                after: after.into(),
            },
        }
    }
}

/// Normalize a client-supplied bucket name: trim whitespace, strip one pair
/// of surrounding quotes, uppercase.
///
/// `" reel "` and `"\"wip\""` normalize to `REEL` and `WIP`.
#[must_use]
pub fn normalize_bucket_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_track_round_trips_with_inline_src() {
        let track = Track::single("Demo", "Test Artist", IndexMap::new(), "tracks/wip/demo.mp3");
        let json = serde_json::to_value(&track).unwrap();

        assert_eq!(json["src"], "tracks/wip/demo.mp3");
        assert!(json.get("before").is_none());

        let back: Track = serde_json::from_value(json).unwrap();
        assert_eq!(back, track);
    }

    #[test]
    fn comparison_track_round_trips_with_pair() {
        let track = Track::comparison(
            "Mix",
            "Client",
            IndexMap::new(),
            "tracks/reel/a_before.wav",
            "tracks/reel/a_after.wav",
        );
        let json = serde_json::to_value(&track).unwrap();

        assert_eq!(json["before"], "tracks/reel/a_before.wav");
        assert_eq!(json["after"], "tracks/reel/a_after.wav");
        assert!(json.get("src").is_none());

        let back: Track = serde_json::from_value(json).unwrap();
        assert_eq!(back.media, track.media);
    }

    #[test]
    fn track_without_media_keys_parses_as_linked() {
        let track: Track = serde_json::from_value(serde_json::json!({
            "id": "legacy-1",
            "title": "External",
            "artist": "Someone",
            "links": {"song": "https://example.com/song"}
        }))
        .unwrap();

        assert_eq!(track.media, TrackMedia::Linked {});
        assert!(track.media.object_keys().is_empty());
    }

    #[test]
    fn pair_wins_over_single_when_both_shapes_could_match() {
        // A record with before/after must never parse as Linked or Single.
        let track: Track = serde_json::from_value(serde_json::json!({
            "id": "x",
            "title": "t",
            "artist": "a",
            "before": "b.wav",
            "after": "a.wav"
        }))
        .unwrap();

        assert!(matches!(track.media, TrackMedia::Comparison { .. }));
    }

    #[test]
    fn normalize_strips_quotes_and_case() {
        assert_eq!(normalize_bucket_name(" reel "), "REEL");
        assert_eq!(normalize_bucket_name("\"wip\""), "WIP");
        assert_eq!(normalize_bucket_name("'Scoring'"), "SCORING");
        assert_eq!(normalize_bucket_name("artist_jane"), "ARTIST_JANE");
    }
}
