//! Testing utilities for the Folio workspace
//!
//! Shared fixtures: canned manifests and tracks, pre-seeded memory stores,
//! temp-dir replicas.

#![allow(missing_docs)]

use std::sync::Arc;

use bytes::Bytes;
use folio_manifest::{Manifest, Track};
use folio_store::{LocalReplica, MemoryStore};
use tempfile::TempDir;

/// A WIP-shaped track with a deterministic object key.
pub fn wip_track(title: &str, artist: &str) -> Track {
    let slug = title.to_lowercase().replace(' ', "-");
    Track::single(
        title,
        artist,
        Default::default(),
        format!("tracks/wip/{slug}.mp3"),
    )
}

/// A REEL-shaped track with before/after object keys.
pub fn reel_track(title: &str, artist: &str) -> Track {
    let slug = title.to_lowercase().replace(' ', "-");
    Track::comparison(
        title,
        artist,
        Default::default(),
        format!("tracks/reel/{slug}_before.wav"),
        format!("tracks/reel/{slug}_after.wav"),
    )
}

/// Default buckets plus one track in WIP and one comparison pair in REEL.
pub fn sample_manifest() -> Manifest {
    let mut manifest = Manifest::default();
    manifest
        .ensure_bucket("WIP")
        .push(wip_track("First Sketch", "Folio"));
    manifest
        .ensure_bucket("REEL")
        .push(reel_track("Client Mix", "Client"));
    manifest
}

/// Memory store with `manifest` serialized under `manifest_key`, plus every
/// object the manifest references (so deletes of real keys are observable).
pub fn seeded_store(manifest_key: &str, manifest: &Manifest) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    seed_manifest(&store, manifest_key, manifest);
    store
}

/// (Re-)seed a store with a manifest and its referenced objects.
pub fn seed_manifest(store: &MemoryStore, manifest_key: &str, manifest: &Manifest) {
    block_on_put(
        store,
        manifest_key,
        Bytes::from(manifest.to_json_bytes().unwrap()),
        "application/json",
    );
    for (_, tracks) in manifest.buckets() {
        for track in tracks {
            for key in track.media.object_keys() {
                block_on_put(store, key, Bytes::from_static(b"audio-bytes"), "audio/mpeg");
            }
        }
    }
}

/// Replica rooted in a fresh temp dir; keep the `TempDir` alive for the
/// duration of the test.
pub fn temp_replica() -> (TempDir, LocalReplica) {
    let dir = TempDir::new().unwrap();
    let replica = LocalReplica::new(dir.path().join("data/manifest.json"));
    (dir, replica)
}

fn block_on_put(store: &MemoryStore, key: &str, bytes: Bytes, content_type: &str) {
    use folio_store::DurableStore;
    // MemoryStore's async ops never actually await, so fixtures can run in
    // sync setup code outside any runtime.
    futures::executor::block_on(store.put(key, bytes, content_type)).unwrap();
}
