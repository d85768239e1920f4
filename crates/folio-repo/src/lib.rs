//! Folio Manifest Repository
//!
//! The consistency core: one owned repository instance mediates every
//! transition between the three manifest copies:
//! - the **in-memory cache** read by all listing requests
//! - the **durable copy** in object storage (canonical in production)
//! - the **local replica** file (advisory mirror)
//!
//! Mutations follow a five-step write-path protocol: load an authoritative
//! snapshot, mutate in memory, persist to the replica, back up to the
//! durable store, then re-derive the cache *from the durable store* so the
//! cache always reflects what is actually durable.
//!
//! The protocol is not transactional: there is no compare-and-swap on the
//! durable manifest object, so concurrent writers in different processes
//! are last-write-wins. Writers within one process are serialized by the
//! repository's write lock. See `DESIGN.md` at the workspace root.

#![warn(missing_docs)]

pub mod error;
pub mod refresh;
pub mod repository;

// Re-exports
pub use error::RepoError;
pub use refresh::RefreshHandle;
pub use repository::{
    ManifestRepository, ReconcileOutcome, DEFAULT_MANIFEST_KEY, DEFAULT_REFRESH_INTERVAL,
};
