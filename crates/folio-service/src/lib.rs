//! Folio Track Service
//!
//! Business logic for track CRUD on top of the manifest repository and the
//! durable store:
//! - listings render cached manifest state with time-limited signed URLs
//! - upload/delete/update run the repository's write-path protocol
//! - client input is validated before any store mutation
//! - every mutating call is bounded by a write timeout, with best-effort
//!   compensation deletes for objects uploaded by a failed upload

#![warn(missing_docs)]

pub mod error;
pub mod service;
pub mod view;

// Re-exports
pub use error::ServiceError;
pub use service::{NewTrack, TrackPatch, TrackService, UploadFile};
pub use view::{BucketListing, TrackMediaView, TrackView};
