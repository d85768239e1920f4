//! Folio HTTP Boundary
//!
//! Translates HTTP requests into track-service and repository calls:
//! - `GET /tracks` and `GET /tracks/:type`: cached listings with signed URLs
//! - `POST /tracks`: multipart upload
//! - `PUT /tracks/:id` and `DELETE /tracks/:id`: metadata update, removal
//! - `POST /admin/reconcile`: replica sync (migration flow)
//! - `GET /healthz`: store reachability and cache age
//!
//! No business logic lives here; handlers validate transport concerns and
//! convert every error into a uniform JSON body with the right status code.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use folio_repo::ManifestRepository;
use folio_service::TrackService;
use folio_store::DurableStore;

// Re-exports
pub use config::Config;
pub use error::ApiError;
pub use routes::router;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Track CRUD service.
    pub service: Arc<TrackService>,
    /// Manifest repository (for admin and health endpoints).
    pub repo: Arc<ManifestRepository>,
    /// Durable store (for the health probe only).
    pub store: Arc<dyn DurableStore>,
}
