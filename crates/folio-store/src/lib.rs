//! Folio Storage Adapters
//!
//! Two stores back the manifest subsystem:
//! - **DurableStore**: the object-storage seam (audio binaries + the
//!   canonical manifest JSON), with an S3 backend for production and an
//!   in-memory backend for tests and local development
//! - **LocalReplica**: the on-disk manifest mirror, advisory only
//!
//! Neither adapter retries; retry policy belongs to callers (and the
//! manifest repository deliberately performs none).

#![warn(missing_docs)]

pub mod durable;
pub mod error;
pub mod memory;
pub mod replica;
pub mod s3;

// Re-exports
pub use durable::DurableStore;
pub use error::{ReplicaError, StoreError};
pub use memory::MemoryStore;
pub use replica::{LocalReplica, ReplicaSnapshot, ReplicaSource};
pub use s3::{S3Config, S3Store};
