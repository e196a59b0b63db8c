//! Repository layer.
//!
//! Each repository holds a [`Database`](crate::Database) and implements one of
//! the `sketchmap_core` storage contracts. Methods open a connection per call
//! and release it before returning, whatever the outcome.

pub mod blob_repo;
pub mod request_repo;

pub use blob_repo::BlobRepo;
pub use request_repo::RequestRepo;
