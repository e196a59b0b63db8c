//! Domain layer of the sketch map request/job correlation service.
//!
//! Pure types and checks plus the contracts (`RequestRegistry`, `BlobStore`)
//! that the database crate implements. No I/O happens here.

pub mod blob;
pub mod error;
pub mod job_kind;
pub mod registry;
pub mod types;
pub mod upload;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
