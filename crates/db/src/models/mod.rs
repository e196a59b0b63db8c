//! Row structs matching the database tables.
//!
//! Each row converts into the matching `sketchmap_core` record type.

pub mod blob;
pub mod request;
