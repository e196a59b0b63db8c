use std::sync::Arc;

use sketchmap_core::registry::RequestRegistry;
use sketchmap_pipeline::{Admission, Resolver};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is itself `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Request registry, also probed by the health check.
    pub registry: Arc<dyn RequestRegistry>,
    /// Validate → store → submit → register.
    pub admission: Arc<Admission>,
    pub resolver: Resolver,
}
