//! Result resolution: (request id, kind) → job state.
//!
//! Holds no state of its own. Every call goes to the registry and then to the
//! runtime, so repeated polling sees the latest state and changes nothing.

use std::sync::Arc;

use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::registry::RequestRegistry;
use sketchmap_core::types::RequestId;

use crate::dispatcher::Dispatcher;
use crate::runtime::JobState;

#[derive(Clone)]
pub struct Resolver {
    registry: Arc<dyn RequestRegistry>,
    dispatcher: Dispatcher,
}

impl Resolver {
    pub fn new(registry: Arc<dyn RequestRegistry>, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Resolve raw client input.
    ///
    /// The kind is checked first, so a bad kind is reported as
    /// [`CoreError::InvalidKind`] whatever the id. An id that is not a UUID
    /// cannot have been issued and is reported as
    /// [`CoreError::UnknownRequestId`].
    pub async fn resolve(&self, request_id: &str, kind: &str) -> Result<JobState, CoreError> {
        let kind = JobKind::parse(kind)?;
        let request_id = RequestId::parse(request_id)
            .ok_or_else(|| CoreError::UnknownRequestId(request_id.to_string()))?;
        self.resolve_kind(request_id, kind).await
    }

    pub async fn resolve_kind(&self, request_id: RequestId, kind: JobKind) -> Result<JobState, CoreError> {
        let handle = self.registry.get_handle(request_id, kind).await?;
        self.dispatcher.status(&handle).await
    }

    /// Drop the registry record of a request. Unknown and malformed ids
    /// succeed. Jobs already running are not cancelled.
    pub async fn delete(&self, request_id: &str) -> Result<(), CoreError> {
        match RequestId::parse(request_id) {
            Some(id) => {
                self.registry.delete(id).await?;
                tracing::info!(request_id = %id, "Request record deleted");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
