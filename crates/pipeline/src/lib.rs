//! Job orchestration for the sketch map service.
//!
//! - [`runtime`]: the seam to the execution facility, an HTTP client for a
//!   remote task runtime and an in-process runtime.
//! - [`dispatcher`]: submits work per job kind and queries job status.
//! - [`admission`]: validate → store blobs → submit jobs → register.
//! - [`resolver`]: (request id, kind) → job state.

pub mod admission;
pub mod config;
pub mod dispatcher;
pub mod resolver;
pub mod runtime;

pub use admission::{Admission, NewRequest};
pub use config::RuntimeConfig;
pub use dispatcher::Dispatcher;
pub use resolver::Resolver;
pub use runtime::{JobPayload, JobRuntime, JobState};
