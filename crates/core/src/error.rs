use crate::job_kind::JobKind;
use crate::types::{DbId, RequestId};

/// Broad response class of a [`CoreError`].
///
/// Callers map these to outcomes (HTTP status, exit code) without matching
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The client sent something unusable. Never retried.
    Rejected,
    /// The request id, kind or handle does not exist.
    NotFound,
    /// The write collides with an existing record.
    Conflict,
    /// Backing infrastructure is unreachable or failing.
    Unavailable,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid job kind: {0}")]
    InvalidKind(String),

    #[error("Upload limits exceeded: {observed} pixels uploaded, at most {limit} allowed")]
    UploadLimitsExceeded { limit: u64, observed: u64 },

    #[error("Unreadable image '{file_name}': {reason}")]
    UnreadableImage { file_name: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No request found for id {0}")]
    UnknownRequestId(String),

    #[error("Request {request_id} has no job of kind {kind}")]
    UnknownKindForRequest { request_id: RequestId, kind: JobKind },

    #[error("Request id {0} is already registered")]
    DuplicateRequestId(RequestId),

    #[error("No blob with id {0}")]
    UnknownBlob(DbId),

    #[error("Execution facility does not know job {0}")]
    UnknownJobHandle(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Job runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidKind(_)
            | Self::UploadLimitsExceeded { .. }
            | Self::UnreadableImage { .. }
            | Self::Validation(_) => ErrorClass::Rejected,
            Self::UnknownRequestId(_)
            | Self::UnknownKindForRequest { .. }
            | Self::UnknownBlob(_)
            | Self::UnknownJobHandle(_) => ErrorClass::NotFound,
            Self::DuplicateRequestId(_) => ErrorClass::Conflict,
            Self::StorageUnavailable(_) | Self::RuntimeUnavailable(_) => ErrorClass::Unavailable,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_faults_are_rejected() {
        assert_eq!(CoreError::InvalidKind("foo".into()).class(), ErrorClass::Rejected);
        assert_eq!(
            CoreError::UploadLimitsExceeded { limit: 10, observed: 52 }.class(),
            ErrorClass::Rejected
        );
    }

    #[test]
    fn unknown_id_and_unknown_kind_are_both_not_found() {
        let id = RequestId::new();
        assert_eq!(CoreError::UnknownRequestId(id.to_string()).class(), ErrorClass::NotFound);
        assert_eq!(
            CoreError::UnknownKindForRequest { request_id: id, kind: JobKind::SketchMap }.class(),
            ErrorClass::NotFound
        );
    }

    #[test]
    fn limits_message_carries_both_numbers() {
        let msg = CoreError::UploadLimitsExceeded { limit: 10, observed: 52 }.to_string();
        assert!(msg.contains("52"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn infrastructure_faults_are_unavailable() {
        assert_eq!(CoreError::StorageUnavailable("down".into()).class(), ErrorClass::Unavailable);
        assert_eq!(CoreError::RuntimeUnavailable("down".into()).class(), ErrorClass::Unavailable);
    }
}
