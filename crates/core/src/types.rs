use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Generated identifier of a stored upload.
pub type BlobId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Client-visible identifier correlating all jobs of one submitted request.
///
/// Issued once at admission and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Issue a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a client.
    ///
    /// Returns `None` for anything that is not a UUID; callers decide how an
    /// unparseable id surfaces (usually as an unknown request).
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    /// Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// JobHandle
// ---------------------------------------------------------------------------

/// Opaque identifier the execution facility hands back for a submitted job.
///
/// Stored verbatim and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_parses_uuid() {
        let id = RequestId::parse("16fd2706-8baf-433b-82eb-8c7fada847da").unwrap();
        assert_eq!(id.to_string(), "16fd2706-8baf-433b-82eb-8c7fada847da");
    }

    #[test]
    fn request_id_rejects_garbage() {
        assert!(RequestId::parse("").is_none());
        assert!(RequestId::parse("foo").is_none());
        assert!(RequestId::parse("non-existent-id").is_none());
    }

    #[test]
    fn parse_and_from_str_agree_on_padded_ids() {
        let raw = " 16fd2706-8baf-433b-82eb-8c7fada847da\n";
        let parsed = RequestId::parse(raw).unwrap();
        let from_str: RequestId = raw.parse().unwrap();
        assert_eq!(parsed, from_str);
        assert!("  ".parse::<RequestId>().is_err());
    }

    #[test]
    fn fresh_request_ids_differ() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn job_handle_serializes_as_plain_string() {
        let handle = JobHandle::new("h1");
        assert_eq!(serde_json::to_string(&handle).unwrap(), "\"h1\"");
    }
}
