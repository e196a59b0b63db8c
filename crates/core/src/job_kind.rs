//! Job kinds: the closed set of background work a request can ask for.
//!
//! Kinds travel as plain string tokens only at the system boundary; inside the
//! workspace they are always the [`JobKind`] enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category of background work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Render a printable sketch map.
    SketchMap,
    /// Score the map area's data quality.
    QualityReport,
    /// Extract markings from a photographed map as georeferenced rasters.
    RasterResults,
    /// Extract markings from a photographed map as vector features.
    VectorResults,
}

impl JobKind {
    /// Every kind, in declaration order.
    pub const ALL: [JobKind; 4] = [
        JobKind::SketchMap,
        JobKind::QualityReport,
        JobKind::RasterResults,
        JobKind::VectorResults,
    ];

    /// Kinds submitted when a new map is created.
    pub const MAP_CREATION: [JobKind; 2] = [JobKind::SketchMap, JobKind::QualityReport];

    /// Kinds submitted when marked-up maps are uploaded for digitizing.
    pub const DIGITIZE: [JobKind; 2] = [JobKind::RasterResults, JobKind::VectorResults];

    /// Wire token used by clients and in persisted mappings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SketchMap => "sketch-map",
            Self::QualityReport => "quality-report",
            Self::RasterResults => "raster-results",
            Self::VectorResults => "vector-results",
        }
    }

    /// Name of the task the execution facility runs for this kind.
    pub fn task_name(self) -> &'static str {
        match self {
            Self::SketchMap => "generate_sketch_map",
            Self::QualityReport => "generate_quality_report",
            Self::RasterResults => "generate_digitized_raster",
            Self::VectorResults => "generate_digitized_vector",
        }
    }

    /// Whether jobs of this kind read uploaded blobs.
    pub fn consumes_uploads(self) -> bool {
        matches!(self, Self::RasterResults | Self::VectorResults)
    }

    /// Parse a token received from a client.
    ///
    /// This is the kind check for string input (path segments, form
    /// fields); the resolver and the HTTP handlers call it directly. Untyped
    /// JSON values go through [`validate_kind`], which accepts exactly the
    /// same strings.
    pub fn parse(token: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == token)
            .ok_or_else(|| CoreError::InvalidKind(token.to_string()))
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate an untyped kind value as it arrives from a client payload.
///
/// String input is already checked by [`JobKind::parse`]; this adds the
/// rejection of absent values and non-string JSON types.
///
/// Only a non-empty string naming a known kind passes. Absent values, other
/// JSON types and unknown strings all fail with [`CoreError::InvalidKind`].
pub fn validate_kind(value: Option<&serde_json::Value>) -> Result<JobKind, CoreError> {
    match value {
        Some(serde_json::Value::String(token)) => JobKind::parse(token),
        Some(other) => Err(CoreError::InvalidKind(other.to_string())),
        None => Err(CoreError::InvalidKind("<absent>".to_string())),
    }
}
