//! Upload admission checks: pixel budget and file-name sanitizing.
//!
//! Everything here is pure. Validation runs to completion over the whole
//! batch before any blob is stored or any job submitted.

use std::io::Cursor;
use std::sync::LazyLock;

use image::ImageReader;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Environment variable holding the pixel budget per validation batch.
pub const MAX_PIXELS_ENV: &str = "SMT_MAX_PIXEL_PER_IMAGE";

/// Pixel budget used when the environment does not set one.
pub const DEFAULT_MAX_PIXELS: u64 = 10_000_000;

/// Name given to an upload whose original name sanitizes to nothing.
const FALLBACK_FILE_NAME: &str = "upload";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Process-wide upload limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum summed `width * height` across all images of one batch.
    pub max_pixels_per_image: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_pixels_per_image: DEFAULT_MAX_PIXELS,
        }
    }
}

impl UploadLimits {
    /// Read limits from the environment.
    ///
    /// | Env Var                   | Default      |
    /// |---------------------------|--------------|
    /// | `SMT_MAX_PIXEL_PER_IMAGE` | `10000000`   |
    pub fn from_env() -> Result<Self, CoreError> {
        match std::env::var(MAX_PIXELS_ENV) {
            Ok(raw) => Self::from_value(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse the pixel budget from its textual form.
    pub fn from_value(raw: &str) -> Result<Self, CoreError> {
        let max_pixels_per_image = raw.trim().parse().map_err(|_| {
            CoreError::Internal(format!(
                "{MAX_PIXELS_ENV} must be a non-negative integer, got '{raw}'"
            ))
        })?;
        Ok(Self {
            max_pixels_per_image,
        })
    }
}

/// One file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Read the pixel dimensions of an encoded image without decoding pixel data.
pub fn image_dimensions(file: &UploadedFile) -> Result<(u32, u32), CoreError> {
    let unreadable = |reason: String| CoreError::UnreadableImage {
        file_name: file.file_name.clone(),
        reason,
    };

    ImageReader::new(Cursor::new(file.content.as_slice()))
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .into_dimensions()
        .map_err(|e| unreadable(e.to_string()))
}

/// Check that the summed pixel count of `files` stays within `limits`.
///
/// Returns the total pixel count on success. Every file must decode; a file
/// that does not is reported as [`CoreError::UnreadableImage`] rather than
/// counted as empty.
pub fn validate_uploads(files: &[UploadedFile], limits: &UploadLimits) -> Result<u64, CoreError> {
    let mut total: u64 = 0;
    for file in files {
        let (width, height) = image_dimensions(file)?;
        total = total.saturating_add(u64::from(width) * u64::from(height));
    }

    if total > limits.max_pixels_per_image {
        return Err(CoreError::UploadLimitsExceeded {
            limit: limits.max_pixels_per_image,
            observed: total,
        });
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// Reduce a client-supplied file name to a safe, flat name.
///
/// Accented letters are decomposed (NFKD) and folded to their ASCII base.
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and
/// underscores are trimmed. Never returns an empty string.
pub fn sanitize_file_name(raw: &str) -> String {
    let ascii: String = raw.nfkd().filter(char::is_ascii).collect();
    let flattened = ascii.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
