//! Upload type and size policy.
//!
//! Two policies, applied consistently:
//!
//! - **Video** uploads must match the allow-list on *both* extension and
//!   declared content type, and must not exceed [`MAX_VIDEO_BYTES`].
//! - **Image** (frame) uploads pass if *either* the extension or the declared
//!   content type is allowed, tolerating clients that send inconsistent
//!   metadata (e.g. `application/octet-stream` with a `.jpg` name).

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted video payload (100 MiB).
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Maximum accepted frame payload (10 MiB).
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

/// Allowed video file extensions (lowercase, without dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "mkv", "webm"];

/// Allowed video content types.
pub const VIDEO_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/x-msvideo",
    "video/avi",
    "video/quicktime",
    "video/x-ms-wmv",
    "video/x-flv",
    "video/x-matroska",
    "video/webm",
];

/// Allowed image file extensions (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Allowed image content types.
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/bmp",
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercase extension of `filename`, without the dot.
///
/// Returns `None` for names without an extension or with a trailing dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = basename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type without parameters, lowercased (`"Video/MP4; codecs=x"` -> `"video/mp4"`).
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a video upload. Extension and content type must both be allowed.
pub fn validate_video_upload(
    filename: &str,
    content_type: Option<&str>,
    size_bytes: usize,
) -> Result<(), CoreError> {
    let ext_ok = file_extension(filename)
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()));
    let type_ok = content_type
        .map(essence)
        .is_some_and(|ct| VIDEO_CONTENT_TYPES.contains(&ct.as_str()));

    if !(ext_ok && type_ok) {
        return Err(CoreError::Validation(format!(
            "Only video files are allowed. Supported extensions: {}",
            VIDEO_EXTENSIONS.join(", ")
        )));
    }
    if size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded video is empty".into()));
    }
    if size_bytes > MAX_VIDEO_BYTES {
        return Err(CoreError::Validation(format!(
            "Video exceeds the maximum size of {} MiB",
            MAX_VIDEO_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Validate a frame upload. Extension or content type must be allowed.
pub fn validate_image_upload(
    filename: &str,
    content_type: Option<&str>,
    size_bytes: usize,
) -> Result<(), CoreError> {
    let ext_ok = file_extension(filename)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
    let type_ok = content_type
        .map(essence)
        .is_some_and(|ct| IMAGE_CONTENT_TYPES.contains(&ct.as_str()));

    if !(ext_ok || type_ok) {
        return Err(CoreError::Validation(format!(
            "Only image files are allowed. Supported extensions: {}",
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    if size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded frame is empty".into()));
    }
    if size_bytes > MAX_FRAME_BYTES {
        return Err(CoreError::Validation(format!(
            "Frame exceeds the maximum size of {} MiB",
            MAX_FRAME_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
