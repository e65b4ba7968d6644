//! Upload acceptance rules.

use std::path::Path;

use super::path as folder_path;
use crate::{MediaboxError, Result};

/// MIME types accepted from uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/avi",
    "video/mov",
    "video/quicktime",
    "text/plain",
    "text/csv",
    "text/javascript",
    "text/css",
    "text/html",
    "text/xml",
    "application/json",
    "application/javascript",
    "application/xml",
    "application/csv",
];

/// Extensions accepted regardless of the reported MIME type.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "svg", "mp4", "webm", "ogg", "avi", "mov", "txt", "csv",
    "js", "css", "html", "xml", "json", "md", "py", "java", "cpp", "c", "h", "php", "rb", "go",
    "rs", "ts", "tsx", "jsx", "vue", "yml", "yaml",
];

/// MIME types accepted from URL fetches: media only.
pub const URL_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/avi",
    "video/mov",
    "video/quicktime",
];

/// Fallback MIME type for unknown content.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Strip parameters from a Content-Type value: `Image/PNG; q=1` becomes `image/png`.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Resolve the MIME type of an upload.
///
/// The reported type wins unless it is missing or generic, in which case
/// the type is guessed from the filename.
pub fn resolve_mime_type(reported: Option<&str>, filename: &str) -> String {
    match reported.map(mime_essence) {
        Some(mime) if !mime.is_empty() && mime != DEFAULT_MIME_TYPE => mime,
        _ => mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string(),
    }
}

/// Whether an upload is an accepted type, by MIME type or by extension.
pub fn is_allowed(mime_type: &str, filename: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
        || extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reject uploads of a type that is not accepted.
pub fn check_allowed(mime_type: &str, filename: &str) -> Result<()> {
    if !is_allowed(mime_type, filename) {
        return Err(MediaboxError::Validation(
            "Invalid file type. Only images, videos, and text files are allowed.".to_string(),
        ));
    }
    Ok(())
}

/// Reject uploads above the size limit.
pub fn check_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(MediaboxError::Validation(format!(
            "file is too large: {size} bytes (max {max_bytes} bytes)"
        )));
    }
    Ok(())
}

/// Work out the target folder of one uploaded file.
///
/// Browsers uploading a directory send each file's relative path
/// (`trip/day1/photo.jpg`); its directory part is the folder, and `.`
/// means the root. Any other value is the folder itself.
pub fn resolve_target_folder(raw: Option<&str>, original_name: &str) -> Result<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    let folder = if raw.contains('/') && raw.ends_with(original_name) {
        match raw.rsplit_once('/') {
            Some((dir, _)) if dir != "." => dir,
            _ => return Ok(None),
        }
    } else {
        raw
    };

    let folder = folder_path::normalize_optional(Some(folder))?;
    if let Some(folder) = &folder {
        folder_path::ensure_not_reserved(folder)?;
    }
    Ok(folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_essence() {
        assert_eq!(mime_essence("image/png"), "image/png");
        assert_eq!(mime_essence("Image/PNG; charset=binary"), "image/png");
        assert_eq!(mime_essence(""), "");
    }

    #[test]
    fn test_resolve_mime_type() {
        assert_eq!(resolve_mime_type(Some("video/mp4"), "x.bin"), "video/mp4");
        assert_eq!(
            resolve_mime_type(Some("application/octet-stream"), "photo.png"),
            "image/png"
        );
        assert_eq!(resolve_mime_type(None, "notes.txt"), "text/plain");
        assert_eq!(
            resolve_mime_type(None, "mystery"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_is_allowed() {
        assert!(is_allowed("image/jpeg", "photo"));
        assert!(is_allowed("application/octet-stream", "main.rs"));
        assert!(is_allowed("application/x-foo", "README.MD"));
        assert!(!is_allowed("application/zip", "archive.zip"));
        assert!(!is_allowed("application/x-msdownload", "setup.exe"));
    }

    #[test]
    fn test_check_allowed() {
        assert!(check_allowed("text/plain", "a.txt").is_ok());
        assert!(matches!(
            check_allowed("application/zip", "a.zip"),
            Err(MediaboxError::Validation(_))
        ));
    }

    #[test]
    fn test_check_size() {
        assert!(check_size(10, 10).is_ok());
        assert!(check_size(11, 10).is_err());
    }

    #[test]
    fn test_resolve_target_folder_plain() {
        assert_eq!(resolve_target_folder(None, "a.jpg").unwrap(), None);
        assert_eq!(resolve_target_folder(Some(" "), "a.jpg").unwrap(), None);
        assert_eq!(
            resolve_target_folder(Some("trip/day1"), "a.jpg").unwrap(),
            Some("trip/day1".to_string())
        );
    }

    #[test]
    fn test_resolve_target_folder_relative_path() {
        assert_eq!(
            resolve_target_folder(Some("trip/day1/a.jpg"), "a.jpg").unwrap(),
            Some("trip/day1".to_string())
        );
        assert_eq!(
            resolve_target_folder(Some("./a.jpg"), "a.jpg").unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_target_folder_rejects_bad_paths() {
        assert!(resolve_target_folder(Some("../etc"), "a.jpg").is_err());
        assert!(resolve_target_folder(Some("thumbnails"), "a.jpg").is_err());
    }
}
