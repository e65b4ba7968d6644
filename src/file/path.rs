//! Folder path helpers.
//!
//! A folder path is a slash-joined sequence of directory names relative to
//! the upload root, e.g. `trip/day1`. The root itself has no folder path.
//! All comparisons here work on whole segments, so `photos` never matches
//! `photos2` and `a/trip` never matches `trip`.

use crate::{MediaboxError, Result};

/// Separator between folder path segments.
pub const SEPARATOR: char = '/';

/// Characters replaced by `_` when sanitizing a user-supplied folder name.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '\\', '|', '?', '*'];

/// Name of the directory under the upload root that holds previews.
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// Iterate over the non-empty segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Number of segments in a path.
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

/// Normalize a folder path received from a caller.
///
/// Empty segments are dropped (`a//b/` becomes `a/b`). Traversal segments and
/// backslashes are rejected, as is a path with no segments at all.
pub fn normalize(raw: &str) -> Result<String> {
    let mut parts = Vec::new();
    for segment in segments(raw) {
        if segment == "." || segment == ".." {
            return Err(MediaboxError::Validation(format!(
                "folder path '{raw}' must not contain '.' or '..' segments"
            )));
        }
        if segment.contains('\\') || segment.chars().any(|c| c.is_control()) {
            return Err(MediaboxError::Validation(format!(
                "folder path '{raw}' contains illegal characters"
            )));
        }
        parts.push(segment);
    }

    if parts.is_empty() {
        return Err(MediaboxError::Validation(
            "folder path must not be empty".to_string(),
        ));
    }

    Ok(parts.join("/"))
}

/// Normalize an optional folder path. Missing or blank means root.
pub fn normalize_optional(raw: Option<&str>) -> Result<Option<String>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => normalize(raw).map(Some),
        _ => Ok(None),
    }
}

/// Sanitize a single folder name.
///
/// The name is trimmed and every character that is illegal in a filesystem
/// path (including `/` and control characters) is replaced by `_`.
pub fn sanitize_segment(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c == SEPARATOR || c.is_control() || ILLEGAL_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Sanitize a user-supplied folder path, segment by segment.
pub fn sanitize(raw: &str) -> Result<String> {
    let parts: Vec<String> = segments(raw)
        .map(sanitize_segment)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.iter().any(|s| s == "." || s == "..") {
        return Err(MediaboxError::Validation(format!(
            "folder path '{raw}' must not contain '.' or '..' segments"
        )));
    }
    if parts.is_empty() {
        return Err(MediaboxError::Validation("Invalid folder name".to_string()));
    }

    Ok(parts.join("/"))
}

/// Whether a path collides with the reserved thumbnails directory.
pub fn is_reserved(path: &str) -> bool {
    let mut iter = segments(path);
    iter.next() == Some(THUMBNAILS_DIR)
}

/// Reject paths that would land inside the thumbnails directory.
pub fn ensure_not_reserved(path: &str) -> Result<()> {
    if is_reserved(path) {
        return Err(MediaboxError::Validation(format!(
            "'{THUMBNAILS_DIR}' is a reserved folder name"
        )));
    }
    Ok(())
}

/// Last segment of a path.
pub fn name(path: &str) -> &str {
    segments(path).last().unwrap_or("")
}

/// Everything but the last segment, or `None` for a single-segment path.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    trimmed
        .rfind(SEPARATOR)
        .map(|idx| &trimmed[..idx])
        .filter(|p| !p.is_empty())
}

/// Every ancestor of a path, shortest first, including the path itself.
///
/// `a/b/c` yields `a`, `a/b`, `a/b/c`.
pub fn ancestors(path: &str) -> Vec<String> {
    let parts: Vec<&str> = segments(path).collect();
    (1..=parts.len()).map(|i| parts[..i].join("/")).collect()
}

/// Replace the last segment of a path with a new name.
pub fn with_name(path: &str, new_name: &str) -> String {
    match parent(path) {
        Some(parent) => format!("{parent}/{new_name}"),
        None => new_name.to_string(),
    }
}

/// Whether `path` is `base` or nested under it.
pub fn is_within(path: &str, base: &str) -> bool {
    let mut path_segments = segments(path);
    segments(base).all(|b| path_segments.next() == Some(b))
}

/// Move `path` from under `old_base` to under `new_base`.
///
/// Returns `None` when `path` is not `old_base` or nested under it.
pub fn rebase(path: &str, old_base: &str, new_base: &str) -> Option<String> {
    let mut path_segments = segments(path);
    for old in segments(old_base) {
        if path_segments.next() != Some(old) {
            return None;
        }
    }

    let rest: Vec<&str> = path_segments.collect();
    if rest.is_empty() {
        Some(new_base.to_string())
    } else {
        Some(format!("{new_base}/{}", rest.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("trip/day1").unwrap(), "trip/day1");
        assert_eq!(normalize("/trip//day1/").unwrap(), "trip/day1");
        assert_eq!(normalize("my photos").unwrap(), "my photos");
    }

    #[test]
    fn test_normalize_rejects_traversal() {
        assert!(matches!(
            normalize("../etc"),
            Err(MediaboxError::Validation(_))
        ));
        assert!(normalize("a/./b").is_err());
        assert!(normalize("a\\b").is_err());
        assert!(normalize("").is_err());
        assert!(normalize("///").is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(None).unwrap(), None);
        assert_eq!(normalize_optional(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_optional(Some("a/b")).unwrap(),
            Some("a/b".to_string())
        );
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("  Summer: 2024?  "), "Summer_ 2024_");
        assert_eq!(sanitize_segment("a/b"), "a_b");
        assert_eq!(sanitize_segment("<tag>|\"x\"*"), "_tag___x__");
        assert_eq!(sanitize_segment("tab\there"), "tab_here");
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize("trip/ day 1 ").unwrap(), "trip/day 1");
        assert_eq!(sanitize("a//b").unwrap(), "a/b");
        assert_eq!(sanitize("what?/now*").unwrap(), "what_/now_");
        assert!(sanitize("  ").is_err());
        assert!(sanitize("a/../b").is_err());
    }

    #[test]
    fn test_reserved() {
        assert!(is_reserved("thumbnails"));
        assert!(is_reserved("thumbnails/x"));
        assert!(!is_reserved("a/thumbnails"));
        assert!(!is_reserved("thumbnails2"));
        assert!(ensure_not_reserved("thumbnails").is_err());
    }

    #[test]
    fn test_name_and_parent() {
        assert_eq!(name("a/b/c"), "c");
        assert_eq!(name("a"), "a");
        assert_eq!(parent("a/b/c"), Some("a/b"));
        assert_eq!(parent("a"), None);
    }

    #[test]
    fn test_ancestors() {
        assert_eq!(ancestors("a/b/c"), vec!["a", "a/b", "a/b/c"]);
        assert_eq!(ancestors("solo"), vec!["solo"]);
        assert!(ancestors("").is_empty());
    }

    #[test]
    fn test_with_name() {
        assert_eq!(with_name("trip", "vacation"), "vacation");
        assert_eq!(with_name("2024/trip", "vacation"), "2024/vacation");
    }

    #[test]
    fn test_is_within_is_segment_aware() {
        assert!(is_within("photos", "photos"));
        assert!(is_within("photos/2024", "photos"));
        assert!(!is_within("photos2", "photos"));
        assert!(!is_within("old/photos", "photos"));
        assert!(!is_within("pho", "photos"));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(
            rebase("trip", "trip", "vacation"),
            Some("vacation".to_string())
        );
        assert_eq!(
            rebase("trip/day1/am", "trip", "vacation"),
            Some("vacation/day1/am".to_string())
        );
        assert_eq!(rebase("trip2/day1", "trip", "vacation"), None);
        assert_eq!(rebase("old/trip", "trip", "vacation"), None);
        assert_eq!(
            rebase("a/trip/x", "a/trip", "a/tour"),
            Some("a/tour/x".to_string())
        );
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth("a/b/c"), 3);
        assert_eq!(depth("a"), 1);
        assert_eq!(depth(""), 0);
    }
}
