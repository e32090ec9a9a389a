//! Filename generation, path-segment checks and URL joining.

use std::path::Path;

use uuid::Uuid;

use super::error::StorageError;

/// Longest extension carried over from an original filename.
const MAX_EXTENSION_LEN: usize = 16;

/// Split a slash-separated path into segments, dropping empty ones.
///
/// Returns `None` if any segment is `.`, contains `..` anywhere, or
/// carries a backslash or NUL. Built URLs therefore never contain `..`.
fn safe_segments(raw: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment.contains("..") || segment.contains(['\\', '\0']) {
            return None;
        }
        segments.push(segment);
    }
    Some(segments)
}

/// Canonical form of a caller-supplied subdirectory.
///
/// `"/users/"` becomes `Some("users")`; `""` and `"/"` mean no subdirectory.
pub(super) fn normalize_subdir(subdir: Option<&str>) -> Result<Option<String>, StorageError> {
    let Some(raw) = subdir else {
        return Ok(None);
    };
    let segments = safe_segments(raw).ok_or_else(|| StorageError::invalid_subdir(raw))?;
    if segments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(segments.join("/")))
    }
}

/// Canonical form of the public URL prefix, without surrounding slashes.
pub(super) fn normalize_prefix(prefix: &str) -> Result<String, StorageError> {
    safe_segments(prefix)
        .map(|segments| segments.join("/"))
        .ok_or_else(|| StorageError::InvalidPrefix(prefix.to_string()))
}

/// Lower-cased extension of `original_name`, including the leading dot.
///
/// Everything but the extension is discarded. Extensions that are not
/// plain ASCII alphanumerics are dropped rather than sanitised.
pub(super) fn file_extension(original_name: Option<&str>) -> Option<String> {
    let name = original_name?;
    // Browsers on Windows may send the full client path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let ext = Path::new(base).extension()?.to_str()?;

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Fresh storage filename: 32 hex chars of a v4 UUID plus the extension.
pub(super) fn generate_filename(original_name: Option<&str>) -> String {
    let token = Uuid::new_v4().simple();
    match file_extension(original_name) {
        Some(ext) => format!("{token}{ext}"),
        None => token.to_string(),
    }
}

/// Join URL components with single slashes and a leading slash.
///
/// Each component has its surrounding slashes stripped; empty components
/// are skipped so an empty prefix never produces `//`.
pub(super) fn build_url<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = parts
        .into_iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect();
    format!("/{}", joined.join("/"))
}

/// Segments of `url` after `prefix`, if `url` lives under it and is safe.
pub(super) fn strip_prefix<'a>(url: &'a str, prefix: &str) -> Option<Vec<&'a str>> {
    let segments = safe_segments(url)?;
    let prefix_segments = safe_segments(prefix)?;
    if segments.len() <= prefix_segments.len() || !segments.starts_with(&prefix_segments) {
        return None;
    }
    Some(segments[prefix_segments.len()..].to_vec())
}
