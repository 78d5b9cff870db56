//! Resource path cleanup and normalization.

use std::path::PathBuf;

use crate::VfsError;

/// Malformed relative prefixes written by some exporters.
const MALFORMED_PREFIXES: [&str; 3] = [".\\", "./", "\\.."];

/// Strip known malformed relative prefixes from a resource path.
///
/// Handles `.\`, `./` and a leading `\..`, repeatedly, so that
/// `.\.\tex.png` becomes `tex.png`. Everything else is returned untouched.
pub fn clean_resource_path(path: &str) -> &str {
    let mut rest = path.trim();
    while let Some(stripped) = MALFORMED_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
    {
        rest = stripped;
    }
    rest
}

/// Normalize a resource path.
///
/// - Replaces backslashes with forward slashes
/// - Collapses redundant separators (`a///b` → `a/b`)
/// - Drops `.` segments
/// - Rejects `..` segments (path traversal not allowed)
/// - Strips leading and trailing slashes
///
/// Returns `Err(VfsError::InvalidPath)` if the path is empty or contains `..`.
pub fn normalize(path: &str) -> Result<String, VfsError> {
    let replaced = path.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in replaced.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(VfsError::InvalidPath(format!(
                    "path traversal (..) not allowed: {path}"
                )))
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return Err(VfsError::InvalidPath("empty path".into()));
    }

    Ok(segments.join("/"))
}

/// Relative filesystem path for a resource name, keeping `..` segments.
///
/// Unlike [`normalize`], this is meant for lookups next to a scene file on
/// disk, where `../textures/brick.png` is a legitimate reference. Returns
/// `None` if the path names no file.
pub fn relative_path(path: &str) -> Option<PathBuf> {
    let replaced = path.replace('\\', "/");
    let mut out = PathBuf::new();
    let mut named = false;
    for segment in replaced.split('/') {
        match segment {
            "" | "." => continue,
            ".." => out.push(".."),
            name => {
                out.push(name);
                named = true;
            }
        }
    }
    named.then_some(out)
}

/// Last segment of a path, accepting either separator.
pub fn file_name(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\']).find(|s| !s.is_empty())
}

/// Lower-cased extension of a path without the dot.
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
