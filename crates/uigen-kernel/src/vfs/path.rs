//! Path validation and manipulation.
//!
//! VFS paths are absolute, `/`-rooted and already normalized: no trailing
//! slash, no empty, `.` or `..` segments. The root is `/`. Everything here is
//! plain string work; the tree never touches `std::path`.

use super::error::{VfsError, VfsResult};

/// The root path.
pub const ROOT: &str = "/";

/// Split a strict VFS path into its segments, rejecting anything that is not
/// already normalized. The root yields an empty list.
pub fn segments(path: &str) -> VfsResult<Vec<&str>> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(VfsError::invalid_path(path, "path must be absolute"));
    };
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    rest.split('/')
        .map(|segment| match segment {
            "" => Err(VfsError::invalid_path(path, "empty path segment")),
            "." | ".." => Err(VfsError::invalid_path(
                path,
                format!("`{segment}` segments are not allowed"),
            )),
            s => Ok(s),
        })
        .collect()
}

/// Lenient normalization for paths arriving from outside (tool arguments):
/// adds the leading `/`, collapses repeated slashes and drops a trailing one.
/// `.` and `..` are left in place so that [`segments`] rejects them.
pub fn normalize(input: &str) -> String {
    let joined = input
        .trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

/// Join a directory path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Parent directory of a path (`None` for the root).
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Last segment of a path (empty for the root).
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Extension of the last segment including the dot, e.g. `.tsx`.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// Whether `path` equals `ancestor` or lies below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

/// Resolve a `/`-separated relative reference against a directory, applying
/// `.` and `..`. Returns `None` when the reference climbs above the root.
pub fn resolve_relative(base_dir: &str, reference: &str) -> Option<String> {
    let mut stack: Vec<&str> = if reference.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            s => stack.push(s),
        }
    }
    Some(format!("/{}", stack.join("/")))
}
