//! Path normalization utilities for consistent file path handling.
//!
//! Programs are built from in-memory texts, so paths are normalized lexically
//! (`/` separators, `.` and `..` folded) and never touch the file system. The
//! same string then works as a lookup key for files, config entries, and
//! import targets.

/// Normalize a path lexically.
///
/// ```
/// use ets_analysis::base::normalize_path;
///
/// assert_eq!(normalize_path("/p/src/./a/../b.ets"), "/p/src/b.ets");
/// assert_eq!(normalize_path("src\\main.ets"), "src/main.ets");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Directory part of a normalized path (`"."` when there is none).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Join `relative` onto `dir` and normalize. Absolute `relative` paths win.
pub fn join_path(dir: &str, relative: &str) -> String {
    if relative.starts_with('/') || dir == "." {
        normalize_path(relative)
    } else {
        normalize_path(&format!("{dir}/{relative}"))
    }
}

/// `./x`, `../x`, or an absolute path (as opposed to a bare module path).
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
}

/// Final path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
