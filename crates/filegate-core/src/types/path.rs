//! Logical path helpers.
//!
//! Logical paths always use `/` separators and are absolute inside their
//! source. None of these helpers touch the filesystem.

/// Join `rel` onto `base` and clean the result.
///
/// `..` never climbs above the source root.
pub fn join_unix(base: &str, rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in base.split('/').chain(rel.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Clean a logical path: leading `/`, no duplicate separators, no trailing `/`.
pub fn clean(path: &str) -> String {
    join_unix("/", path)
}

/// Clean a path and guarantee it ends with `/`.
pub fn as_dir(path: &str) -> String {
    let cleaned = clean(path);
    if cleaned == "/" {
        cleaned
    } else {
        format!("{cleaned}/")
    }
}

/// Parent directory of a logical path, ending with `/`.
pub fn parent_dir(path: &str) -> String {
    let cleaned = clean(path);
    match cleaned.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => format!("{}/", &cleaned[..idx]),
    }
}

/// Last component of a logical path, or `/` for the root.
pub fn base_name(path: &str) -> String {
    let cleaned = clean(path);
    match cleaned.rsplit('/').next() {
        Some("") | None => "/".to_string(),
        Some(name) => name.to_string(),
    }
}
