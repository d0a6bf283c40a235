//! Small shared helpers used across the tool/sandbox boundary.

use std::path::{Component, Path, PathBuf};

/// True if `rel` contains a `..` component or is absolute.
///
/// Used to confine tool code writes and sandbox entry resolution to the
/// tool's own directory.
pub fn has_unsafe_path_segment(rel: &str) -> bool {
    let path = Path::new(rel);
    if path.is_absolute() {
        return true;
    }
    path.components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
}

/// Join `rel` onto `base`, refusing any path that would escape `base`.
pub fn safe_join(base: &Path, rel: &str) -> Result<PathBuf, String> {
    if has_unsafe_path_segment(rel) {
        return Err(format!("path `{rel}` escapes its base directory"));
    }
    Ok(base.join(rel))
}

/// Lowercase `s` and collapse every run of non `[a-z0-9]` characters into
/// a single `-`, trimming leading/trailing dashes. Used to derive tool
/// ids from tool names during MaterializeTools.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_dash = false;
    for ch in s.chars().flat_map(|c| c.to_lowercase()) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_dash = false;
        } else if !last_was_dash && !out.is_empty() {
            out.push('-');
            last_was_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Current time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
