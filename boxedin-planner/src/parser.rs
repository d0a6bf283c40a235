//! Extract a [`Plan`] from free-form planner output.
//!
//! Pure string/JSON logic, no I/O: easy to exercise with every input
//! shape a real model actually produces (fenced block, bare braces,
//! garbage).

use boxedin_core::Plan;
use serde::de::DeserializeOwned;

/// Try to parse `text` as a [`Plan`]. See [`extract_json`] for the
/// extraction strategy.
pub fn extract(text: &str) -> Option<Plan> {
    extract_json(text)
}

/// Try to parse `text` as a `T`:
///
/// 1. a fenced ` ```json ... ``` ` block, stripped and parsed;
/// 2. otherwise the slice between the first `{` and the last `}`;
/// 3. otherwise `None`.
///
/// Shared by [`extract`] (plans) and `boxedin-agent`'s AutoFix model-patch
/// step (file-content patches) — both pull structured JSON out of
/// otherwise free-form model output the same way.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    if let Some(block) = fenced_json_block(text) {
        if let Ok(value) = serde_json::from_str::<T>(block) {
            return Some(value);
        }
    }
    if let Some(slice) = brace_slice(text) {
        if let Ok(value) = serde_json::from_str::<T>(slice) {
            return Some(value);
        }
    }
    None
}

fn fenced_json_block(text: &str) -> Option<&str> {
    const MARKER: &str = "```json";
    let start = text.find(MARKER)? + MARKER.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn brace_slice(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last < first {
        return None;
    }
    Some(&text[first..=last])
}
