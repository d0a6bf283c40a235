//! Flatten a [`PlanRequest`] into the single text prompt a plain
//! completion transport expects.

use boxedin_core::provider::{PlanMessage, PlanRequest};

/// Characters assumed per token when converting a token-denominated
/// context window into a character budget. Named rather than inlined
/// so tests can exercise tiny deterministic windows.
pub const CHARS_PER_TOKEN: usize = 4;

/// Concatenate `system_prompt`, an optional `Available tools:` block,
/// and the flattened `ROLE: content` transcript. If the result exceeds
/// `context_window * CHARS_PER_TOKEN` characters, the tail is kept and
/// older text is dropped.
pub fn assemble(request: &PlanRequest, context_window: usize) -> String {
    let mut out = String::new();
    out.push_str(&request.system_prompt);
    out.push('\n');
    if let Some(tools) = &request.tools_description {
        out.push_str("Available tools:\n");
        out.push_str(tools);
        out.push('\n');
    }
    out.push_str(&flatten(&request.messages));
    truncate_tail(out, context_window.saturating_mul(CHARS_PER_TOKEN))
}

fn flatten(messages: &[PlanMessage]) -> String {
    let mut out = String::new();
    for m in messages {
        out.push_str(&m.role.to_uppercase());
        out.push_str(": ");
        out.push_str(&m.content);
        out.push('\n');
    }
    out
}

fn truncate_tail(text: String, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text;
    }
    let cut = text.len() - max_chars;
    let boundary = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= cut)
        .unwrap_or(text.len());
    text[boundary..].to_string()
}
