//! Template substitution.
//!
//! Pure string expansion, no I/O: every `${EXPR}` occurrence in an
//! `args`/`stdin` string is replaced by the referenced run's recorded
//! output, or the empty string if `EXPR` is unrecognized or the
//! referenced run hasn't happened yet.

use boxedin_core::RunResult;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").unwrap())
}

/// Expand every `${EXPR}` in `template` against `last` (the most recent
/// run, any tool) and `runs` (latest result per tool id). Same
/// `(template, run state)` always produces the same string.
pub fn expand(template: &str, last: Option<&RunResult>, runs: &HashMap<String, RunResult>) -> String {
    placeholder()
        .replace_all(template, |caps: &regex::Captures| resolve(&caps[1], last, runs))
        .into_owned()
}

fn resolve(expr: &str, last: Option<&RunResult>, runs: &HashMap<String, RunResult>) -> String {
    if expr == "last.stdout" {
        return last.map(|r| r.stdout.clone()).unwrap_or_default();
    }
    if let Some(rest) = expr.strip_prefix("runs.") {
        if let Some((tool_id, field)) = rest.rsplit_once('.') {
            if let Some(result) = runs.get(tool_id) {
                return match field {
                    "stdout" => result.stdout.clone(),
                    "stderr" => result.stderr.clone(),
                    "code" => result.code.to_string(),
                    _ => String::new(),
                };
            }
        }
    }
    String::new()
}
