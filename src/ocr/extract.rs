//! JSON payload recovery from raw model text.
//!
//! Vision models are instructed to reply with bare JSON, but in practice the
//! object arrives fenced, wrapped in prose, or occasionally truncated. The
//! extractor tries three strategies in fixed priority order:
//!
//! 1. a ```json fenced block (the model is told to prefer fencing);
//! 2. a balanced-brace scan from the first `{` — depth-aware and
//!    string-aware, so braces inside item descriptions don't mis-bound the
//!    object the way a greedy first-`{`-to-last-`}` match would;
//! 3. the whole trimmed string.
//!
//! Callers treat `ExtractionFailed` as "produce the defaulted record", never
//! as a client-visible error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// No JSON object could be recovered from the response text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no parsable JSON object in model response")]
pub struct ExtractionFailed;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fence regex"))
}

/// Recover a JSON object from raw model output.
pub fn extract_json(raw: &str) -> Result<Value, ExtractionFailed> {
    // 1. Fenced block wins when it parses, even if loose braces also exist.
    if let Some(caps) = fence_re().captures(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(caps[1].trim()) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    // 2. Balanced-brace scan from the first `{`.
    if let Some(span) = balanced_object_span(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    // 3. The whole string.
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) if value.is_object() => Ok(value),
        _ => Err(ExtractionFailed),
    }
}

/// Locate the first balanced `{...}` span, tracking string literals and
/// escapes so `{` / `}` inside values don't affect the depth count.
fn balanced_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
