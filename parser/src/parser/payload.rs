//! Failure-message extraction from `=> {...}` result payloads.
//!
//! Failed and fatal results carry a JSON-like payload, either inline on the
//! result line (`fatal: [h]: FAILED! => {"msg": "..."}`) or as an indented
//! block starting on the following line. Extraction prefers the structured
//! `"msg"` field (a string, or a list joined line by line), then a regex
//! scan for `"msg"` on nearby lines, and finally falls back to the verbatim
//! payload block so diagnostic content is never dropped.

use serde_json::Value;

use super::PATTERNS;
use super::normalize::ScanLine;

/// Upper bound on payload lines consumed after a result line.
const MAX_PAYLOAD_LINES: usize = 100;

/// Extracts the failure message for the result at `status_idx`.
pub(super) fn extract_failure_message(lines: &[ScanLine], status_idx: usize) -> Option<String> {
    let status_line = lines[status_idx].text.as_str();

    // Inline payload on the status line itself.
    if let Some(arrow_idx) = status_line.find("=> {") {
        let inline = status_line[arrow_idx + 3..].trim();
        if let Some(msg) = msg_from_json(inline) {
            return Some(msg);
        }
        // A complete payload without a `msg` field stands alone; the
        // following lines belong to other results.
        if serde_json::from_str::<Value>(inline).is_ok() {
            return Some(inline.to_string());
        }
        // The JSON may continue over the following lines.
        let block = collect_block(inline, lines, status_idx + 1);
        if let Some(msg) = msg_from_json(&block) {
            return Some(msg);
        }
        if let Some(msg) = msg_from_nearby_lines(lines, status_idx) {
            return Some(msg);
        }
        return Some(block);
    }

    // Payload opening on the next line.
    if let Some(next) = lines.get(status_idx + 1) {
        let next_trimmed = next.text.trim();
        if next_trimmed.starts_with("=> {") {
            let block = collect_block(next_trimmed[3..].trim(), lines, status_idx + 2);
            if let Some(msg) = msg_from_json(&block) {
                return Some(msg);
            }
            if let Some(msg) = msg_from_nearby_lines(lines, status_idx) {
                return Some(msg);
            }
            return Some(block);
        }
    }

    msg_from_nearby_lines(lines, status_idx)
}

/// Joins the opening fragment with following lines until the closing `}`.
fn collect_block(opening: &str, lines: &[ScanLine], from: usize) -> String {
    let mut block = vec![opening.to_string()];
    for line in lines.iter().skip(from).take(MAX_PAYLOAD_LINES) {
        let trimmed = line.text.trim();
        if is_payload_boundary(trimmed) {
            break;
        }
        block.push(trimmed.to_string());
        if trimmed == "}" {
            break;
        }
    }
    block.join("\n")
}

/// Regex fallback: first `"msg": "..."` within the payload vicinity.
fn msg_from_nearby_lines(lines: &[ScanLine], status_idx: usize) -> Option<String> {
    for (offset, line) in lines.iter().skip(status_idx).take(50).enumerate() {
        let trimmed = line.text.trim();
        if offset > 0 && is_payload_boundary(trimmed) {
            return None;
        }
        if let Some(caps) = PATTERNS.json_msg.captures(trimmed) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// A line that belongs to the next section or the next host's result, never
/// to the current payload.
fn is_payload_boundary(trimmed: &str) -> bool {
    trimmed.starts_with("TASK [")
        || trimmed.starts_with("PLAY [")
        || trimmed.starts_with(super::RECAP_MARKER)
        || PATTERNS.result_line.is_match(trimmed)
}

/// Parses a payload string and extracts its `msg` field.
///
/// List values are joined with newlines, matching how Ansible renders
/// multi-line messages.
fn msg_from_json(json_str: &str) -> Option<String> {
    let value: Value = serde_json::from_str(json_str).ok()?;
    match value.get("msg")? {
        Value::String(msg) => Some(msg.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}
