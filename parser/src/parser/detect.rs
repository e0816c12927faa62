//! Dialect detection from the leading content of a log.

use playbook_log_core::LogDialect;

use super::PATTERNS;

/// Detects which dialect the log is written in.
///
/// Only the first non-empty line is examined: a timestamp prefix selects the
/// timestamped dialect, anything else (including a leading `PLAY [` header
/// or arbitrary banner text) falls back to raw — the raw scanner is lenient
/// enough to find headers anywhere. Detection itself cannot fail.
pub fn detect_dialect(content: &str) -> LogDialect {
    let first_line = content.lines().find(|line| !line.trim().is_empty());
    match first_line {
        Some(line) if PATTERNS.timestamp_prefix.is_match(line) => LogDialect::Timestamped,
        _ => LogDialect::Raw,
    }
}
