//! Input normalization: line endings and timestamp-prefix stripping.

use chrono::NaiveDateTime;
use playbook_log_core::LogDialect;

use super::PATTERNS;

/// Format of the per-line prefix in the timestamped dialect.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// One physical input line, ready for scanning.
///
/// `number` is the 1-based line number in the *original* input, so
/// downstream line references stay valid after timestamp stripping.
#[derive(Debug, Clone)]
pub(super) struct ScanLine {
    pub(super) number: usize,
    pub(super) text: String,
    pub(super) timestamp: Option<NaiveDateTime>,
}

/// Normalizes CRLF and lone CR line endings to LF.
pub(super) fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits normalized content into scan lines.
///
/// For the timestamped dialect the fixed `<timestamp> | ` prefix is removed
/// from each matching line and parsed; lines without the prefix pass through
/// untouched. The raw dialect is split as-is.
pub(super) fn to_scan_lines(content: &str, dialect: LogDialect) -> Vec<ScanLine> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| {
            let number = index + 1;
            if dialect == LogDialect::Raw || !PATTERNS.timestamp_prefix.is_match(line) {
                return ScanLine {
                    number,
                    text: line.to_string(),
                    timestamp: None,
                };
            }

            let timestamp = PATTERNS
                .timestamp_prefix
                .find(line)
                .map(|m| line[..m.end() - 2].trim_end())
                .and_then(|ts| NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok());
            let text = match line.find(" | ") {
                Some(pipe_idx) => line[pipe_idx + 3..].to_string(),
                None => line.to_string(),
            };

            ScanLine {
                number,
                text,
                timestamp,
            }
        })
        .collect()
}
