//! Playbook-output parser for the two supported log dialects.
//!
//! The pipeline is a fixed sequence of pure stages:
//!
//! 1. **normalize** — line-ending cleanup and timestamp-prefix stripping,
//!    preserving original 1-based line numbers.
//! 2. **detect** — dialect selection from the first non-empty line.
//! 3. **scan** — one forward pass that classifies each line (play header,
//!    task header, result line, recap marker, noise) and merges serial
//!    batches, and appended runs, into a single play/task tree.
//! 4. **recap** — the per-host summary blocks, with counters aggregated
//!    across runs.
//!
//! The primary entry point is [`LogParser::new`] followed by
//! [`LogParser::parse`], but most consumers should use the crate-level
//! [`parse`](crate::parse) function instead: it additionally guarantees that
//! no internal fault escapes as a panic.

mod detect;
mod normalize;
mod payload;
mod recap;
mod scan;

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use playbook_log_core::{LogDialect, ParseError, ParseResult};

pub use detect::detect_dialect;

/// Regex patterns shared by the scanning stages.
static PATTERNS: LazyLock<LogPatterns> = LazyLock::new(LogPatterns::new);

struct LogPatterns {
    /// `YYYY-MM-DD HH:MM:SS,mmm |` prefix of the timestamped dialect.
    timestamp_prefix: Regex,
    /// `PLAY [<name>] ***...`
    play_header: Regex,
    /// `TASK [<name>] ***...`
    task_header: Regex,
    /// `<status>: [<hostname>]` with optional trailing payload.
    result_line: Regex,
    /// `<hostname> : ok=1 changed=0 ...` recap rows.
    recap_host: Regex,
    /// Individual `key=<n>` counters inside a recap row.
    recap_field: Regex,
    /// `"msg": "..."` fallback inside failure payloads.
    json_msg: Regex,
}

impl LogPatterns {
    fn new() -> Self {
        // All regexes here are compile-time constants. An expect() failure
        // indicates a programmer error in the pattern, not a runtime
        // condition.
        Self {
            timestamp_prefix: Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3} \|")
                .expect("static regex must compile"),
            play_header: Regex::new(r"PLAY \[([^\]]+)\]").expect("static regex must compile"),
            task_header: Regex::new(r"TASK \[([^\]]+)\]").expect("static regex must compile"),
            result_line: Regex::new(
                r"(?i)^(ok|changed|failed|fatal|skipping|unreachable|ignored|rescued):\s*\[([^\]]+)\]",
            )
            .expect("static regex must compile"),
            recap_host: Regex::new(r"^(\S+)\s*:\s*(.+)$").expect("static regex must compile"),
            recap_field: Regex::new(r"\b(ok|changed|unreachable|failed|skipped|rescued|ignored)=(\d+)")
                .expect("static regex must compile"),
            json_msg: Regex::new(r#""msg":\s*"((?:[^"\\]|\\.)*)""#)
                .expect("static regex must compile"),
        }
    }
}

/// Marker line introducing the trailing recap block.
const RECAP_MARKER: &str = "PLAY RECAP";

/// Parser over one complete playbook log.
pub struct LogParser<'a> {
    raw_content: &'a str,
}

impl<'a> LogParser<'a> {
    /// Creates a parser for the given log content.
    pub fn new(raw_content: &'a str) -> Self {
        Self { raw_content }
    }

    /// Runs the full pipeline.
    ///
    /// Errors abort the parse per the whole-parse taxonomy; malformed
    /// individual lines never do.
    pub fn parse(&self) -> Result<ParseResult, ParseError> {
        if self.raw_content.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        // Browser textareas and Windows captures submit CRLF.
        let content = normalize::normalize_line_endings(self.raw_content);
        let dialect = detect::detect_dialect(&content);
        let lines = normalize::to_scan_lines(&content, dialect);
        debug!(?dialect, lines = lines.len(), "detected log dialect");

        let scan = scan::scan_sections(&lines);
        debug!(
            plays = scan.plays.len(),
            recaps = scan.recap_starts.len(),
            "scanned play/task sections"
        );

        let hosts = recap::parse_recap(&lines, &scan.recap_starts)?;
        debug!(hosts = hosts.len(), "parsed recap");

        let timestamp = match dialect {
            LogDialect::Timestamped => lines.iter().rev().find_map(|line| line.timestamp),
            LogDialect::Raw => None,
        };

        Ok(ParseResult::from_parts(hosts, scan.plays, dialect, timestamp))
    }
}
