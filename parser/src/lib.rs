//! Deterministic parsing of Ansible playbook output into structured records.
//!
//! Given the complete text of a playbook run — raw stdout, or a log capture
//! with a per-line timestamp prefix — this crate recovers the hosts targeted,
//! the plays executed against them, and each task's per-host outcome,
//! including failure diagnostics and original line numbers. Plays executed in
//! multiple `serial` batches are merged back into a single logical play per
//! name, with later batches' results filling in (never clobbering) earlier
//! hosts.
//!
//! # Main entry point
//!
//! [`parse`] is the sole contract: full log text in, [`ParseResult`] out. It
//! is pure and synchronous, performs no I/O, and is total — any internal
//! fault is converted into a structured failure rather than a panic.
//!
//! # Example
//!
//! ```
//! use playbook_log_parser::parse;
//!
//! let log = "\
//! PLAY [Test] ***
//!
//! TASK [Gathering Facts] ***
//! ok: [server1]
//!
//! PLAY RECAP ***
//! server1 : ok=1 changed=0 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0";
//!
//! let result = parse(log);
//! assert!(result.success);
//! assert_eq!(result.hosts.len(), 1);
//! assert_eq!(result.plays[0].name, "Test");
//! assert_eq!(result.plays[0].tasks[0].name, "Gathering Facts");
//! ```
//!
//! # Crate type
//!
//! This is a **library-only crate**. For command-line usage, the
//! `playbook-log-cli` crate provides the `playbook-log` binary.

pub mod parser;

use std::panic::{AssertUnwindSafe, catch_unwind};

use playbook_log_core::{ParseError, ParseResult};
use parser::LogParser;

/// Parses complete playbook log text into a structured result.
///
/// Always returns a value: recoverable line-level noise is skipped, and
/// whole-parse failures (empty input, missing or empty recap, internal
/// faults) come back as a `success = false` result carrying a
/// [`ParseFailure`](playbook_log_core::ParseFailure).
///
/// # Examples
///
/// ```
/// use playbook_log_parser::parse;
/// use playbook_log_core::ParseErrorKind;
///
/// let result = parse("PLAY [X] ***\n");
/// assert!(!result.success);
/// assert_eq!(result.failure.unwrap().kind, ParseErrorKind::NoRecapFound);
/// ```
pub fn parse(raw_content: &str) -> ParseResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| LogParser::new(raw_content).parse()));
    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => ParseResult::from_error(error, raw_content),
        Err(panic) => {
            ParseResult::from_error(ParseError::Internal(describe_panic(&panic)), raw_content)
        }
    }
}

fn describe_panic(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
