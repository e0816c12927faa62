//! Core types for structured Ansible playbook log records.
//!
//! This crate defines the data model shared by the parser and its consumers:
//!
//! - [`ParseResult`] — the sole artifact of one parse run: hosts, plays with
//!   nested tasks and per-host results, detected dialect, and an optional
//!   structured failure.
//! - [`ParsedHost`] — a recap host with aggregate task counters.
//! - [`ParsedPlay`] / [`ParsedTask`] / [`ParsedTaskResult`] — the execution
//!   tree in original order, with stable line numbers for UI navigation.
//! - [`TaskStatus`] / [`PlayStatus`] — the status vocabulary, including the
//!   `failed`-filter-also-matches-`fatal` contract.
//! - [`ParseError`] / [`ParseFailure`] — the whole-parse error taxonomy.
//!
//! # Example
//!
//! ```
//! use playbook_log_core::*;
//!
//! let mut play = ParsedPlay::new("Deploy", 0, Some(1));
//! let mut task = ParsedTask::new("Install pkg", 0, Some(3));
//! task.upsert_result(ParsedTaskResult {
//!     hostname: "web1".into(),
//!     status: TaskStatus::Changed,
//!     message: None,
//! });
//! play.tasks.push(task);
//!
//! let mut host = ParsedHost::new("web1");
//! host.changed = 1;
//! assert_eq!(play.status_for_host(&host), PlayStatus::Changed);
//! ```

mod error;
mod status;
mod types;

pub use error::{ParseError, ParseErrorKind, ParseFailure, Result};
pub use status::{PlayStatus, TaskStatus};
pub use types::{
    LogDialect, ParseResult, ParsedHost, ParsedPlay, ParsedTask, ParsedTaskResult,
};
