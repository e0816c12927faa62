//! Record types for parsed Ansible playbook output.
//!
//! This module defines the structured tree produced by one parse run:
//! hosts from the trailing recap, plays in execution order, tasks nested in
//! their plays, and per-host task results. All types serialize with [`serde`]
//! and round-trip through JSON.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseFailure};
use crate::status::TaskStatus;

/// Input dialect of a playbook log.
///
/// The two dialects carry identical content; the timestamped one prefixes
/// every line with `YYYY-MM-DD HH:MM:SS,mmm | `.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogDialect {
    /// Raw `ansible-playbook` stdout (the default assumption).
    #[default]
    Raw,
    /// Log-file capture with a fixed timestamp prefix on every line.
    Timestamped,
}

/// A host as reported by the `PLAY RECAP` section.
///
/// Built once from its recap line and immutable afterwards. The counters are
/// aggregate task counts for the whole run.
///
/// # Examples
///
/// ```
/// use playbook_log_core::ParsedHost;
///
/// let host = ParsedHost::new("web1");
/// assert_eq!(host.hostname, "web1");
/// assert_eq!(host.ok, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedHost {
    pub hostname: String,
    pub ok: u32,
    pub changed: u32,
    pub failed: u32,
    pub unreachable: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

impl ParsedHost {
    /// Creates a host with all counters at zero.
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }
}

/// A single task execution result on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTaskResult {
    pub hostname: String,
    pub status: TaskStatus,
    /// Diagnostic text recovered from the `=> {...}` payload of a
    /// failed/fatal result. Often multi-line.
    pub message: Option<String>,
}

/// A named task within a play.
///
/// Identity within a play is the task name: a re-emitted header for the same
/// name (serial batches, duplicate names in one batch) maps back to the same
/// task. `order` is dense and assigned at first sighting; `line_number` is
/// the 1-based line of the first header occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub name: String,
    pub order: usize,
    pub line_number: Option<usize>,
    /// One result per host; a repeated (task, host) observation replaces the
    /// earlier entry in place.
    pub results: Vec<ParsedTaskResult>,
}

impl ParsedTask {
    /// Creates an empty task at the given order slot.
    pub fn new(name: &str, order: usize, line_number: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            order,
            line_number,
            results: Vec::new(),
        }
    }

    /// Finds the result recorded for a host, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use playbook_log_core::{ParsedTask, ParsedTaskResult, TaskStatus};
    ///
    /// let mut task = ParsedTask::new("Install pkg", 0, Some(3));
    /// task.upsert_result(ParsedTaskResult {
    ///     hostname: "web1".into(),
    ///     status: TaskStatus::Changed,
    ///     message: None,
    /// });
    /// assert_eq!(task.result_for("web1").unwrap().status, TaskStatus::Changed);
    /// assert!(task.result_for("web2").is_none());
    /// ```
    pub fn result_for(&self, hostname: &str) -> Option<&ParsedTaskResult> {
        self.results.iter().find(|r| r.hostname == hostname)
    }

    /// Records a result, replacing any earlier result for the same host.
    ///
    /// Last write wins: later serial batches reflect the actual outcome for
    /// the hosts they cover.
    pub fn upsert_result(&mut self, result: ParsedTaskResult) {
        match self
            .results
            .iter_mut()
            .find(|r| r.hostname == result.hostname)
        {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    /// Results matching a status filter (`failed` also accepts `fatal`).
    pub fn results_with_status(&self, filter: TaskStatus) -> Vec<&ParsedTaskResult> {
        self.results
            .iter()
            .filter(|r| r.status.matches_filter(filter))
            .collect()
    }
}

/// A named execution phase targeting one or more hosts.
///
/// A play name that recurs because of serial batching keeps the order and
/// line number of its first header occurrence and owns a single merged task
/// list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPlay {
    pub name: String,
    pub order: usize,
    pub line_number: Option<usize>,
    /// Timestamp of the first play header line; only present for the
    /// timestamped dialect.
    pub timestamp: Option<NaiveDateTime>,
    pub tasks: Vec<ParsedTask>,
}

impl ParsedPlay {
    /// Creates a play with no tasks yet.
    pub fn new(name: &str, order: usize, line_number: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            order,
            line_number,
            timestamp: None,
            tasks: Vec::new(),
        }
    }

    /// Finds a task by name.
    pub fn task(&self, name: &str) -> Option<&ParsedTask> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

/// The sole externally visible artifact of a parse run.
///
/// Created once per invocation and never mutated by the caller. A successful
/// result always carries at least one host; a failed one carries a
/// [`ParseFailure`] and empty collections.
///
/// # Examples
///
/// ```
/// use playbook_log_core::{ParseError, ParseResult};
///
/// let result = ParseResult::from_error(ParseError::NoRecapFound, "PLAY [X] ***\n");
/// assert!(!result.success);
/// assert!(result.failure.is_some());
/// assert!(result.hosts.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,
    pub hosts: Vec<ParsedHost>,
    pub plays: Vec<ParsedPlay>,
    pub dialect: LogDialect,
    /// Last per-line timestamp seen in the input; `None` for the raw dialect.
    pub timestamp: Option<NaiveDateTime>,
    pub failure: Option<ParseFailure>,
}

impl ParseResult {
    /// Builds a successful result.
    ///
    /// The caller guarantees `hosts` is non-empty; the parser enforces this
    /// before assembling.
    pub fn from_parts(
        hosts: Vec<ParsedHost>,
        plays: Vec<ParsedPlay>,
        dialect: LogDialect,
        timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            success: true,
            hosts,
            plays,
            dialect,
            timestamp,
            failure: None,
        }
    }

    /// Builds a failed result carrying the error kind, message, and a
    /// bounded preview of the offending input.
    pub fn from_error(error: ParseError, raw_content: &str) -> Self {
        Self {
            success: false,
            hosts: Vec::new(),
            plays: Vec::new(),
            dialect: LogDialect::default(),
            timestamp: None,
            failure: Some(ParseFailure::new(error, raw_content)),
        }
    }

    /// Finds a host by hostname.
    pub fn host(&self, hostname: &str) -> Option<&ParsedHost> {
        self.hosts.iter().find(|h| h.hostname == hostname)
    }

    /// Finds a play by name.
    pub fn play(&self, name: &str) -> Option<&ParsedPlay> {
        self.plays.iter().find(|p| p.name == name)
    }
}
