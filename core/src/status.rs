//! Status vocabulary and resolution rules.
//!
//! Task-level statuses mirror the tokens Ansible prints in result lines.
//! Play-level statuses are always derived, never stored: severity order is
//! failed > changed > ok, with the recap counters as fallback when a play
//! carries no task data for a host.

use serde::{Deserialize, Serialize};

use crate::types::{ParsedHost, ParsedPlay};

/// Status token of a single task result line.
///
/// `Failed` and `Fatal` are kept distinct in stored results so downstream
/// filters can still tell them apart, even though a `failed` filter matches
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Ok,
    Changed,
    Failed,
    Fatal,
    Skipping,
    Unreachable,
    Ignored,
    Rescued,
}

impl TaskStatus {
    /// Parses a status token as printed by Ansible (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use playbook_log_core::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::parse_token("fatal"), Some(TaskStatus::Fatal));
    /// assert_eq!(TaskStatus::parse_token("OK"), Some(TaskStatus::Ok));
    /// assert_eq!(TaskStatus::parse_token("exploded"), None);
    /// ```
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ok" => Some(Self::Ok),
            "changed" => Some(Self::Changed),
            "failed" => Some(Self::Failed),
            "fatal" => Some(Self::Fatal),
            "skipping" => Some(Self::Skipping),
            "unreachable" => Some(Self::Unreachable),
            "ignored" => Some(Self::Ignored),
            "rescued" => Some(Self::Rescued),
            _ => None,
        }
    }

    /// The lowercase token as it appears in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Changed => "changed",
            Self::Failed => "failed",
            Self::Fatal => "fatal",
            Self::Skipping => "skipping",
            Self::Unreachable => "unreachable",
            Self::Ignored => "ignored",
            Self::Rescued => "rescued",
        }
    }

    /// Whether this status satisfies a filter request.
    ///
    /// A `Failed` filter accepts both `failed` and `fatal` results; every
    /// other filter is an exact match.
    ///
    /// # Examples
    ///
    /// ```
    /// use playbook_log_core::TaskStatus;
    ///
    /// assert!(TaskStatus::Fatal.matches_filter(TaskStatus::Failed));
    /// assert!(!TaskStatus::Fatal.matches_filter(TaskStatus::Ok));
    /// assert!(!TaskStatus::Ok.matches_filter(TaskStatus::Changed));
    /// ```
    pub fn matches_filter(&self, filter: TaskStatus) -> bool {
        match filter {
            TaskStatus::Failed => matches!(self, TaskStatus::Failed | TaskStatus::Fatal),
            other => *self == other,
        }
    }

    /// Whether this status counts as a failure for play-status resolution.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::Fatal)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Derived status of a play (or whole run) for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayStatus {
    Ok,
    Changed,
    Failed,
}

impl std::fmt::Display for PlayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Ok => "ok",
            Self::Changed => "changed",
            Self::Failed => "failed",
        })
    }
}

impl ParsedHost {
    /// Overall run status for this host from its recap counters.
    ///
    /// # Examples
    ///
    /// ```
    /// use playbook_log_core::{ParsedHost, PlayStatus};
    ///
    /// let mut host = ParsedHost::new("db1");
    /// host.changed = 2;
    /// assert_eq!(host.overall_status(), PlayStatus::Changed);
    /// host.unreachable = 1;
    /// assert_eq!(host.overall_status(), PlayStatus::Failed);
    /// ```
    pub fn overall_status(&self) -> PlayStatus {
        if self.failed > 0 || self.unreachable > 0 {
            PlayStatus::Failed
        } else if self.changed > 0 {
            PlayStatus::Changed
        } else {
            PlayStatus::Ok
        }
    }
}

impl ParsedPlay {
    /// Resolves this play's status for one host from its task results.
    ///
    /// Returns `None` when no task in the play carries a result for the
    /// host; callers fall back to the recap counters via
    /// [`status_for_host`](Self::status_for_host).
    pub fn task_status_for_host(&self, hostname: &str) -> Option<PlayStatus> {
        let mut seen = false;
        let mut changed = false;
        for task in &self.tasks {
            if let Some(result) = task.result_for(hostname) {
                seen = true;
                if result.status.is_failure() {
                    return Some(PlayStatus::Failed);
                }
                if result.status == TaskStatus::Changed {
                    changed = true;
                }
            }
        }
        match (seen, changed) {
            (false, _) => None,
            (true, true) => Some(PlayStatus::Changed),
            (true, false) => Some(PlayStatus::Ok),
        }
    }

    /// Play status for a host, falling back to the host's recap counters
    /// when the play has no task-level data (degenerate or legacy input).
    pub fn status_for_host(&self, host: &ParsedHost) -> PlayStatus {
        self.task_status_for_host(&host.hostname)
            .unwrap_or_else(|| host.overall_status())
    }
}
