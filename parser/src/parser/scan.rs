//! Single-pass section scanner and play/task collectors.
//!
//! This is the heart of the parser. One forward pass classifies every line
//! and maintains the current play/task context. The tricky part is `serial`
//! execution: Ansible re-emits identical `PLAY [...]` and `TASK [...]`
//! headers once per batch even though they denote the same logical play and
//! task, so a naive per-header reset would keep only the last batch's
//! results. Plays are therefore indexed by name, tasks by name within their
//! play, and results by hostname within their task — turning the multi-batch
//! stream into one coherent table without knowing the batch size in advance.

use std::collections::HashMap;

use playbook_log_core::{ParsedPlay, ParsedTask, ParsedTaskResult, TaskStatus};

use super::normalize::ScanLine;
use super::{PATTERNS, RECAP_MARKER, payload};

/// Output of the scanning pass.
pub(super) struct ScanOutcome {
    /// Plays in first-sighting order, tasks and results merged across
    /// batches and runs.
    pub(super) plays: Vec<ParsedPlay>,
    /// Indices into the scan lines of every recap marker, in order.
    pub(super) recap_starts: Vec<usize>,
}

/// Scans all lines, collecting plays and tasks and recording every recap
/// marker.
///
/// A log file may hold several appended runs, each ending in its own
/// `PLAY RECAP` block. The marker closes the current play/task context but
/// scanning resumes at the next `PLAY` header, so later runs merge into the
/// same tree by the name-keyed rules above.
pub(super) fn scan_sections(lines: &[ScanLine]) -> ScanOutcome {
    let mut plays: Vec<ParsedPlay> = Vec::new();
    // play name -> slot in `plays`
    let mut play_index: HashMap<String, usize> = HashMap::new();
    // task name -> slot in `plays[p].tasks`, parallel to `plays`
    let mut task_index: Vec<HashMap<String, usize>> = Vec::new();

    let mut current_play: Option<usize> = None;
    let mut current_task: Option<usize> = None;
    let mut recap_starts = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.text.trim();

        // Recap marker: recorded for the recap pass, closes the current
        // context so stray lines inside the block never attach to a task.
        if trimmed.starts_with(RECAP_MARKER) {
            recap_starts.push(idx);
            current_play = None;
            current_task = None;
            continue;
        }

        if trimmed.starts_with("PLAY [") {
            if let Some(caps) = PATTERNS.play_header.captures(trimmed) {
                let name = caps[1].to_string();
                let slot = match play_index.get(&name) {
                    // A new serial batch of a known play: reuse it, reset
                    // only the task context so results keep merging.
                    Some(&slot) => slot,
                    None => {
                        let slot = plays.len();
                        let mut play = ParsedPlay::new(&name, slot, Some(line.number));
                        play.timestamp = line.timestamp;
                        plays.push(play);
                        task_index.push(HashMap::new());
                        play_index.insert(name, slot);
                        slot
                    }
                };
                current_play = Some(slot);
                current_task = None;
            }
            continue;
        }

        if trimmed.starts_with("TASK [") {
            let Some(play_slot) = current_play else {
                continue;
            };
            if let Some(caps) = PATTERNS.task_header.captures(trimmed) {
                let name = caps[1].to_string();
                // Identity is the name alone; order is an attribute fixed at
                // first sighting, so a re-emitted header never opens a new
                // order slot.
                let slot = match task_index[play_slot].get(&name) {
                    Some(&slot) => slot,
                    None => {
                        let slot = plays[play_slot].tasks.len();
                        plays[play_slot]
                            .tasks
                            .push(ParsedTask::new(&name, slot, Some(line.number)));
                        task_index[play_slot].insert(name, slot);
                        slot
                    }
                };
                current_task = Some(slot);
            }
            continue;
        }

        if let Some(caps) = PATTERNS.result_line.captures(trimmed) {
            let (Some(play_slot), Some(task_slot)) = (current_play, current_task) else {
                continue;
            };
            let Some(status) = TaskStatus::parse_token(&caps[1]) else {
                continue;
            };
            let hostname = caps[2].to_string();
            let message = if status.is_failure() {
                payload::extract_failure_message(lines, idx)
            } else {
                None
            };
            plays[play_slot].tasks[task_slot].upsert_result(ParsedTaskResult {
                hostname,
                status,
                message,
            });
        }

        // Anything else: banners, payload continuation lines, item markers,
        // recap rows, blank lines. Never fatal.
    }

    ScanOutcome { plays, recap_starts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_log_core::LogDialect;

    fn scan(text: &str) -> ScanOutcome {
        let lines = super::super::normalize::to_scan_lines(text, LogDialect::Raw);
        scan_sections(&lines)
    }

    #[test]
    fn test_serial_batches_merge_into_one_play() {
        let log = "\
PLAY [Deploy] ***

TASK [Install pkg] ***
changed: [web1]

PLAY [Deploy] ***

TASK [Install pkg] ***
ok: [web2]

PLAY RECAP ***
";
        let outcome = scan(log);
        assert_eq!(outcome.plays.len(), 1);
        let play = &outcome.plays[0];
        assert_eq!(play.order, 0);
        assert_eq!(play.line_number, Some(1));
        assert_eq!(play.tasks.len(), 1);

        let task = &play.tasks[0];
        assert_eq!(task.order, 0);
        assert_eq!(task.line_number, Some(3));
        assert_eq!(task.results.len(), 2);
        assert_eq!(task.result_for("web1").unwrap().status, TaskStatus::Changed);
        assert_eq!(task.result_for("web2").unwrap().status, TaskStatus::Ok);
    }

    #[test]
    fn test_duplicate_task_name_same_host_last_write_wins() {
        let log = "\
PLAY [Deploy] ***
TASK [Step] ***
ok: [web1]
TASK [Step] ***
changed: [web1]
";
        let outcome = scan(log);
        let task = &outcome.plays[0].tasks[0];
        assert_eq!(outcome.plays[0].tasks.len(), 1);
        assert_eq!(task.results.len(), 1);
        assert_eq!(task.result_for("web1").unwrap().status, TaskStatus::Changed);
    }

    #[test]
    fn test_task_orders_are_dense_per_play() {
        let log = "\
PLAY [One] ***
TASK [A] ***
ok: [h]
TASK [B] ***
ok: [h]
PLAY [Two] ***
TASK [C] ***
ok: [h]
";
        let outcome = scan(log);
        assert_eq!(outcome.plays.len(), 2);
        let orders: Vec<usize> = outcome.plays[0].tasks.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(outcome.plays[1].tasks[0].order, 0);
        assert_eq!(outcome.plays[1].order, 1);
    }

    #[test]
    fn test_result_before_any_task_is_ignored() {
        let log = "\
PLAY [Deploy] ***
ok: [web1]
TASK [Step] ***
ok: [web2]
";
        let outcome = scan(log);
        let play = &outcome.plays[0];
        assert_eq!(play.tasks.len(), 1);
        assert!(play.tasks[0].result_for("web1").is_none());
        assert!(play.tasks[0].result_for("web2").is_some());
    }

    #[test]
    fn test_recap_marker_closes_context_and_recap_rows_stay_noise() {
        let log = "\
PLAY [Deploy] ***
TASK [Step] ***
ok: [web1]
PLAY RECAP ***
web1 : ok=1 changed=0
ok: [stray]
";
        let outcome = scan(log);
        assert_eq!(outcome.recap_starts, vec![3]);
        assert_eq!(outcome.plays.len(), 1);
        // The result line after the marker has no open task to attach to.
        assert!(outcome.plays[0].tasks[0].result_for("stray").is_none());
    }

    #[test]
    fn test_scanning_resumes_after_recap_block() {
        let log = "\
PLAY [One] ***
TASK [A] ***
ok: [h1]
PLAY RECAP ***
h1 : ok=1 changed=0
PLAY [Two] ***
TASK [B] ***
ok: [h2]
PLAY RECAP ***
h2 : ok=1 changed=0
";
        let outcome = scan(log);
        assert_eq!(outcome.recap_starts, vec![3, 8]);
        assert_eq!(outcome.plays.len(), 2);
        assert_eq!(outcome.plays[1].name, "Two");
        assert!(outcome.plays[1].tasks[0].result_for("h2").is_some());
    }

    #[test]
    fn test_same_play_name_across_runs_merges() {
        let log = "\
PLAY [Deploy] ***
TASK [Step] ***
changed: [h1]
PLAY RECAP ***
h1 : ok=1 changed=1
PLAY [Deploy] ***
TASK [Step] ***
ok: [h2]
PLAY RECAP ***
h2 : ok=1 changed=0
";
        let outcome = scan(log);
        assert_eq!(outcome.plays.len(), 1);
        let task = &outcome.plays[0].tasks[0];
        assert_eq!(outcome.plays[0].tasks.len(), 1);
        assert_eq!(task.results.len(), 2);
    }

    #[test]
    fn test_fatal_result_captures_inline_message() {
        let log = r#"PLAY [Deploy] ***
TASK [Step] ***
fatal: [web1]: FAILED! => {"msg": "No space left on device"}
"#;
        let outcome = scan(log);
        let result = outcome.plays[0].tasks[0].result_for("web1").unwrap();
        assert_eq!(result.status, TaskStatus::Fatal);
        assert_eq!(result.message.as_deref(), Some("No space left on device"));
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let log = "\
Using /etc/ansible/ansible.cfg as config file

PLAY [Deploy] ***
TASK [Step] ***
ok: [web1] => (item=nginx)
some unclassifiable banner ****
";
        let outcome = scan(log);
        assert_eq!(outcome.plays.len(), 1);
        assert_eq!(outcome.plays[0].line_number, Some(3));
        assert!(outcome.plays[0].tasks[0].result_for("web1").is_some());
    }
}
