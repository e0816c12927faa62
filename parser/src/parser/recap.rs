//! Recap-block parsing: the per-host summaries.

use std::collections::HashMap;

use playbook_log_core::{ParseError, ParsedHost};

use super::PATTERNS;
use super::normalize::ScanLine;

/// Parses every recap block and merges them into one host list.
///
/// Appended multi-run logs carry one recap per run; a hostname appearing in
/// several blocks gets its counters summed, in first-sighting order.
pub(super) fn parse_recap(
    lines: &[ScanLine],
    recap_starts: &[usize],
) -> Result<Vec<ParsedHost>, ParseError> {
    if recap_starts.is_empty() {
        return Err(ParseError::NoRecapFound);
    }

    let mut hosts: Vec<ParsedHost> = Vec::new();
    let mut host_index: HashMap<String, usize> = HashMap::new();
    for &start in recap_starts {
        for host in parse_block(lines, start) {
            match host_index.get(&host.hostname) {
                Some(&slot) => merge_counters(&mut hosts[slot], &host),
                None => {
                    host_index.insert(host.hostname.clone(), hosts.len());
                    hosts.push(host);
                }
            }
        }
    }

    if hosts.is_empty() {
        return Err(ParseError::EmptyRecap);
    }
    Ok(hosts)
}

/// Parses one recap block starting at its marker line.
///
/// Each non-blank line after the marker of the shape
/// `<hostname> : ok=<n> changed=<n> ...` yields one host. Counter fields may
/// appear in any subset and order per tool version; missing fields default
/// to 0 and unknown fields are ignored. Leading blank lines are skipped; the
/// first non-conforming line after at least one host ends the block.
fn parse_block(lines: &[ScanLine], start: usize) -> Vec<ParsedHost> {
    let mut hosts = Vec::new();
    for line in lines.iter().skip(start + 1) {
        let trimmed = line.text.trim();
        if trimmed.is_empty() {
            if hosts.is_empty() {
                continue;
            }
            break;
        }

        match parse_host_line(trimmed) {
            Some(host) => hosts.push(host),
            None if hosts.is_empty() => continue,
            None => break,
        }
    }
    hosts
}

fn merge_counters(into: &mut ParsedHost, from: &ParsedHost) {
    into.ok += from.ok;
    into.changed += from.changed;
    into.unreachable += from.unreachable;
    into.failed += from.failed;
    into.skipped += from.skipped;
    into.rescued += from.rescued;
    into.ignored += from.ignored;
}

/// Parses one recap row into a host, or `None` for a non-conforming line.
///
/// A row must have the `<hostname> : ...` shape and carry at least one
/// recognized counter, so trailing prose after the recap never turns into a
/// phantom host.
fn parse_host_line(trimmed: &str) -> Option<ParsedHost> {
    let caps = PATTERNS.recap_host.captures(trimmed)?;
    let hostname = caps[1].to_string();
    let fields = caps.get(2)?.as_str();

    let mut host = ParsedHost::new(&hostname);
    let mut recognized = 0;
    for caps in PATTERNS.recap_field.captures_iter(fields) {
        let count: u32 = caps[2].parse().ok()?;
        match &caps[1] {
            "ok" => host.ok = count,
            "changed" => host.changed = count,
            "unreachable" => host.unreachable = count,
            "failed" => host.failed = count,
            "skipped" => host.skipped = count,
            "rescued" => host.rescued = count,
            "ignored" => host.ignored = count,
            _ => continue,
        }
        recognized += 1;
    }

    if recognized == 0 {
        return None;
    }
    Some(host)
}
