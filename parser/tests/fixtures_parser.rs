use std::fs;
use std::path::PathBuf;

use playbook_log_core::{LogDialect, ParseErrorKind, PlayStatus, TaskStatus};
use playbook_log_parser::parse;

#[test]
fn test_parse_deploy_fixture_builds_full_tree() {
    let log = fixture("deploy_raw.log");
    let result = parse(&log);

    assert!(result.success);
    assert_eq!(result.dialect, LogDialect::Raw);
    assert!(result.timestamp.is_none());

    // One host per recap line.
    assert_eq!(result.hosts.len(), 2);
    let web1 = result.host("web1").expect("web1 in recap");
    assert_eq!(web1.ok, 5);
    assert_eq!(web1.changed, 3);
    let web2 = result.host("web2").expect("web2 in recap");
    assert_eq!(web2.failed, 1);
    assert_eq!(web2.skipped, 1);

    // Plays in execution order with first-header line numbers.
    assert_eq!(result.plays.len(), 2);
    let provision = &result.plays[0];
    assert_eq!(provision.name, "Provision web servers");
    assert_eq!(provision.order, 0);
    assert_eq!(provision.line_number, Some(1));
    let verify = &result.plays[1];
    assert_eq!(verify.name, "Verify deployment");
    assert_eq!(verify.order, 1);
    assert_eq!(verify.line_number, Some(22));

    // Tasks dense and in order.
    let task_names: Vec<&str> = provision.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        task_names,
        vec![
            "Gathering Facts",
            "Install nginx",
            "Copy vhost config",
            "Restart nginx"
        ]
    );
    let restart = provision.task("Restart nginx").expect("restart task");
    assert_eq!(restart.order, 3);
    assert_eq!(restart.line_number, Some(15));

    // Fatal result keeps its multi-line payload message.
    let failure = restart.result_for("web2").expect("web2 result");
    assert_eq!(failure.status, TaskStatus::Fatal);
    assert_eq!(
        failure.message.as_deref(),
        Some("Unable to restart service nginx: Job for nginx.service failed.")
    );
    assert_eq!(
        restart.result_for("web1").expect("web1 result").status,
        TaskStatus::Changed
    );

    // Skipping result in the second play.
    let check = verify.task("Check homepage").expect("check task");
    assert_eq!(
        check.result_for("web2").expect("web2 result").status,
        TaskStatus::Skipping
    );
}

#[test]
fn test_play_status_resolution_per_host() {
    let log = fixture("deploy_raw.log");
    let result = parse(&log);

    let provision = result.play("Provision web servers").expect("play");
    let web1 = result.host("web1").expect("host");
    let web2 = result.host("web2").expect("host");

    assert_eq!(provision.status_for_host(&web1), PlayStatus::Changed);
    assert_eq!(provision.status_for_host(&web2), PlayStatus::Failed);

    let verify = result.play("Verify deployment").expect("play");
    assert_eq!(verify.status_for_host(&web1), PlayStatus::Ok);
    // web2 only skipped in this play.
    assert_eq!(verify.status_for_host(&web2), PlayStatus::Ok);
}

#[test]
fn test_serial_batches_merge_across_host_subsets() {
    let log = fixture("serial_batches.log");
    let result = parse(&log);

    assert!(result.success);
    assert_eq!(result.hosts.len(), 2);

    // Two PLAY headers, one logical play.
    assert_eq!(result.plays.len(), 1);
    let deploy = &result.plays[0];
    assert_eq!(deploy.name, "Deploy application");
    assert_eq!(deploy.order, 0);

    // Two TASK header pairs, two logical tasks, results for the union of
    // both batches' hosts.
    assert_eq!(deploy.tasks.len(), 2);
    let install = deploy.task("Install package").expect("install task");
    assert_eq!(install.order, 1);
    assert_eq!(install.results.len(), 2);
    assert_eq!(
        install.result_for("app1").expect("app1").status,
        TaskStatus::Changed
    );
    let app2 = install.result_for("app2").expect("app2");
    assert_eq!(app2.status, TaskStatus::Failed);
    assert_eq!(app2.message.as_deref(), Some("Package repo unreachable"));

    // Line numbers point at the first header occurrence.
    assert_eq!(deploy.line_number, Some(1));
    assert_eq!(install.line_number, Some(6));
}

#[test]
fn test_failed_filter_returns_failed_and_fatal() {
    let raw = fixture("deploy_raw.log");
    let serial = fixture("serial_batches.log");

    let fatal_task_results = parse(&raw).plays[0]
        .task("Restart nginx")
        .expect("task")
        .results_with_status(TaskStatus::Failed)
        .len();
    assert_eq!(fatal_task_results, 1);

    let failed_task = parse(&serial);
    let install = failed_task.plays[0].task("Install package").expect("task");
    assert_eq!(install.results_with_status(TaskStatus::Failed).len(), 1);
    // Exact-match filters never pick up fatal results.
    assert!(
        install
            .results_with_status(TaskStatus::Ok)
            .iter()
            .all(|r| r.status == TaskStatus::Ok)
    );
}

#[test]
fn test_timestamped_fixture_parses_with_timestamps() {
    let log = fixture("deploy_timestamped.log");
    let result = parse(&log);

    assert!(result.success);
    assert_eq!(result.dialect, LogDialect::Timestamped);

    let play = result.play("Rotate certificates").expect("play");
    assert_eq!(play.line_number, Some(1));
    let play_ts = play.timestamp.expect("play header timestamp");
    assert_eq!(play_ts.format("%H:%M:%S").to_string(), "21:14:07");

    // Result timestamp is the last one seen in the log.
    let last_ts = result.timestamp.expect("log timestamp");
    assert_eq!(last_ts.format("%H:%M:%S").to_string(), "21:14:11");

    let renew = play.task("Renew certificate").expect("task");
    assert_eq!(renew.line_number, Some(6));
    assert_eq!(
        renew.result_for("edge1").expect("result").status,
        TaskStatus::Changed
    );
}

#[test]
fn test_timestamped_equivalent_of_raw_round_trips() {
    let raw = fixture("deploy_raw.log");
    let timestamped: String = raw
        .lines()
        .enumerate()
        .map(|(i, line)| format!("2024-01-15 10:30:00,{:03} | {line}\n", i % 1000))
        .collect();

    let from_raw = parse(&raw);
    let from_timestamped = parse(&timestamped);

    assert!(from_timestamped.success);
    assert_eq!(from_timestamped.dialect, LogDialect::Timestamped);
    assert_eq!(from_timestamped.hosts, from_raw.hosts);

    // Identical tree modulo the per-play header timestamps that only the
    // timestamped dialect carries.
    let mut plays = from_timestamped.plays.clone();
    for play in &mut plays {
        assert!(play.timestamp.is_some());
        play.timestamp = None;
    }
    assert_eq!(plays, from_raw.plays);

    // Stripping the prefix textually and re-parsing gives a bit-identical
    // raw-dialect result.
    let stripped: String = timestamped
        .lines()
        .map(|line| match line.find(" | ") {
            Some(idx) => format!("{}\n", &line[idx + 3..]),
            None => format!("{line}\n"),
        })
        .collect();
    assert_eq!(parse(&stripped), from_raw);
}

#[test]
fn test_appended_runs_aggregate_hosts_and_keep_all_plays() {
    let log = fixture("nightly_two_runs.log");
    let result = parse(&log);

    assert!(result.success);
    assert_eq!(result.dialect, LogDialect::Timestamped);

    // Both runs' plays survive, in first-sighting order.
    let play_names: Vec<&str> = result.plays.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(play_names, vec!["Nightly backup", "Verify backups"]);
    let verify = result.play("Verify backups").expect("second run's play");
    assert!(
        verify
            .task("Check archive")
            .expect("task")
            .result_for("db2")
            .is_some()
    );

    // A host in both recaps gets its counters summed.
    assert_eq!(result.hosts.len(), 2);
    let db1 = result.host("db1").expect("db1");
    assert_eq!(db1.ok, 3);
    assert_eq!(db1.changed, 1);
    let db2 = result.host("db2").expect("db2");
    assert_eq!(db2.ok, 1);

    // Log timestamp comes from the last line of the last run.
    let last_ts = result.timestamp.expect("log timestamp");
    assert_eq!(last_ts.format("%H:%M:%S").to_string(), "02:30:02");
}

#[test]
fn test_result_for_host_absent_from_recap_is_retained() {
    let log = "\
PLAY [P] ***
TASK [T] ***
ok: [listed]
changed: [unlisted]
PLAY RECAP ***
listed : ok=1 changed=0 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0
";
    let result = parse(log);
    assert!(result.success);
    assert_eq!(result.hosts.len(), 1);
    assert!(result.host("unlisted").is_none());
    let task = result.plays[0].task("T").expect("task");
    assert_eq!(
        task.result_for("unlisted").expect("retained result").status,
        TaskStatus::Changed
    );
}

#[test]
fn test_msgless_failure_payload_excludes_next_host_result() {
    let log = "\
PLAY [P] ***
TASK [T] ***
failed: [web2] => {\"changed\": false}
changed: [web1]
PLAY RECAP ***
web1 : ok=0 changed=1 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0
web2 : ok=0 changed=0 unreachable=0 failed=1 skipped=0 rescued=0 ignored=0
";
    let result = parse(log);
    assert!(result.success);
    let task = result.plays[0].task("T").expect("task");
    let failure = task.result_for("web2").expect("failed result");
    assert_eq!(failure.message.as_deref(), Some("{\"changed\": false}"));
    assert_eq!(
        task.result_for("web1").expect("web1 result").status,
        TaskStatus::Changed
    );
}

#[test]
fn test_parse_is_deterministic() {
    for name in [
        "deploy_raw.log",
        "serial_batches.log",
        "deploy_timestamped.log",
        "nightly_two_runs.log",
    ] {
        let log = fixture(name);
        assert_eq!(parse(&log), parse(&log), "unstable parse for {name}");
    }
}

#[test]
fn test_missing_recap_reports_no_recap_found() {
    let result = parse("PLAY [X] ***\n");
    assert!(!result.success);
    assert!(result.hosts.is_empty());
    let failure = result.failure.expect("failure");
    assert_eq!(failure.kind, ParseErrorKind::NoRecapFound);
    assert!(failure.preview.starts_with("PLAY [X]"));
}

#[test]
fn test_empty_recap_reports_empty_recap() {
    let result = parse("PLAY [X] ***\nTASK [Y] ***\nok: [h]\nPLAY RECAP ***\n");
    assert!(!result.success);
    assert_eq!(
        result.failure.expect("failure").kind,
        ParseErrorKind::EmptyRecap
    );
}

#[test]
fn test_empty_input_reports_empty_input() {
    for input in ["", "   \n\t\n"] {
        let result = parse(input);
        assert!(!result.success);
        assert_eq!(
            result.failure.expect("failure").kind,
            ParseErrorKind::EmptyInput
        );
    }
}

#[test]
fn test_duplicate_task_in_sequence_last_write_wins() {
    let log = "\
PLAY [P] ***
TASK [X] ***
ok: [h1]
TASK [X] ***
changed: [h1]
PLAY RECAP ***
h1 : ok=1 changed=1 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0
";
    let result = parse(log);
    assert!(result.success);
    let task = result.plays[0].task("X").expect("task");
    assert_eq!(result.plays[0].tasks.len(), 1);
    assert_eq!(task.results.len(), 1);
    assert_eq!(
        task.result_for("h1").expect("result").status,
        TaskStatus::Changed
    );
}

#[test]
fn test_crlf_input_parses_like_lf() {
    let log = fixture("deploy_raw.log");
    let crlf = log.replace('\n', "\r\n");
    assert_eq!(parse(&crlf), parse(&log));
}

#[test]
fn test_end_to_end_contract_scenario() {
    let log = "PLAY [Test] ***\n\nTASK [Gathering Facts] ***\nok: [server1]\n\nPLAY RECAP ***\nserver1 : ok=1 changed=0 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0";
    let result = parse(log);

    assert!(result.success);
    assert_eq!(result.hosts.len(), 1);
    let host = &result.hosts[0];
    assert_eq!(host.hostname, "server1");
    assert_eq!(host.ok, 1);

    assert_eq!(result.plays.len(), 1);
    let play = &result.plays[0];
    assert_eq!(play.name, "Test");
    assert_eq!(play.order, 0);
    assert_eq!(play.status_for_host(host), PlayStatus::Ok);

    assert_eq!(play.tasks.len(), 1);
    let task = &play.tasks[0];
    assert_eq!(task.name, "Gathering Facts");
    assert_eq!(task.order, 0);
    assert_eq!(task.results.len(), 1);
    let result_entry = &task.results[0];
    assert_eq!(result_entry.hostname, "server1");
    assert_eq!(result_entry.status, TaskStatus::Ok);
    assert!(result_entry.message.is_none());
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}
