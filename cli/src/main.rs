use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use playbook_log_core::{ParseResult, PlayStatus};
use playbook_log_parser::parse;

#[derive(Debug, Parser)]
#[command(name = "playbook-log")]
#[command(about = "Parse Ansible playbook output into structured records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a log and emit the structured result as JSON.
    Parse(ParseArgs),
    /// Parse a log and print a human-readable digest.
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Log file to parse, or `-` for stdin.
    input: PathBuf,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    /// Log file to parse, or `-` for stdin.
    input: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Summary(args) => run_summary(args),
    }
}

fn run_parse(args: ParseArgs) -> ExitCode {
    let content = match read_input(&args.input) {
        Ok(content) => content,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let result = parse(&content);
    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error: failed to serialize result: {err}");
            return ExitCode::FAILURE;
        }
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        report_failure(&result);
        ExitCode::FAILURE
    }
}

fn run_summary(args: SummaryArgs) -> ExitCode {
    let content = match read_input(&args.input) {
        Ok(content) => content,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let result = parse(&content);
    if !result.success {
        report_failure(&result);
        return ExitCode::FAILURE;
    }

    println!("dialect: {:?}", result.dialect);
    if let Some(timestamp) = result.timestamp {
        println!("last log timestamp: {timestamp}");
    }

    println!("\nhosts ({}):", result.hosts.len());
    for host in &result.hosts {
        println!(
            "  {:<24} {:<8} ok={} changed={} failed={} unreachable={} skipped={} rescued={} ignored={}",
            host.hostname,
            host.overall_status(),
            host.ok,
            host.changed,
            host.failed,
            host.unreachable,
            host.skipped,
            host.rescued,
            host.ignored,
        );
    }

    println!("\nplays ({}):", result.plays.len());
    for play in &result.plays {
        let line = play
            .line_number
            .map(|n| format!("line {n}"))
            .unwrap_or_else(|| "line ?".to_string());
        println!("  [{}] {} ({line})", play.order, play.name);
        for task in &play.tasks {
            let failures = task
                .results
                .iter()
                .filter(|r| r.status.is_failure())
                .count();
            println!(
                "    [{}] {}: {} result(s), {} failed",
                task.order,
                task.name,
                task.results.len(),
                failures
            );
        }
        let failed_hosts: Vec<&str> = result
            .hosts
            .iter()
            .filter(|host| play.status_for_host(host) == PlayStatus::Failed)
            .map(|host| host.hostname.as_str())
            .collect();
        if !failed_hosts.is_empty() {
            println!("    failed on: {}", failed_hosts.join(", "));
        }
    }

    ExitCode::SUCCESS
}

fn report_failure(result: &ParseResult) {
    if let Some(failure) = &result.failure {
        eprintln!("parse failed ({:?}): {}", failure.kind, failure.message);
        if !failure.preview.is_empty() {
            eprintln!("input preview: {}", failure.preview);
        }
    }
}

fn read_input(input: &PathBuf) -> Result<String, String> {
    if input.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|err| format!("failed to read stdin: {err}"))?;
        return Ok(content);
    }
    fs::read_to_string(input).map_err(|err| format!("failed to read {}: {err}", input.display()))
}
