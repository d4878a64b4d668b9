//! # Harness-Oxide CLI
//!
//! Runs the registered test files against a WebDriver endpoint and prints a
//! summary.
//!
//! ```text
//! harness-oxide [--list] [--workers N] [--browser NAME] [FILE[::FN]...]
//! ```
//!
//! No files means every registered file. Ctrl-C stops the run and closes the
//! sessions it opened. The exit code is 1 when a test failed or a file
//! errored.

use clap::Parser;
use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use harness_oxide::{
    config::Config,
    runner::{FileStatus, ParallelScheduler, RunRequest, RunSnapshot, TestStatus},
    session::SessionManagerImpl,
    suites,
};

#[derive(Parser)]
#[command(name = "harness-oxide")]
#[command(about = "Run browser test suites over WebDriver")]
#[command(version)]
struct Cli {
    /// Test files to run, optionally narrowed to one function as FILE::FN
    targets: Vec<String>,

    /// List registered files and their test functions
    #[arg(short, long)]
    list: bool,

    /// Maximum files run in parallel
    #[arg(short, long)]
    workers: Option<usize>,

    /// Browser to launch (chrome, firefox, edge)
    #[arg(short, long)]
    browser: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "HARNESS_CONFIG")]
    config: Option<String>,

    /// Print the final run snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Split `FILE[::FN]` targets into paths and per-file selections
fn parse_targets(targets: &[String]) -> (Vec<String>, HashMap<String, Vec<String>>) {
    let mut paths: Vec<String> = Vec::new();
    let mut functions: HashMap<String, Vec<String>> = HashMap::new();

    for target in targets {
        let (path, function) = match target.split_once("::") {
            Some((path, function)) => (path, Some(function)),
            None => (target.as_str(), None),
        };
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
        if let Some(function) = function {
            functions
                .entry(path.to_string())
                .or_default()
                .push(function.to_string());
        }
    }
    (paths, functions)
}

fn print_summary(snapshot: &RunSnapshot) {
    println!("\nRun {} ({:?})", snapshot.run_id, snapshot.status);
    for (path, file) in &snapshot.aggregate.files {
        println!("\n{} [{:?}]", path, file.status);
        if let (FileStatus::Error, Some(error)) = (file.status, &file.error) {
            println!("  error: {}", error);
        }
        for test in &file.tests {
            let mark = match test.status {
                TestStatus::Passed => "PASS",
                TestStatus::Failed => "FAIL",
                TestStatus::Skipped => "SKIP",
                TestStatus::Running => "....",
            };
            println!("  {} {} ({} ms)", mark, test.name, test.duration_ms);
            if let Some(error) = &test.error {
                println!("       {}", error);
            }
            if let Some(screenshot) = &test.screenshot {
                println!("       screenshot: {}", screenshot.display());
            }
        }
    }

    let totals = snapshot.aggregate.totals;
    println!(
        "\n{} tests: {} passed, {} failed, {} skipped",
        totals.total, totals.passed, totals.failed, totals.skipped
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Harness-Oxide v{}", harness_oxide::VERSION);

    let registry = Arc::new(suites::registry());

    if cli.list {
        for file in registry.files() {
            println!("{}", file.path);
            for function in file.functions() {
                println!("  {}", function);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (mut paths, functions) = parse_targets(&cli.targets);
    if paths.is_empty() {
        paths = registry.paths();
    }

    let sessions = Arc::new(SessionManagerImpl::webdriver(&config.webdriver_url));
    let config = Arc::new(config);
    let scheduler = ParallelScheduler::new(registry, sessions, config.clone());

    let run_id = scheduler.run_parallel(RunRequest {
        paths,
        max_workers: cli.workers.unwrap_or(config.max_workers),
        functions,
        browser: cli.browser,
    })?;
    info!("Run {} started", run_id);

    let snapshot = tokio::select! {
        snapshot = scheduler.wait(&run_id) => snapshot?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping run {}", run_id);
            scheduler.stop(&run_id).await?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    if snapshot.aggregate.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets_groups_functions() {
        let targets = vec![
            "suites/login.rs".to_string(),
            "suites/herokuapp.rs::test_login".to_string(),
            "suites/herokuapp.rs::test_dynamic_waits".to_string(),
        ];
        let (paths, functions) = parse_targets(&targets);

        assert_eq!(paths, vec!["suites/login.rs", "suites/herokuapp.rs"]);
        assert_eq!(
            functions["suites/herokuapp.rs"],
            vec!["test_login", "test_dynamic_waits"]
        );
        assert!(!functions.contains_key("suites/login.rs"));
    }
}
