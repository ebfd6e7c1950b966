//! Commit Tracker CLI - fetch repository histories listed in a CSV roster.

mod config;
mod progress;
mod shutdown;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use commit_tracker::http::{HttpTransport, ReqwestTransport};
use commit_tracker::platform::Credentials;
use commit_tracker::sync::{
    FetcherSettings, Fetchers, RunOptions, RunSummary, SamplingMode, process_roster_file,
};
use console::{Term, style};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "commit-tracker")]
#[command(version)]
#[command(about = "Collect commit, release and tag histories for a list of repositories")]
#[command(
    long_about = "Commit Tracker reads a CSV roster of items, each pointing at a GitHub \
repository, a GitHub Gist, a GitLab project or a Bitbucket repository, and writes the \
full commit history (plus releases and tags) of each one to <output>/<item_name>.csv."
)]
#[command(after_long_help = r#"ROSTER FORMAT
    item_name,github,gist,gitlab,bitbucket
    widget,acme/widget,,,
    snippet,,https://gist.github.com/octocat/aa5a315d,,
    tool,,,,team/tool

    When a row fills several platform columns, the first of github, gist,
    gitlab, bitbucket wins. Rows without item_name or any platform, and rows
    that cannot be decoded, are skipped.

SAMPLING
    --mode full keeps every commit, except that a repository with more than
    --threshold commits (default 1000) is sampled yearly. --mode monthly and
    --mode yearly keep the latest commit of each month or year.

OUTPUT
    <output>/<item_name>.csv    item_name,date,message,sha,author
    <output>/errors/errors.csv  rows that could not be fetched

CONFIGURATION
    Commit Tracker reads configuration from:
      1. ~/.config/commit_tracker/config.toml (or $XDG_CONFIG_HOME/commit_tracker/config.toml)
      2. ./commit_tracker.toml
      3. Environment variables (COMMIT_TRACKER_* prefix, e.g., COMMIT_TRACKER_OUTPUT__DIR)

ENVIRONMENT VARIABLES
    GITHUB_TOKEN              GitHub token (also used for Gists)
    GITLAB_TOKEN              GitLab personal access token
    BITBUCKET_USERNAME        Bitbucket username
    BITBUCKET_APP_PASSWORD    Bitbucket app password
    RUST_LOG                  Log filter (default: commit_tracker=info,commit_tracker_cli=info)

    A .env file in the current directory is loaded first.
"#)]
struct Cli {
    /// Roster CSV to read
    #[arg(default_value = "repositories.csv")]
    csv_file: PathBuf,

    /// Directory for the per-item CSV files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep every commit, or only the latest one per month or year
    #[arg(short, long)]
    mode: Option<SamplingMode>,

    /// In full mode, sample yearly once a repository has more commits than this (0 disables)
    #[arg(short, long)]
    threshold: Option<usize>,

    /// Retries after a rate-limited response before a row fails
    #[arg(long)]
    max_retries: Option<usize>,

    /// Disable proactive request pacing
    #[arg(long)]
    no_rate_limit: bool,

    /// Log file to append to
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (config, config_error) = match config::Config::load() {
        Ok(config) => (config, None),
        Err(e) => (config::Config::default(), Some(e)),
    };

    let is_tty = Term::stdout().is_term();
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.output.log_file.clone());
    let _log_guard = init_tracing(&log_file, is_tty)?;

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Invalid configuration, using defaults");
        if is_tty {
            eprintln!(
                "{} Invalid configuration, using defaults: {e}",
                style("warning:").yellow().bold()
            );
        }
    }

    // Set up graceful shutdown handler (Ctrl+C)
    shutdown::setup_shutdown_handler();

    let credentials = Credentials::from_env();
    for platform in credentials.missing() {
        tracing::warn!(
            platform = %platform,
            "No credentials configured, requests will be unauthenticated"
        );
    }

    let options = RunOptions {
        output_dir: cli
            .output
            .clone()
            .unwrap_or_else(|| config.output.dir.clone()),
        mode: cli.mode.unwrap_or(config.sync.mode),
        large_repo_threshold: config.large_repo_threshold(cli.threshold),
    };

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::with_timeout(
        config.http_timeout(),
        concat!("commit-tracker/", env!("CARGO_PKG_VERSION")),
    )?);
    let settings = FetcherSettings {
        endpoints: config.endpoints(),
        retry: config.retry_config(cli.max_retries),
        page_size: config.http.page_size,
        pace_requests: !(cli.no_rate_limit || config.sync.no_rate_limit),
        requests_per_second: config.http.requests_per_second,
        on_progress: Some(Arc::clone(&callback)),
        ..FetcherSettings::default()
    };
    let fetchers = Fetchers::standard(transport, &credentials, &settings);

    tracing::info!(
        roster = %cli.csv_file.display(),
        output = %options.output_dir.display(),
        mode = %options.mode,
        "Starting run"
    );

    let summary = match process_roster_file(
        &cli.csv_file,
        &fetchers,
        &options,
        Some(shutdown::shutdown_flag()),
        Some(&*callback),
    )
    .await
    {
        Ok(summary) => summary,
        Err(e) => {
            reporter.finish();
            tracing::error!(roster = %cli.csv_file.display(), error = %e, "Cannot read roster");
            return Err(e.into());
        }
    };
    reporter.finish();

    if reporter.is_interactive() {
        print_summary(&summary, &options.output_dir);
    }

    Ok(())
}

/// Install the global subscriber: always a log file, plus stderr when not on a TTY.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(log_file: &Path, is_tty: bool) -> std::io::Result<WorkerGuard> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("commit_tracker=info,commit_tracker_cli=info"),
    };

    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&directory)?;
    let file_name = log_file
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_LOG_FILE));

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    let stderr_layer = (!is_tty).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(guard)
}

fn print_summary(summary: &RunSummary, output_dir: &Path) {
    println!();
    println!(
        "{} {} written to {} ({} records)",
        style("✓").green().bold(),
        summary.written,
        output_dir.display(),
        summary.records
    );
    if summary.skipped > 0 {
        println!("  {} rows skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!(
            "{} {} failed, see {}",
            style("✗").red().bold(),
            summary.failed,
            commit_tracker::output::failure_ledger_path(output_dir).display()
        );
        for failure in &summary.failures {
            println!(
                "  {} [{}] {}: {}",
                failure.item_name, failure.platform, failure.repository, failure.error
            );
        }
    }
    if summary.interrupted {
        println!("{}", style("Stopped early on Ctrl+C").yellow());
    }
}
