//! The roster-driven run loop.
//!
//! Rows are processed strictly one after another: resolve the platform,
//! parse the identifier, fetch the history, write the file. Any failure is
//! confined to its row; the loop always moves on to the next one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use crate::bitbucket::BitbucketFetcher;
use crate::gist::GistFetcher;
use crate::github::GitHubFetcher;
use crate::gitlab::GitLabFetcher;
use crate::http::HttpTransport;
use crate::identifier::RepoIdentifier;
use crate::output::{FailureLedger, FailureRecord, write_commits};
use crate::platform::{
    ApiClient, ApiEndpoints, ApiRateLimiter, CommitFetcher, Credentials, DEFAULT_PAGE_SIZE,
    Platform, default_rps_for_platform, short_error_message,
};
use crate::retry::{RetryConfig, Sleeper, TokioSleeper};
use crate::roster::{RosterEntry, RosterError, read_roster};

use super::progress::{ProgressCallback, TrackerProgress, emit};
use super::sample::sample_history;
use super::types::{RunOptions, RunSummary};

/// Settings shared by every fetcher of a run.
#[derive(Clone)]
pub struct FetcherSettings {
    pub endpoints: ApiEndpoints,
    pub retry: RetryConfig,
    pub page_size: u32,
    /// Pace requests before they are sent, not only after a rate limit.
    pub pace_requests: bool,
    /// Overrides the per-platform pacing rate.
    pub requests_per_second: Option<u32>,
    pub sleeper: Arc<dyn Sleeper>,
    /// Receives backoff events from the API clients.
    pub on_progress: Option<Arc<ProgressCallback>>,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            retry: RetryConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            pace_requests: true,
            requests_per_second: None,
            sleeper: Arc::new(TokioSleeper),
            on_progress: None,
        }
    }
}

/// The fetcher registered for each platform.
#[derive(Default)]
pub struct Fetchers {
    by_platform: HashMap<Platform, Box<dyn CommitFetcher>>,
}

impl Fetchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fetcher` for the platform it reports, replacing any other.
    pub fn insert(&mut self, fetcher: Box<dyn CommitFetcher>) {
        self.by_platform.insert(fetcher.platform(), fetcher);
    }

    #[must_use]
    pub fn with(mut self, fetcher: impl CommitFetcher + 'static) -> Self {
        self.insert(Box::new(fetcher));
        self
    }

    pub fn for_platform(&self, platform: Platform) -> Option<&dyn CommitFetcher> {
        self.by_platform.get(&platform).map(|f| f.as_ref())
    }

    /// One fetcher per platform, all sharing `transport`.
    pub fn standard(
        transport: Arc<dyn HttpTransport>,
        credentials: &Credentials,
        settings: &FetcherSettings,
    ) -> Self {
        let client = |platform: Platform| {
            let limiter = settings.pace_requests.then(|| {
                ApiRateLimiter::new(
                    settings
                        .requests_per_second
                        .unwrap_or_else(|| default_rps_for_platform(platform)),
                )
            });
            ApiClient::new(platform, Arc::clone(&transport), credentials.auth_for(platform))
                .with_retry(settings.retry.clone())
                .with_sleeper(Arc::clone(&settings.sleeper))
                .with_rate_limiter(limiter)
                .with_progress(settings.on_progress.clone())
        };
        let endpoints = &settings.endpoints;

        Self::new()
            .with(
                GitHubFetcher::new(client(Platform::GitHub), endpoints.base_for(Platform::GitHub))
                    .with_page_size(settings.page_size),
            )
            .with(
                GistFetcher::new(client(Platform::Gist), endpoints.base_for(Platform::Gist))
                    .with_page_size(settings.page_size),
            )
            .with(
                GitLabFetcher::new(client(Platform::GitLab), endpoints.base_for(Platform::GitLab))
                    .with_page_size(settings.page_size),
            )
            .with(
                BitbucketFetcher::new(
                    client(Platform::Bitbucket),
                    endpoints.base_for(Platform::Bitbucket),
                )
                .with_page_size(settings.page_size),
            )
    }
}

/// What happened to one roster row.
#[derive(Debug)]
pub enum RowOutcome {
    Written { path: PathBuf, records: usize },
    Skipped { reason: String },
    Failed(FailureRecord),
}

/// Read the roster at `path` and process it.
///
/// Only an unreadable roster is an error; row failures end up in the summary.
pub async fn process_roster_file(
    path: &Path,
    fetchers: &Fetchers,
    options: &RunOptions,
    shutdown: Option<&AtomicBool>,
    on_progress: Option<&ProgressCallback>,
) -> Result<RunSummary, RosterError> {
    let entries = read_roster(path)?;
    info!(path = %path.display(), rows = entries.len(), "Read roster");
    Ok(process_roster(&entries, fetchers, options, shutdown, on_progress).await)
}

/// Process every roster row in order.
///
/// `shutdown` is checked before each row; once set, the run stops and the
/// summary is marked interrupted.
pub async fn process_roster(
    entries: &[RosterEntry],
    fetchers: &Fetchers,
    options: &RunOptions,
    shutdown: Option<&AtomicBool>,
    on_progress: Option<&ProgressCallback>,
) -> RunSummary {
    let ledger = FailureLedger::new(&options.output_dir);
    let mut summary = RunSummary::default();

    emit(
        on_progress,
        TrackerProgress::RunStarted {
            total_rows: entries.len(),
        },
    );

    for entry in entries {
        if shutdown.is_some_and(|flag| flag.load(Ordering::Acquire)) {
            warn!("Shutdown requested, stopping before the next row");
            summary.interrupted = true;
            break;
        }

        match process_entry(entry, fetchers, options, on_progress).await {
            RowOutcome::Written { records, .. } => {
                summary.processed += 1;
                summary.written += 1;
                summary.records += records;
            }
            RowOutcome::Skipped { .. } => summary.skipped += 1,
            RowOutcome::Failed(failure) => {
                summary.processed += 1;
                summary.failed += 1;
                if let Err(e) = ledger.record(&failure) {
                    warn!(error = %e, "Could not record failure in ledger");
                }
                summary.failures.push(failure);
            }
        }
    }

    info!(
        processed = summary.processed,
        written = summary.written,
        skipped = summary.skipped,
        failed = summary.failed,
        records = summary.records,
        "Run complete"
    );
    emit(
        on_progress,
        TrackerProgress::RunComplete {
            written: summary.written,
            skipped: summary.skipped,
            failed: summary.failed,
            interrupted: summary.interrupted,
        },
    );

    summary
}

/// Process a single roster row.
pub async fn process_entry(
    entry: &RosterEntry,
    fetchers: &Fetchers,
    options: &RunOptions,
    on_progress: Option<&ProgressCallback>,
) -> RowOutcome {
    if let Some(problem) = entry.unreadable.as_deref() {
        return skip(
            entry,
            None,
            &format!("unreadable row: {problem}"),
            on_progress,
        );
    }
    let Some(item_name) = entry.item_name.as_deref() else {
        return skip(entry, None, "missing item_name", on_progress);
    };

    let targets = entry.targets();
    let Some(&(platform, raw)) = targets.first() else {
        return skip(entry, Some(item_name), "no platform column filled", on_progress);
    };
    if targets.len() > 1 {
        let ignored: Vec<&str> = targets[1..].iter().map(|(p, _)| p.column()).collect();
        warn!(
            item = item_name,
            using = platform.column(),
            ignored = ?ignored,
            "Several platform columns filled, using the first"
        );
        emit(
            on_progress,
            TrackerProgress::Warning {
                message: format!(
                    "{item_name}: using {}, ignoring {}",
                    platform.column(),
                    ignored.join(", ")
                ),
            },
        );
    }

    emit(
        on_progress,
        TrackerProgress::RowStarted {
            index: entry.row,
            item_name: item_name.to_string(),
            platform,
            repository: raw.to_string(),
        },
    );

    let fail = |message: String| {
        error!(item = item_name, platform = %platform, repository = raw, error = %message, "Row failed");
        emit(
            on_progress,
            TrackerProgress::RowFailed {
                item_name: item_name.to_string(),
                platform,
                error: message.clone(),
            },
        );
        RowOutcome::Failed(FailureRecord {
            item_name: item_name.to_string(),
            platform,
            repository: raw.to_string(),
            error: message,
        })
    };

    let identifier = match RepoIdentifier::parse(platform, raw) {
        Ok(identifier) => identifier,
        Err(e) => return fail(short_error_message(&e)),
    };

    let Some(fetcher) = fetchers.for_platform(platform) else {
        return fail(format!("No fetcher configured for {platform}"));
    };

    let records = match fetcher.fetch_history(item_name, &identifier).await {
        Ok(records) => records,
        Err(e) => return fail(short_error_message(&e)),
    };
    emit(
        on_progress,
        TrackerProgress::RowFetched {
            item_name: item_name.to_string(),
            records: records.len(),
        },
    );

    let commits = records.iter().filter(|r| r.is_commit()).count();
    let mode = options.mode_for(commits);
    if mode != options.mode {
        info!(
            item = item_name,
            commits,
            threshold = ?options.large_repo_threshold,
            "Large repository detected, sampling yearly"
        );
        emit(
            on_progress,
            TrackerProgress::Warning {
                message: format!("{item_name}: {commits} commits, sampling yearly"),
            },
        );
    }

    let records = sample_history(records, mode);
    match write_commits(&options.output_dir, item_name, &records) {
        Ok(path) => {
            emit(
                on_progress,
                TrackerProgress::RowWritten {
                    item_name: item_name.to_string(),
                    path: path.clone(),
                    records: records.len(),
                },
            );
            RowOutcome::Written {
                path,
                records: records.len(),
            }
        }
        Err(e) => fail(short_error_message(&e)),
    }
}

fn skip(
    entry: &RosterEntry,
    item_name: Option<&str>,
    reason: &str,
    on_progress: Option<&ProgressCallback>,
) -> RowOutcome {
    warn!(row = entry.row, item = item_name, reason, "Skipping roster row");
    emit(
        on_progress,
        TrackerProgress::RowSkipped {
            index: entry.row,
            item_name: item_name.map(str::to_string),
            reason: reason.to_string(),
        },
    );
    RowOutcome::Skipped {
        reason: reason.to_string(),
    }
}
