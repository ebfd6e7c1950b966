//! Commit Tracker - collect repository histories from a CSV roster.
//!
//! Each roster row names an item and where its code lives: a GitHub
//! repository, a GitHub Gist, a GitLab project, or a Bitbucket repository.
//! The tracker fetches the full commit history plus releases and tags for
//! every row and writes one CSV file per item.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use commit_tracker::http::ReqwestTransport;
//! use commit_tracker::platform::Credentials;
//! use commit_tracker::sync::{FetcherSettings, Fetchers, RunOptions, process_roster_file};
//!
//! let transport = Arc::new(ReqwestTransport::new(reqwest::Client::new()));
//! let fetchers = Fetchers::standard(transport, &Credentials::from_env(), &FetcherSettings::default());
//! let summary =
//!     process_roster_file("repositories.csv".as_ref(), &fetchers, &RunOptions::default(), None, None)
//!         .await?;
//! ```

pub mod bitbucket;
pub mod gist;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod identifier;
pub mod output;
pub mod platform;
pub mod retry;
pub mod roster;
pub mod sync;

pub use identifier::{RepoIdentifier, parse_identifier};
pub use output::{FailureLedger, FailureRecord, OutputError, write_commits};
pub use platform::{
    ApiClient, ApiEndpoints, ApiRateLimiter, Auth, CommitFetcher, CommitRecord, Credentials,
    Platform, PlatformError, rate_limits,
};
pub use roster::{RosterEntry, RosterError, read_roster};
pub use sync::{
    FetcherSettings, Fetchers, RunOptions, RunSummary, SamplingMode, TrackerProgress,
    process_roster, process_roster_file,
};
