//! The tracker run: roster rows in, one CSV per repository out.
//!
//! # Module Structure
//!
//! - [`types`] - `RunOptions` (with the large-repository threshold), `RunSummary`, `SamplingMode`
//! - [`progress`] - Progress reporting: `TrackerProgress`, `ProgressCallback`, `emit()`
//! - [`sample`] - Monthly and yearly thinning of commit histories
//! - [`engine`] - The run loop: `process_roster()`, `process_roster_file()`
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
//! let summary = process_roster_file(path, &fetchers, &RunOptions::default(), None, None).await?;
//! println!("{} files written, {} failed", summary.written, summary.failed);
//! ```

pub mod engine;
mod progress;
pub mod sample;
mod types;

pub use types::{
    DEFAULT_LARGE_REPO_THRESHOLD, DEFAULT_OUTPUT_DIR, RunOptions, RunSummary, SamplingMode,
};

pub use progress::{ProgressCallback, TrackerProgress, emit};

pub use engine::{
    FetcherSettings, Fetchers, RowOutcome, process_entry, process_roster, process_roster_file,
};
pub use sample::sample_history;
