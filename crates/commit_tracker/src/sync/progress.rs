//! Progress reporting types for tracker runs.
//!
//! The engine and the API clients report what they are doing through a
//! single event enum, leaving presentation (progress bars, log lines) to the
//! caller.

use std::path::PathBuf;

use crate::platform::Platform;

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TrackerProgress {
    /// The roster was read.
    RunStarted {
        /// Number of roster rows (skipped rows included).
        total_rows: usize,
    },

    /// Starting to fetch one repository.
    RowStarted {
        /// 1-indexed position in the roster.
        index: usize,
        item_name: String,
        platform: Platform,
        /// Repository identifier as written in the roster.
        repository: String,
    },

    /// Row ignored without fetching anything.
    RowSkipped {
        index: usize,
        /// Item name, if the row had one.
        item_name: Option<String>,
        reason: String,
    },

    /// History fetched, not yet written.
    RowFetched {
        item_name: String,
        /// Records returned by the platform before sampling.
        records: usize,
    },

    /// Output file written.
    RowWritten {
        item_name: String,
        path: PathBuf,
        /// Records in the file.
        records: usize,
    },

    /// Row failed; the run continues with the next one.
    RowFailed {
        item_name: String,
        platform: Platform,
        error: String,
    },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        platform: Platform,
        url: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Retry number, starting at 1.
        attempt: usize,
    },

    /// Warning message (non-fatal).
    Warning { message: String },

    /// Every row has been attempted (or the run was interrupted).
    RunComplete {
        written: usize,
        skipped: usize,
        failed: usize,
        interrupted: bool,
    },
}

/// Callback for progress updates during a run.
pub type ProgressCallback = Box<dyn Fn(TrackerProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
///
/// # Example
///
/// ```ignore
/// use commit_tracker::sync::{emit, ProgressCallback, TrackerProgress};
///
/// fn step(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, TrackerProgress::Warning { message: "hi".into() });
/// }
/// ```
#[inline]
pub fn emit(callback: Option<&ProgressCallback>, event: TrackerProgress) {
    if let Some(cb) = callback {
        cb(event);
    }
}
