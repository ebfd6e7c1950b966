use commit_tracker::sync::TrackerProgress;

/// Logging reporter using tracing for structured output.
///
/// The library already logs each step; this reporter adds the run-level
/// lines a non-interactive caller would otherwise read off the progress bar.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: TrackerProgress) {
        match event {
            TrackerProgress::RunStarted { total_rows } => {
                tracing::info!(total_rows, "Processing roster");
            }

            TrackerProgress::RowStarted {
                index,
                item_name,
                platform,
                repository,
            } => {
                tracing::debug!(
                    row = index,
                    item = %item_name,
                    platform = %platform,
                    repository = %repository,
                    "Row started"
                );
            }

            TrackerProgress::RowFetched { item_name, records } => {
                tracing::debug!(item = %item_name, records, "Fetched history");
            }

            TrackerProgress::RowWritten {
                item_name,
                path,
                records,
            } => {
                tracing::info!(item = %item_name, path = %path.display(), records, "Saved");
            }

            TrackerProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            TrackerProgress::RunComplete {
                written,
                skipped,
                failed,
                interrupted,
            } => {
                if interrupted {
                    tracing::warn!(written, skipped, failed, "Run interrupted");
                } else {
                    tracing::info!(written, skipped, failed, "All rows processed");
                }
            }

            // Skips, failures and backoffs are logged where they happen.
            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
