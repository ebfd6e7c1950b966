use std::sync::Mutex;
use std::time::Duration;

use commit_tracker::sync::TrackerProgress;
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

#[derive(Default)]
struct ProgressState {
    /// One tick per roster row.
    rows_bar: Option<ProgressBar>,
    /// Spinner for the repository being fetched.
    fetch_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
///
/// Shows a bar over the roster rows and a spinner for the current fetch.
/// Failures and skips are printed above the bars so they stay visible.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: TrackerProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            TrackerProgress::RunStarted { total_rows } => {
                let bar = self.multi.add(ProgressBar::new(total_rows as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix("rows");
                state.rows_bar = Some(bar);
            }

            TrackerProgress::RowStarted {
                item_name,
                platform,
                repository,
                ..
            } => {
                let spinner = self.multi.add(ProgressBar::new_spinner());
                spinner.set_style(Self::spinner_style());
                spinner.set_prefix(platform.to_string());
                spinner.set_message(format!("{item_name} ({repository})"));
                spinner.enable_steady_tick(Duration::from_millis(100));
                if let Some(old) = state.fetch_bar.replace(spinner) {
                    old.finish_and_clear();
                }
            }

            TrackerProgress::RowSkipped {
                index,
                item_name,
                reason,
            } => {
                let label = item_name.unwrap_or_else(|| format!("row {index}"));
                self.println(format!("{} {label}: {reason}", style("skip").yellow()));
                Self::tick(&state);
            }

            TrackerProgress::RowFetched { item_name, records } => {
                if let Some(ref spinner) = state.fetch_bar {
                    spinner.set_message(format!("{item_name}: {records} records"));
                }
            }

            TrackerProgress::RowWritten {
                item_name,
                records,
                ..
            } => {
                if let Some(spinner) = state.fetch_bar.take() {
                    spinner.finish_and_clear();
                }
                if let Some(ref bar) = state.rows_bar {
                    bar.set_message(format!("{item_name} ({records} records)"));
                }
                Self::tick(&state);
            }

            TrackerProgress::RowFailed {
                item_name,
                platform,
                error,
            } => {
                if let Some(spinner) = state.fetch_bar.take() {
                    spinner.finish_and_clear();
                }
                self.println(format!(
                    "{} {item_name} [{platform}]: {error}",
                    style("fail").red().bold()
                ));
                Self::tick(&state);
            }

            TrackerProgress::RateLimitBackoff {
                platform,
                retry_after_ms,
                attempt,
                ..
            } => {
                if let Some(ref spinner) = state.fetch_bar {
                    spinner.set_message(format!(
                        "{platform} rate limited, retry {attempt} in {:.1}s",
                        retry_after_ms as f64 / 1000.0
                    ));
                }
            }

            TrackerProgress::Warning { message } => {
                self.println(format!("{} {message}", style("warn").yellow()));
            }

            TrackerProgress::RunComplete {
                written,
                skipped,
                failed,
                interrupted,
            } => {
                if let Some(spinner) = state.fetch_bar.take() {
                    spinner.finish_and_clear();
                }
                if let Some(ref bar) = state.rows_bar {
                    let verb = if interrupted { "Stopped" } else { "Done" };
                    bar.finish_with_message(format!(
                        "{verb}: {written} written, {skipped} skipped, {failed} failed"
                    ));
                }
            }

            _ => {}
        }
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref spinner) = state.fetch_bar {
            spinner.finish_and_clear();
        }
        if let Some(ref bar) = state.rows_bar
            && !bar.is_finished()
        {
            bar.finish();
        }
    }

    fn tick(state: &ProgressState) {
        if let Some(ref bar) = state.rows_bar {
            bar.inc(1);
        }
    }

    fn println(&self, line: String) {
        self.multi.println(line).ok();
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:>9.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>9.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
