//! Run options and results.

use std::path::PathBuf;

use serde::Deserialize;

use crate::output::FailureRecord;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Commit count above which a full-history run samples yearly instead.
pub const DEFAULT_LARGE_REPO_THRESHOLD: usize = 1000;

/// How much of each repository's commit history is kept.
///
/// Releases and tags are always kept in full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Every commit.
    #[default]
    Full,
    /// The most recent commit of each calendar month.
    Monthly,
    /// The most recent commit of each calendar year.
    Yearly,
}

impl std::fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SamplingMode::Full => "full",
            SamplingMode::Monthly => "monthly",
            SamplingMode::Yearly => "yearly",
        })
    }
}

impl std::str::FromStr for SamplingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(SamplingMode::Full),
            "monthly" => Ok(SamplingMode::Monthly),
            "yearly" => Ok(SamplingMode::Yearly),
            _ => Err(format!(
                "Unknown sampling mode: {s} (expected full, monthly or yearly)"
            )),
        }
    }
}

/// Options for a tracker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory receiving `<item_name>.csv` files and the failure ledger.
    pub output_dir: PathBuf,
    pub mode: SamplingMode,
    /// In [`SamplingMode::Full`], repositories with more commits than this
    /// are sampled yearly. `None` keeps every history in full.
    pub large_repo_threshold: Option<usize>,
}

impl RunOptions {
    /// The sampling mode for a repository with `commits` commits.
    pub fn mode_for(&self, commits: usize) -> SamplingMode {
        match (self.mode, self.large_repo_threshold) {
            (SamplingMode::Full, Some(threshold)) if commits > threshold => SamplingMode::Yearly,
            (mode, _) => mode,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            mode: SamplingMode::default(),
            large_repo_threshold: Some(DEFAULT_LARGE_REPO_THRESHOLD),
        }
    }
}

/// Result of a tracker run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Rows attempted (fetched or failed), skipped rows excluded.
    pub processed: usize,
    /// Output files written.
    pub written: usize,
    /// Rows skipped without fetching (no item name or no platform).
    pub skipped: usize,
    /// Rows that failed.
    pub failed: usize,
    /// Records written across all files.
    pub records: usize,
    /// Whether the run stopped early on a shutdown request.
    pub interrupted: bool,
    /// Failures in roster order.
    pub failures: Vec<FailureRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_repositories_fall_back_to_yearly() {
        let options = RunOptions {
            large_repo_threshold: Some(2),
            ..RunOptions::default()
        };
        assert_eq!(options.mode_for(2), SamplingMode::Full);
        assert_eq!(options.mode_for(3), SamplingMode::Yearly);

        let monthly = RunOptions {
            mode: SamplingMode::Monthly,
            ..options.clone()
        };
        assert_eq!(monthly.mode_for(3), SamplingMode::Monthly);

        let unlimited = RunOptions {
            large_repo_threshold: None,
            ..options
        };
        assert_eq!(unlimited.mode_for(usize::MAX), SamplingMode::Full);
    }

    #[test]
    fn default_threshold_is_one_thousand_commits() {
        let options = RunOptions::default();
        assert_eq!(options.large_repo_threshold, Some(1000));
        assert_eq!(options.mode_for(1000), SamplingMode::Full);
        assert_eq!(options.mode_for(1001), SamplingMode::Yearly);
    }
}
