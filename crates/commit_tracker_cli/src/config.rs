//! Configuration file support for commit-tracker.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `COMMIT_TRACKER_`, sections split
//!    by a double underscore, e.g. `COMMIT_TRACKER_RETRY__MAX_RETRIES`)
//! 3. Local config file (./commit_tracker.toml)
//! 4. XDG config file (~/.config/commit_tracker/config.toml)
//! 5. Built-in defaults
//!
//! Credentials are not part of the config file; they come from
//! `GITHUB_TOKEN`, `GITLAB_TOKEN`, `BITBUCKET_USERNAME` and
//! `BITBUCKET_APP_PASSWORD` (optionally via a `.env` file).
//!
//! Example config file:
//! ```toml
//! [output]
//! dir = "output"
//! log_file = "commit_tracker.log"
//!
//! [api]
//! github_url = "https://api.github.com"
//! gitlab_url = "https://gitlab.example.com/api/v4"  # self-hosted GitLab
//!
//! [http]
//! timeout_secs = 30
//! page_size = 100
//! requests_per_second = 5  # overrides the per-platform pacing rate
//!
//! [retry]
//! min_delay_ms = 1000
//! max_delay_ms = 60000
//! max_retries = 5
//!
//! [sync]
//! mode = "monthly"
//! no_rate_limit = false
//! large_repo_threshold = 1000  # 0 keeps every history in full
//! ```

use std::path::PathBuf;
use std::time::Duration;

use commit_tracker::platform::{ApiEndpoints, BITBUCKET_API_URL, GITHUB_API_URL, GITLAB_API_URL};
use commit_tracker::retry::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES, RetryConfig};
use commit_tracker::sync::{DEFAULT_LARGE_REPO_THRESHOLD, DEFAULT_OUTPUT_DIR, SamplingMode};
use config::builder::{ConfigBuilder as SourceBuilder, DefaultState};
use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "commit_tracker.log";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    /// API base URLs.
    pub api: ApiConfig,
    pub http: HttpConfig,
    /// Rate-limit backoff.
    pub retry: RetryConfigFile,
    pub sync: SyncConfig,
}

/// Where results and logs go.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// API base URLs, for self-hosted instances or testing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub github_url: String,
    pub gitlab_url: String,
    pub bitbucket_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            github_url: GITHUB_API_URL.to_string(),
            gitlab_url: GITLAB_API_URL.to_string(),
            bitbucket_url: BITBUCKET_API_URL.to_string(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Items requested per page.
    pub page_size: u32,
    /// Pacing rate applied to every platform instead of its default.
    pub requests_per_second: Option<u32>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            page_size: 100,
            requests_per_second: None,
        }
    }
}

/// Backoff settings as they appear in the config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfigFile {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_retries: usize,
}

impl Default for RetryConfigFile {
    fn default() -> Self {
        Self {
            min_delay_ms: INITIAL_BACKOFF_MS,
            max_delay_ms: MAX_BACKOFF_MS,
            max_retries: MAX_RETRIES,
        }
    }
}

/// Default run options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Sampling mode for commit histories.
    pub mode: SamplingMode,
    /// Whether to disable proactive rate limiting.
    pub no_rate_limit: bool,
    /// Full-mode repositories with more commits are sampled yearly; 0 disables.
    pub large_repo_threshold: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::default(),
            no_rate_limit: false,
            large_repo_threshold: DEFAULT_LARGE_REPO_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/commit_tracker/config.toml)
    /// 3. Local config file (./commit_tracker.toml)
    /// 4. Environment variables with COMMIT_TRACKER_ prefix
    ///
    /// This runs before logging is set up, so a broken source is returned as
    /// an error for the caller to report.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("commit_tracker.toml");
        if local_config.exists() {
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // COMMIT_TRACKER_RETRY__MAX_RETRIES -> retry.max_retries
        builder = builder.add_source(
            Environment::with_prefix("COMMIT_TRACKER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn from_builder(builder: SourceBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// API endpoints with trailing slashes removed.
    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints {
            github: self.api.github_url.trim_end_matches('/').to_string(),
            gitlab: self.api.gitlab_url.trim_end_matches('/').to_string(),
            bitbucket: self.api.bitbucket_url.trim_end_matches('/').to_string(),
        }
    }

    /// Backoff configuration, with `max_retries` overridden when given.
    pub fn retry_config(&self, max_retries: Option<usize>) -> RetryConfig {
        RetryConfig::new(
            Duration::from_millis(self.retry.min_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms.max(self.retry.min_delay_ms)),
            max_retries.unwrap_or(self.retry.max_retries),
        )
    }

    /// The large-repository threshold, `None` when set to 0.
    pub fn large_repo_threshold(&self, cli: Option<usize>) -> Option<usize> {
        Some(cli.unwrap_or(self.sync.large_repo_threshold)).filter(|n| *n > 0)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs.max(1))
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "commit_tracker").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_from_toml(content: &str) -> Result<Config, ConfigError> {
        Config::from_builder(
            ConfigBuilder::builder().add_source(config::File::from_str(content, FileFormat::Toml)),
        )
    }

    fn from_toml(content: &str) -> Config {
        try_from_toml(content).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert_eq!(config.output.log_file, PathBuf::from("commit_tracker.log"));
        assert_eq!(config.api.github_url, GITHUB_API_URL);
        assert_eq!(config.http.page_size, 100);
        assert_eq!(config.http.requests_per_second, None);
        assert_eq!(config.retry.min_delay_ms, 1_000);
        assert_eq!(config.retry.max_delay_ms, 60_000);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.sync.mode, SamplingMode::Full);
        assert!(!config.sync.no_rate_limit);
        assert_eq!(config.sync.large_repo_threshold, 1000);
    }

    #[test]
    fn test_config_builder_with_defaults() {
        let settings = ConfigBuilder::builder().build().unwrap();
        let config: Config = settings.try_deserialize().unwrap_or_default();
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn test_full_config_parsing() {
        let config = from_toml(
            r#"
            [output]
            dir = "/tmp/histories"

            [api]
            gitlab_url = "https://gitlab.example.com/api/v4/"

            [http]
            timeout_secs = 10
            requests_per_second = 3

            [retry]
            max_retries = 2

            [sync]
            mode = "yearly"
            no_rate_limit = true
            "#,
        );

        assert_eq!(config.output.dir, PathBuf::from("/tmp/histories"));
        assert_eq!(config.output.log_file, PathBuf::from("commit_tracker.log"));
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.requests_per_second, Some(3));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.min_delay_ms, 1_000);
        assert_eq!(config.sync.mode, SamplingMode::Yearly);
        assert!(config.sync.no_rate_limit);

        let endpoints = config.endpoints();
        assert_eq!(endpoints.gitlab, "https://gitlab.example.com/api/v4");
        assert_eq!(endpoints.github, GITHUB_API_URL);
    }

    #[test]
    fn test_retry_config_override() {
        let config = from_toml("[retry]\nmin_delay_ms = 10\nmax_delay_ms = 40\n");
        assert_eq!(
            config.retry_config(None),
            RetryConfig::new(Duration::from_millis(10), Duration::from_millis(40), 5)
        );
        assert_eq!(
            config.retry_config(Some(0)),
            RetryConfig::new(Duration::from_millis(10), Duration::from_millis(40), 0)
        );
    }

    #[test]
    fn test_retry_max_delay_never_below_min() {
        let config = from_toml("[retry]\nmin_delay_ms = 500\nmax_delay_ms = 100\n");
        let retry = config.retry_config(None);
        assert_eq!(
            retry,
            RetryConfig::new(Duration::from_millis(500), Duration::from_millis(500), 5)
        );
    }

    #[test]
    fn test_large_repo_threshold() {
        let config = Config::default();
        assert_eq!(config.large_repo_threshold(None), Some(1000));
        assert_eq!(config.large_repo_threshold(Some(50)), Some(50));
        assert_eq!(config.large_repo_threshold(Some(0)), None);

        let disabled = from_toml("[sync]\nlarge_repo_threshold = 0\n");
        assert_eq!(disabled.large_repo_threshold(None), None);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(try_from_toml("[sync]\nmode = \"weekly\"\n").is_err());
        assert!(try_from_toml("[http]\ntimeout_secs = \"soon\"\n").is_err());
        assert!(try_from_toml("[output\ndir = 1").is_err());
    }

    #[test]
    fn test_http_timeout_has_a_floor() {
        let config = from_toml("[http]\ntimeout_secs = 0\n");
        assert_eq!(config.http_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = Config::default_config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
