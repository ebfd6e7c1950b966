//! The rate-limited JSON client shared by every platform fetcher.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport};
use crate::retry::{RetryConfig, Sleeper, TokioSleeper};
use crate::sync::{ProgressCallback, TrackerProgress, emit};

use super::credentials::Auth;
use super::errors::{PlatformError, Result};
use super::rate_limit::{ApiRateLimiter, is_rate_limited_response, retry_after};
use super::types::Platform;

/// GitHub REST API version pinned in every GitHub request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Longest error body kept in `PlatformError::Http`.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Authenticated GET client with rate-limit backoff.
///
/// Every request goes through the same loop: optional proactive pacing, the
/// request itself, then classification of the response. Rate-limited
/// responses are retried after the server-requested delay or the next value
/// of the [`RetryConfig`] schedule, until the schedule runs dry.
#[derive(Clone)]
pub struct ApiClient {
    platform: Platform,
    transport: Arc<dyn HttpTransport>,
    auth: Auth,
    default_headers: HttpHeaders,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    rate_limiter: Option<ApiRateLimiter>,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl ApiClient {
    pub fn new(platform: Platform, transport: Arc<dyn HttpTransport>, auth: Auth) -> Self {
        let default_headers = match platform {
            Platform::GitHub | Platform::Gist => vec![
                (
                    "Accept".to_string(),
                    "application/vnd.github+json".to_string(),
                ),
                (
                    "X-GitHub-Api-Version".to_string(),
                    GITHUB_API_VERSION.to_string(),
                ),
            ],
            Platform::GitLab | Platform::Bitbucket => {
                vec![("Accept".to_string(), "application/json".to_string())]
            }
        };

        Self {
            platform,
            transport,
            auth,
            default_headers,
            retry: RetryConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            rate_limiter: None,
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Option<ApiRateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Report backoffs through a progress callback.
    #[must_use]
    pub fn with_progress(mut self, on_progress: Option<Arc<ProgressCallback>>) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// GET `url` with `params` and deserialize the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T> {
        let full_url = build_url(url, params)?;
        let response = self.send_with_backoff(&full_url).await?;
        serde_json::from_slice(&response.body).map_err(|source| PlatformError::Json {
            url: full_url,
            source,
        })
    }

    fn request(&self, url: &str) -> HttpRequest {
        let mut headers = self.default_headers.clone();
        if let Some(auth) = self.auth.header() {
            headers.push(auth);
        }
        HttpRequest {
            url: url.to_string(),
            headers,
        }
    }

    async fn send_with_backoff(&self, url: &str) -> Result<HttpResponse> {
        let mut schedule = self.retry.schedule();
        let mut attempt: usize = 0;

        loop {
            attempt += 1;
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            debug!(platform = %self.platform, url, attempt, "GET");
            let response = self
                .transport
                .send(self.request(url))
                .await
                .map_err(|e| PlatformError::network(e.to_string()))?;

            if response.is_success() {
                return Ok(response);
            }

            if is_rate_limited_response(&response) {
                let Some(scheduled) = schedule.next() else {
                    error!(
                        platform = %self.platform,
                        url,
                        attempts = attempt,
                        "Rate limit retries exhausted"
                    );
                    return Err(PlatformError::RateLimitExceeded {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                };

                let delay = retry_after(&response.headers, Utc::now())
                    .map(|requested| self.retry.clamp_retry_after(requested))
                    .unwrap_or(scheduled);
                self.report_backoff(url, delay, attempt);
                self.sleeper.sleep(delay).await;
                continue;
            }

            if response.status == 404 {
                warn!(platform = %self.platform, url, "Not found");
                return Err(PlatformError::not_found(url));
            }

            let body: String = response
                .body_text()
                .trim()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            warn!(platform = %self.platform, url, status = response.status, "Request failed");
            return Err(PlatformError::Http {
                status: response.status,
                body,
            });
        }
    }

    fn report_backoff(&self, url: &str, delay: Duration, attempt: usize) {
        let retry_after_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        warn!(
            platform = %self.platform,
            url,
            attempt,
            delay_ms = retry_after_ms,
            "Rate limited, backing off"
        );
        emit(
            self.on_progress.as_deref(),
            TrackerProgress::RateLimitBackoff {
                platform: self.platform,
                url: url.to_string(),
                retry_after_ms,
                attempt,
            },
        );
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("platform", &self.platform)
            .field("auth", &self.auth)
            .field("retry", &self.retry)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Append query parameters to `url`, keeping any query it already has.
pub fn build_url(url: &str, params: &[(&str, String)]) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(|e| PlatformError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !params.is_empty() {
        let mut query = parsed.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }

    Ok(parsed.into())
}
