use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::http::{HttpHeaders, HttpResponse, header_get};

use super::types::Platform;

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default proactive pacing per platform (requests per second).
pub mod rate_limits {
    /// GitHub: 5000 requests/hour authenticated, we use 10/sec to allow bursts.
    pub const GITHUB_DEFAULT_RPS: u32 = 10;
    /// GitLab: 2000 requests/minute = ~33/sec, we use 5/sec for safety.
    pub const GITLAB_DEFAULT_RPS: u32 = 5;
    /// Bitbucket: 1000 requests/hour per user, conservative default.
    pub const BITBUCKET_DEFAULT_RPS: u32 = 2;
}

/// Get the default pacing for a platform.
pub fn default_rps_for_platform(platform: Platform) -> u32 {
    match platform {
        Platform::GitHub | Platform::Gist => rate_limits::GITHUB_DEFAULT_RPS,
        Platform::GitLab => rate_limits::GITLAB_DEFAULT_RPS,
        Platform::Bitbucket => rate_limits::BITBUCKET_DEFAULT_RPS,
    }
}

/// A proactive request pacer using the governor crate.
///
/// # Example
///
/// ```ignore
/// use commit_tracker::platform::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(10); // 10 requests per second
///
/// // Before each API call:
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    ///
    /// A value of 0 is treated as 1.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Self {
            inner: Arc::new(rate_limiter),
        }
    }

    /// Wait until a request is allowed by the rate limiter.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

impl std::fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRateLimiter").finish_non_exhaustive()
    }
}

/// Whether a response means "slow down" rather than a hard failure.
///
/// 429 always qualifies. 403 qualifies only with a rate-limit signal:
/// a `Retry-After` header, an exhausted remaining counter, or a body that
/// mentions the rate limit.
pub fn is_rate_limited_response(response: &HttpResponse) -> bool {
    match response.status {
        429 => true,
        403 => {
            response.header("retry-after").is_some()
                || remaining_is_zero(&response.headers)
                || response.body_text().to_lowercase().contains("rate limit")
        }
        _ => false,
    }
}

fn remaining_is_zero(headers: &HttpHeaders) -> bool {
    ["x-ratelimit-remaining", "ratelimit-remaining"]
        .iter()
        .filter_map(|name| header_get(headers, name))
        .any(|v| v.trim() == "0")
}

/// Server-requested wait before retrying, if the response carries one.
///
/// `Retry-After` (delta seconds or HTTP date) takes precedence. Otherwise a
/// reset epoch (`X-RateLimit-Reset` / `RateLimit-Reset`) is used, but only
/// when the remaining counter is exhausted.
pub fn retry_after(headers: &HttpHeaders, now: DateTime<Utc>) -> Option<Duration> {
    if let Some(value) = header_get(headers, "retry-after") {
        let value = value.trim();
        if let Ok(secs) = value.parse::<u64>() {
            return Some(Duration::from_secs(secs));
        }
        if let Ok(at) = DateTime::parse_from_rfc2822(value) {
            return Some(until(at.with_timezone(&Utc), now));
        }
    }

    if !remaining_is_zero(headers) {
        return None;
    }

    ["x-ratelimit-reset", "ratelimit-reset"]
        .iter()
        .filter_map(|name| header_get(headers, name))
        .find_map(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .map(|reset_at| until(reset_at, now))
}

fn until(at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (at - now).to_std().unwrap_or(Duration::ZERO)
}
