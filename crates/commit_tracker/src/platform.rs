//! Platform-agnostic building blocks for the history fetchers.
//!
//! This module defines the [`CommitFetcher`] trait implemented by every
//! platform, the [`CommitRecord`] they produce, and the rate-limited
//! [`ApiClient`] they share.
//!
//! # Example
//!
//! ```ignore
//! use commit_tracker::identifier::RepoIdentifier;
//! use commit_tracker::platform::{CommitFetcher, Platform, PlatformError};
//!
//! async fn dump(fetcher: &dyn CommitFetcher) -> Result<(), PlatformError> {
//!     let id = RepoIdentifier::parse(Platform::GitHub, "rust-lang/rust")?;
//!     for record in fetcher.fetch_history("rust", &id).await? {
//!         println!("{} {}", record.sha, record.message);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod convert;
mod credentials;
mod errors;
mod pagination;
mod rate_limit;
mod types;

pub use client::{ApiClient, GITHUB_API_VERSION, build_url};
pub use convert::{
    RELEASE_PREFIX, TAG_PREFIX, UNKNOWN_AUTHOR, author_or_unknown, first_line, normalize_date,
};
pub use credentials::{
    ApiEndpoints, Auth, BITBUCKET_API_URL, BITBUCKET_APP_PASSWORD_VAR, BITBUCKET_USERNAME_VAR,
    Credentials, GITHUB_API_URL, GITHUB_TOKEN_VAR, GITLAB_API_URL, GITLAB_TOKEN_VAR,
};
pub use errors::{PlatformError, Result, short_error_message};
pub use pagination::{
    CursorPage, DEFAULT_PAGE_SIZE, collect_cursor_pages, collect_numbered_pages,
};
pub use rate_limit::{
    ApiRateLimiter, default_rps_for_platform, is_rate_limited_response, rate_limits, retry_after,
};
pub use types::{CommitFetcher, CommitRecord, Platform};
