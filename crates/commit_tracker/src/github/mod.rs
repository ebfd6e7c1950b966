//! GitHub repositories: commits, releases and tags.
//!
//! # Module Structure
//!
//! - [`types`] - API response shapes
//! - [`client`] - [`GitHubFetcher`], the paginated fetcher
//! - [`convert`] - Conversion to [`crate::platform::CommitRecord`]

mod client;
mod convert;
mod types;

pub use client::GitHubFetcher;
pub use convert::{commit_record, release_record, tag_records};
pub use types::{
    GitHubCommit, GitHubCommitDetail, GitHubGitActor, GitHubRelease, GitHubTag, GitHubTagCommit,
    GitHubUser,
};
