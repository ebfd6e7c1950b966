//! GitLab projects: commits, releases and tags.
//!
//! # Module Structure
//!
//! - [`types`] - API response shapes
//! - [`client`] - [`GitLabFetcher`] and project path encoding
//! - [`convert`] - Conversion to [`crate::platform::CommitRecord`]

mod client;
mod convert;
mod types;

pub use client::{GitLabFetcher, encode_project};
pub use convert::{commit_record, release_record, tag_records};
pub use types::{GitLabCommit, GitLabCommitRef, GitLabRelease, GitLabTag, GitLabUser};
