//! Bitbucket Cloud repositories: commits and tags.

mod client;
mod convert;
mod types;

pub use client::{BITBUCKET_PAGE_SIZE, BitbucketFetcher};
pub use convert::{author_name, commit_record, tag_record};
pub use types::{BitbucketAuthor, BitbucketCommit, BitbucketTag, BitbucketUser};
