//! Bitbucket Cloud REST API (2.0) response shapes.
//!
//! List endpoints wrap items in a [`crate::platform::CursorPage`].

use serde::Deserialize;

/// Item of `GET /repositories/{workspace}/{slug}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct BitbucketCommit {
    pub hash: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<BitbucketAuthor>,
}

/// Commit author: the raw git signature plus the linked account, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct BitbucketAuthor {
    /// `Name <email>` as recorded in git.
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub user: Option<BitbucketUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BitbucketUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Item of `GET /repositories/{workspace}/{slug}/refs/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct BitbucketTag {
    pub name: String,
    #[serde(default)]
    pub target: Option<BitbucketCommit>,
}
