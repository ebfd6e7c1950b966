//! GitHub REST API response shapes.
//!
//! Only the fields that end up in a [`crate::platform::CommitRecord`] are
//! declared; everything else in the payload is ignored. Timestamps stay as
//! strings so an unexpected format degrades to a raw value instead of a
//! failed row.

use serde::Deserialize;

/// Item of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub commit: GitHubCommitDetail,
    /// Linked GitHub account; null when the author email matches no user.
    #[serde(default)]
    pub author: Option<GitHubUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<GitHubGitActor>,
}

/// Git-level author (name and date from the commit object).
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubGitActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Item of `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_commitish: Option<String>,
    /// Null for draft releases.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author: Option<GitHubUser>,
}

/// Item of `GET /repos/{owner}/{repo}/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTag {
    pub name: String,
    pub commit: GitHubTagCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTagCommit {
    pub sha: String,
}
