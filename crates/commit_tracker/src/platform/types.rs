use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identifier::RepoIdentifier;

use super::convert::{RELEASE_PREFIX, TAG_PREFIX, author_or_unknown, first_line, normalize_date};
use super::errors::Result;

/// Supported hosting platforms.
///
/// Each variant corresponds to one roster column. When a roster row fills
/// more than one column, [`Platform::PRIORITY`] decides which one is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub repositories (`owner/repo`).
    GitHub,
    /// GitHub Gists (opaque gist id).
    Gist,
    /// GitLab projects (namespace path or numeric id).
    GitLab,
    /// Bitbucket Cloud repositories (`workspace/slug`).
    Bitbucket,
}

impl Platform {
    /// Resolution order for roster rows.
    pub const PRIORITY: [Platform; 4] = [
        Platform::GitHub,
        Platform::Gist,
        Platform::GitLab,
        Platform::Bitbucket,
    ];

    /// Roster column holding this platform's identifier.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Platform::GitHub => "github",
            Platform::Gist => "gist",
            Platform::GitLab => "gitlab",
            Platform::Bitbucket => "bitbucket",
        }
    }

    /// Whether the platform has a release/tag concept.
    #[must_use]
    pub fn has_refs(self) -> bool {
        !matches!(self, Platform::Gist)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(Platform::GitHub),
            "gist" => Ok(Platform::Gist),
            "gitlab" => Ok(Platform::GitLab),
            "bitbucket" => Ok(Platform::Bitbucket),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// One row of output: a commit, a release or a tag.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub item_name: String,
    /// ISO-8601 UTC timestamp, the raw API value if unparseable, or empty.
    pub date: String,
    pub message: String,
    pub sha: String,
    pub author: String,
}

impl CommitRecord {
    /// Build a commit record, keeping only the first line of the message.
    pub fn commit(
        item_name: &str,
        date: Option<&str>,
        message: Option<&str>,
        sha: &str,
        author: Option<&str>,
    ) -> Self {
        Self {
            item_name: item_name.to_string(),
            date: normalize_date(date),
            message: first_line(message.unwrap_or_default()),
            sha: sha.to_string(),
            author: author_or_unknown(author),
        }
    }

    /// Build a `RELEASE: <title>` record.
    pub fn release(
        item_name: &str,
        date: Option<&str>,
        title: &str,
        sha: &str,
        author: Option<&str>,
    ) -> Self {
        Self {
            item_name: item_name.to_string(),
            date: normalize_date(date),
            message: format!("{RELEASE_PREFIX}{}", first_line(title)),
            sha: sha.to_string(),
            author: author_or_unknown(author),
        }
    }

    /// Build a `TAG: <name>` record.
    pub fn tag(
        item_name: &str,
        date: Option<&str>,
        name: &str,
        sha: &str,
        author: Option<&str>,
    ) -> Self {
        Self {
            item_name: item_name.to_string(),
            date: normalize_date(date),
            message: format!("{TAG_PREFIX}{}", first_line(name)),
            sha: sha.to_string(),
            author: author_or_unknown(author),
        }
    }

    /// Whether this record came from a commit (not a release or tag).
    #[must_use]
    pub fn is_commit(&self) -> bool {
        !self.message.starts_with(RELEASE_PREFIX) && !self.message.starts_with(TAG_PREFIX)
    }
}

/// Trait for platform history fetchers.
///
/// Implementors should:
/// - Handle pagination internally
/// - Return commits first, then releases, then tags
/// - Map a missing repository to `PlatformError::NotFound`
/// - Reject identifiers for another platform with `PlatformError::InvalidIdentifier`
#[async_trait]
pub trait CommitFetcher: Send + Sync {
    /// The platform this fetcher talks to.
    fn platform(&self) -> Platform;

    /// Fetch the full history for one repository.
    async fn fetch_history(
        &self,
        item_name: &str,
        identifier: &RepoIdentifier,
    ) -> Result<Vec<CommitRecord>>;
}
