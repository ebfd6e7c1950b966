//! Conversion from GitHub API types to commit records.

use crate::platform::CommitRecord;

use super::types::{GitHubCommit, GitHubRelease, GitHubTag};

/// Convert a commit. The git author name wins over the account login.
pub fn commit_record(item_name: &str, commit: &GitHubCommit) -> CommitRecord {
    let git_author = commit.commit.author.as_ref();
    let author = git_author
        .and_then(|a| a.name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .or_else(|| commit.author.as_ref().map(|u| u.login.as_str()));

    CommitRecord::commit(
        item_name,
        git_author.and_then(|a| a.date.as_deref()),
        commit.commit.message.as_deref(),
        &commit.sha,
        author,
    )
}

/// Convert a release to a `RELEASE: <title or tag>` record.
pub fn release_record(item_name: &str, release: &GitHubRelease) -> CommitRecord {
    let title = release
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(release.tag_name.as_str());

    CommitRecord::release(
        item_name,
        release
            .published_at
            .as_deref()
            .or(release.created_at.as_deref()),
        title,
        release.target_commitish.as_deref().unwrap_or_default(),
        release.author.as_ref().map(|u| u.login.as_str()),
    )
}

/// Convert tags. A tag behind a release still gets its own `TAG:` row.
///
/// The tags endpoint carries no date or author, so those fields stay empty
/// and `Unknown`.
pub fn tag_records(item_name: &str, tags: &[GitHubTag]) -> Vec<CommitRecord> {
    tags.iter()
        .map(|tag| CommitRecord::tag(item_name, None, &tag.name, &tag.commit.sha, None))
        .collect()
}
