//! Conversion from GitLab API types to commit records.

use crate::platform::CommitRecord;

use super::types::{GitLabCommit, GitLabRelease, GitLabTag};

pub fn commit_record(item_name: &str, commit: &GitLabCommit) -> CommitRecord {
    CommitRecord::commit(
        item_name,
        commit
            .created_at
            .as_deref()
            .or(commit.authored_date.as_deref()),
        commit.message.as_deref().or(commit.title.as_deref()),
        &commit.id,
        commit.author_name.as_deref(),
    )
}

pub fn release_record(item_name: &str, release: &GitLabRelease) -> CommitRecord {
    let title = release
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(release.tag_name.as_str());

    CommitRecord::release(
        item_name,
        release
            .released_at
            .as_deref()
            .or(release.created_at.as_deref()),
        title,
        release
            .commit
            .as_ref()
            .map(|c| c.id.as_str())
            .unwrap_or_default(),
        release.author.as_ref().map(|u| u.username.as_str()),
    )
}

/// Convert tags, including those a release points at.
///
/// Date, sha and author come from the tagged commit.
pub fn tag_records(item_name: &str, tags: &[GitLabTag]) -> Vec<CommitRecord> {
    tags.iter()
        .map(|tag| {
            let commit = tag.commit.as_ref();
            CommitRecord::tag(
                item_name,
                commit.and_then(|c| c.created_at.as_deref()),
                &tag.name,
                commit.map(|c| c.id.as_str()).unwrap_or_default(),
                commit.and_then(|c| c.author_name.as_deref()),
            )
        })
        .collect()
}
