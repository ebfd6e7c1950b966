use crate::platform::CommitRecord;

use super::types::{BitbucketAuthor, BitbucketCommit, BitbucketTag};

/// Best display name for an author: account name, then the name part of the
/// raw git signature.
pub fn author_name(author: Option<&BitbucketAuthor>) -> Option<String> {
    let author = author?;
    let account = author
        .user
        .as_ref()
        .and_then(|u| u.display_name.as_deref().or(u.nickname.as_deref()))
        .map(str::trim)
        .filter(|name| !name.is_empty());
    if let Some(name) = account {
        return Some(name.to_string());
    }

    let raw = author.raw.as_deref()?;
    let name = raw.split('<').next().unwrap_or(raw).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

pub fn commit_record(item_name: &str, commit: &BitbucketCommit) -> CommitRecord {
    CommitRecord::commit(
        item_name,
        commit.date.as_deref(),
        commit.message.as_deref(),
        &commit.hash,
        author_name(commit.author.as_ref()).as_deref(),
    )
}

pub fn tag_record(item_name: &str, tag: &BitbucketTag) -> CommitRecord {
    let target = tag.target.as_ref();
    CommitRecord::tag(
        item_name,
        target.and_then(|t| t.date.as_deref()),
        &tag.name,
        target.map(|t| t.hash.as_str()).unwrap_or_default(),
        author_name(target.and_then(|t| t.author.as_ref())).as_deref(),
    )
}
