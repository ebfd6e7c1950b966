use crate::platform::CommitRecord;

use super::types::GistRevision;

/// Gist revisions have no message; one is synthesized from the line counts.
pub fn revision_message(revision: &GistRevision) -> String {
    format!(
        "Gist revision (+{} -{})",
        revision.change_status.additions, revision.change_status.deletions
    )
}

pub fn revision_record(item_name: &str, revision: &GistRevision) -> CommitRecord {
    CommitRecord::commit(
        item_name,
        revision.committed_at.as_deref(),
        Some(revision_message(revision).as_str()),
        &revision.version,
        revision.user.as_ref().map(|u| u.login.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn revision_becomes_a_commit_record() {
        let revision: GistRevision = serde_json::from_value(json!({
            "version": "57a7f021a713b1c5a6a199b54cc514735d2d462f",
            "committed_at": "2010-04-14T02:15:15Z",
            "user": {"login": "octocat"},
            "change_status": {"deletions": 0, "additions": 180, "total": 180}
        }))
        .unwrap();

        let record = revision_record("snippet", &revision);
        assert_eq!(record.message, "Gist revision (+180 -0)");
        assert_eq!(record.sha, "57a7f021a713b1c5a6a199b54cc514735d2d462f");
        assert_eq!(record.author, "octocat");
        assert_eq!(record.date, "2010-04-14T02:15:15Z");
    }

    #[test]
    fn anonymous_revision_without_counts() {
        let revision: GistRevision =
            serde_json::from_value(json!({"version": "abc", "user": null})).unwrap();
        let record = revision_record("snippet", &revision);
        assert_eq!(record.author, "Unknown");
        assert_eq!(record.message, "Gist revision (+0 -0)");
        assert_eq!(record.date, "");
    }
}
