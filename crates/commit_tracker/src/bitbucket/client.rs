//! Bitbucket Cloud history fetcher.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::identifier::RepoIdentifier;
use crate::platform::{
    ApiClient, CommitFetcher, CommitRecord, Platform, PlatformError, Result, collect_cursor_pages,
};

use super::convert::{commit_record, tag_record};
use super::types::{BitbucketCommit, BitbucketTag};

/// Largest `pagelen` Bitbucket accepts on the commits endpoint.
pub const BITBUCKET_PAGE_SIZE: u32 = 100;

/// Fetches commits and tags of Bitbucket repositories.
#[derive(Debug, Clone)]
pub struct BitbucketFetcher {
    client: ApiClient,
    base_url: String,
    page_size: u32,
}

impl BitbucketFetcher {
    /// Create a fetcher against `base_url` (e.g. `https://api.bitbucket.org/2.0`).
    pub fn new(client: ApiClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: BITBUCKET_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn repo_url(&self, workspace: &str, slug: &str, endpoint: &str) -> String {
        format!(
            "{}/repositories/{}/{}/{}",
            self.base_url, workspace, slug, endpoint
        )
    }

    pub async fn list_commits(&self, workspace: &str, slug: &str) -> Result<Vec<BitbucketCommit>> {
        let url = self.repo_url(workspace, slug, "commits");
        collect_cursor_pages(&self.client, &url, "pagelen", self.page_size).await
    }

    pub async fn list_tags(&self, workspace: &str, slug: &str) -> Result<Vec<BitbucketTag>> {
        let url = self.repo_url(workspace, slug, "refs/tags");
        collect_cursor_pages(&self.client, &url, "pagelen", self.page_size).await
    }
}

#[async_trait]
impl CommitFetcher for BitbucketFetcher {
    fn platform(&self) -> Platform {
        Platform::Bitbucket
    }

    async fn fetch_history(
        &self,
        item_name: &str,
        identifier: &RepoIdentifier,
    ) -> Result<Vec<CommitRecord>> {
        let RepoIdentifier::Bitbucket { workspace, slug } = identifier else {
            return Err(PlatformError::invalid_identifier(
                Platform::Bitbucket.column(),
                identifier.to_string(),
                "not a Bitbucket repository",
            ));
        };

        info!(item = item_name, repository = %identifier, "Fetching Bitbucket commits");
        let commits = self.list_commits(workspace, slug).await?;
        let tags = self.list_tags(workspace, slug).await?;
        debug!(
            item = item_name,
            commits = commits.len(),
            tags = tags.len(),
            "Bitbucket history fetched"
        );

        let mut records: Vec<CommitRecord> = commits
            .iter()
            .map(|c| commit_record(item_name, c))
            .collect();
        records.extend(tags.iter().map(|t| tag_record(item_name, t)));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::http::{MockTransport, header_get};
    use crate::platform::Auth;

    const BASE: &str = "https://api.bitbucket.org/2.0";

    #[tokio::test]
    async fn fetch_history_follows_cursors_and_appends_tags() {
        let transport = MockTransport::new();
        let commits = format!("{BASE}/repositories/team/tool/commits");
        let next = format!("{commits}?pagelen=100&page=2");
        transport.push_json(
            format!("{commits}?pagelen=100"),
            json!({"values": [{"hash": "h2", "message": "Two"}], "next": next}),
        );
        transport.push_json(
            next.clone(),
            json!({"values": [{"hash": "h1", "message": "One"}]}),
        );
        transport.push_json(
            format!("{BASE}/repositories/team/tool/refs/tags?pagelen=100"),
            json!({"values": [{"name": "v1", "target": {"hash": "h1"}}]}),
        );

        let client = ApiClient::new(
            Platform::Bitbucket,
            Arc::new(transport.clone()),
            Auth::Basic {
                username: "user".to_string(),
                password: "pass".to_string(),
            },
        );
        let id = RepoIdentifier::parse(Platform::Bitbucket, "team/tool").unwrap();
        let records = BitbucketFetcher::new(client, BASE)
            .fetch_history("tool", &id)
            .await
            .unwrap();

        let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["Two", "One", "TAG: v1"]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].url, next);
        assert_eq!(
            header_get(&requests[0].headers, "authorization"),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[tokio::test]
    async fn missing_repository_is_not_found() {
        let transport = MockTransport::new();
        transport.push_status(
            format!("{BASE}/repositories/team/gone/commits?pagelen=100"),
            404,
            Vec::new(),
        );
        let client = ApiClient::new(Platform::Bitbucket, Arc::new(transport.clone()), Auth::None);
        let id = RepoIdentifier::parse(Platform::Bitbucket, "team/gone").unwrap();

        let err = BitbucketFetcher::new(client, BASE)
            .fetch_history("gone", &id)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }
}
