//! GitHub history fetcher.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::identifier::RepoIdentifier;
use crate::platform::{
    ApiClient, CommitFetcher, CommitRecord, DEFAULT_PAGE_SIZE, Platform, PlatformError, Result,
    collect_numbered_pages,
};

use super::convert::{commit_record, release_record, tag_records};
use super::types::{GitHubCommit, GitHubRelease, GitHubTag};

/// Fetches commits, releases and tags of GitHub repositories.
#[derive(Debug, Clone)]
pub struct GitHubFetcher {
    client: ApiClient,
    base_url: String,
    page_size: u32,
}

impl GitHubFetcher {
    /// Create a fetcher against `base_url` (e.g. `https://api.github.com`).
    pub fn new(client: ApiClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn repo_url(&self, owner: &str, repo: &str, endpoint: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, owner, repo, endpoint)
    }

    pub async fn list_commits(&self, owner: &str, repo: &str) -> Result<Vec<GitHubCommit>> {
        let url = self.repo_url(owner, repo, "commits");
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }

    pub async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<GitHubRelease>> {
        let url = self.repo_url(owner, repo, "releases");
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }

    pub async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<GitHubTag>> {
        let url = self.repo_url(owner, repo, "tags");
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }
}

#[async_trait]
impl CommitFetcher for GitHubFetcher {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    async fn fetch_history(
        &self,
        item_name: &str,
        identifier: &RepoIdentifier,
    ) -> Result<Vec<CommitRecord>> {
        let RepoIdentifier::GitHub { owner, repo } = identifier else {
            return Err(PlatformError::invalid_identifier(
                Platform::GitHub.column(),
                identifier.to_string(),
                "not a GitHub repository",
            ));
        };

        info!(item = item_name, repository = %identifier, "Fetching GitHub commits");
        // GitHub answers 409 Conflict for a repository without commits.
        let commits = match self.list_commits(owner, repo).await {
            Err(PlatformError::Http { status: 409, .. }) => {
                info!(item = item_name, repository = %identifier, "Repository is empty");
                Vec::new()
            }
            result => result?,
        };
        let releases = self.list_releases(owner, repo).await?;
        let tags = self.list_tags(owner, repo).await?;
        debug!(
            item = item_name,
            commits = commits.len(),
            releases = releases.len(),
            tags = tags.len(),
            "GitHub history fetched"
        );

        let mut records: Vec<CommitRecord> = commits
            .iter()
            .map(|c| commit_record(item_name, c))
            .collect();
        records.extend(releases.iter().map(|r| release_record(item_name, r)));
        records.extend(tag_records(item_name, &tags));
        Ok(records)
    }
}
