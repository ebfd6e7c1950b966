//! GitLab history fetcher.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::identifier::RepoIdentifier;
use crate::platform::{
    ApiClient, CommitFetcher, CommitRecord, DEFAULT_PAGE_SIZE, Platform, PlatformError, Result,
    collect_numbered_pages,
};

use super::convert::{commit_record, release_record, tag_records};
use super::types::{GitLabCommit, GitLabRelease, GitLabTag};

/// Fetches commits, releases and tags of GitLab projects.
#[derive(Debug, Clone)]
pub struct GitLabFetcher {
    client: ApiClient,
    base_url: String,
    page_size: u32,
}

/// Project id as it appears in API paths: numeric ids as-is, namespace
/// paths URL-encoded (`group/sub/proj` → `group%2Fsub%2Fproj`).
pub fn encode_project(project: &str) -> String {
    url::form_urlencoded::byte_serialize(project.as_bytes()).collect()
}

impl GitLabFetcher {
    /// Create a fetcher against `base_url` (e.g. `https://gitlab.com/api/v4`).
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

    fn project_url(&self, project: &str, endpoint: &str) -> String {
        format!(
            "{}/projects/{}/{}",
            self.base_url,
            encode_project(project),
            endpoint
        )
    }

    pub async fn list_commits(&self, project: &str) -> Result<Vec<GitLabCommit>> {
        let url = self.project_url(project, "repository/commits");
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }

    pub async fn list_releases(&self, project: &str) -> Result<Vec<GitLabRelease>> {
        let url = self.project_url(project, "releases");
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }

    pub async fn list_tags(&self, project: &str) -> Result<Vec<GitLabTag>> {
        let url = self.project_url(project, "repository/tags");
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }
}

#[async_trait]
impl CommitFetcher for GitLabFetcher {
    fn platform(&self) -> Platform {
        Platform::GitLab
    }

    async fn fetch_history(
        &self,
        item_name: &str,
        identifier: &RepoIdentifier,
    ) -> Result<Vec<CommitRecord>> {
        let RepoIdentifier::GitLab { project } = identifier else {
            return Err(PlatformError::invalid_identifier(
                Platform::GitLab.column(),
                identifier.to_string(),
                "not a GitLab project",
            ));
        };

        info!(item = item_name, project = %project, "Fetching GitLab commits");
        let commits = self.list_commits(project).await?;
        let releases = self.list_releases(project).await?;
        let tags = self.list_tags(project).await?;
        debug!(
            item = item_name,
            commits = commits.len(),
            releases = releases.len(),
            tags = tags.len(),
            "GitLab history fetched"
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
