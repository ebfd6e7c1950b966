//! GitHub Gist history fetcher.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::identifier::RepoIdentifier;
use crate::platform::{
    ApiClient, CommitFetcher, CommitRecord, DEFAULT_PAGE_SIZE, Platform, PlatformError, Result,
    collect_numbered_pages,
};

use super::convert::revision_record;
use super::types::GistRevision;

/// Fetches the revision history of gists. Gists have no releases or tags.
#[derive(Debug, Clone)]
pub struct GistFetcher {
    client: ApiClient,
    base_url: String,
    page_size: u32,
}

impl GistFetcher {
    /// Create a fetcher against the GitHub API at `base_url`.
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

    pub async fn list_revisions(&self, gist_id: &str) -> Result<Vec<GistRevision>> {
        let url = format!("{}/gists/{}/commits", self.base_url, gist_id);
        collect_numbered_pages(&self.client, &url, "per_page", self.page_size).await
    }
}

#[async_trait]
impl CommitFetcher for GistFetcher {
    fn platform(&self) -> Platform {
        Platform::Gist
    }

    async fn fetch_history(
        &self,
        item_name: &str,
        identifier: &RepoIdentifier,
    ) -> Result<Vec<CommitRecord>> {
        let RepoIdentifier::Gist { id } = identifier else {
            return Err(PlatformError::invalid_identifier(
                Platform::Gist.column(),
                identifier.to_string(),
                "not a gist",
            ));
        };

        info!(item = item_name, gist = %id, "Fetching gist revisions");
        let revisions = self.list_revisions(id).await?;
        debug!(item = item_name, revisions = revisions.len(), "Gist history fetched");

        Ok(revisions
            .iter()
            .map(|r| revision_record(item_name, r))
            .collect())
    }
}
