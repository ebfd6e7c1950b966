//! GitLab REST API (v4) response shapes.

use serde::Deserialize;

/// Item of `GET /projects/{id}/repository/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCommit {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub authored_date: Option<String>,
}

/// Item of `GET /projects/{id}/releases`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub commit: Option<GitLabCommitRef>,
    #[serde(default)]
    pub author: Option<GitLabUser>,
}

/// Item of `GET /projects/{id}/repository/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabTag {
    pub name: String,
    #[serde(default)]
    pub commit: Option<GitLabCommitRef>,
}

/// Commit summary embedded in releases and tags.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCommitRef {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub username: String,
}
