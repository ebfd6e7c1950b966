use serde::Deserialize;

/// Item of `GET /gists/{gist_id}/commits`: one revision of the gist.
#[derive(Debug, Clone, Deserialize)]
pub struct GistRevision {
    /// Revision sha.
    pub version: String,
    #[serde(default)]
    pub committed_at: Option<String>,
    #[serde(default)]
    pub user: Option<GistUser>,
    #[serde(default)]
    pub change_status: GistChangeStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GistUser {
    pub login: String,
}

/// Line counts changed by a revision.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GistChangeStatus {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}
