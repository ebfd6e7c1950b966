//! Roster cell parsing.
//!
//! Cells hold free-form repository references: full URLs, host-prefixed
//! paths without a scheme, SSH remotes, or short `owner/repo` paths. Each is
//! reduced to a [`RepoIdentifier`] for the platform named by the column.

use url::Url;

use crate::platform::{Platform, PlatformError, Result};

/// A normalized repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RepoIdentifier {
    GitHub { owner: String, repo: String },
    Gist { id: String },
    /// Namespace path (`group/sub/project`) or numeric project id.
    GitLab { project: String },
    Bitbucket { workspace: String, slug: String },
}

impl RepoIdentifier {
    /// Parse `raw` as an identifier for `platform`.
    pub fn parse(platform: Platform, raw: &str) -> Result<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(invalid(platform, raw, "empty value"));
        }

        match platform {
            Platform::GitHub => {
                let segments = path_segments(platform, raw, value)?;
                let (owner, repo) = owner_and_name(platform, raw, &segments)?;
                Ok(Self::GitHub { owner, repo })
            }
            Platform::Bitbucket => {
                let segments = path_segments(platform, raw, value)?;
                let (workspace, slug) = owner_and_name(platform, raw, &segments)?;
                Ok(Self::Bitbucket { workspace, slug })
            }
            Platform::GitLab => parse_gitlab(raw, value),
            Platform::Gist => parse_gist(raw, value),
        }
    }

    /// The platform this identifier belongs to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::GitHub { .. } => Platform::GitHub,
            Self::Gist { .. } => Platform::Gist,
            Self::GitLab { .. } => Platform::GitLab,
            Self::Bitbucket { .. } => Platform::Bitbucket,
        }
    }
}

impl std::fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub { owner, repo } => write!(f, "{owner}/{repo}"),
            Self::Gist { id } => f.write_str(id),
            Self::GitLab { project } => f.write_str(project),
            Self::Bitbucket { workspace, slug } => write!(f, "{workspace}/{slug}"),
        }
    }
}

/// Parse a roster cell given its column name.
///
/// Unknown column names are rejected with `InvalidIdentifier`.
pub fn parse_identifier(field_name: &str, raw: &str) -> Result<RepoIdentifier> {
    let platform: Platform = field_name.parse().map_err(|_| {
        PlatformError::invalid_identifier(field_name, raw, "unknown platform field")
    })?;
    RepoIdentifier::parse(platform, raw)
}

const GITHUB_HOSTS: &[&str] = &["github.com"];
const GIST_HOSTS: &[&str] = &["gist.github.com", "gist.githubusercontent.com"];
const GITLAB_HOSTS: &[&str] = &["gitlab.com"];
const BITBUCKET_HOSTS: &[&str] = &["bitbucket.org"];

fn invalid(platform: Platform, raw: &str, reason: &str) -> PlatformError {
    PlatformError::invalid_identifier(platform.column(), raw, reason)
}

fn known_hosts(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::GitHub => GITHUB_HOSTS,
        Platform::Gist => GIST_HOSTS,
        Platform::GitLab => GITLAB_HOSTS,
        Platform::Bitbucket => BITBUCKET_HOSTS,
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// The platform `host` is known to belong to, if any.
fn platform_of_host(host: &str) -> Option<Platform> {
    Platform::PRIORITY
        .into_iter()
        .find(|p| known_hosts(*p).contains(&host))
}

/// Whether a reference on `host` can name a `platform` repository.
///
/// GitLab is also self-hosted, so it accepts any host not owned by another
/// platform.
fn host_allowed(platform: Platform, host: &str) -> bool {
    match platform_of_host(host) {
        Some(owner) => owner == platform,
        None => platform == Platform::GitLab,
    }
}

/// Path segments of a reference, with host, scheme, query and fragment removed.
///
/// URLs and SSH remotes always name a host, which must fit `platform`.
/// Scheme-less values only lose their first segment when it is a known host;
/// anything else is taken as a path.
fn path_segments(platform: Platform, raw: &str, value: &str) -> Result<Vec<String>> {
    let wrong_host =
        |host: &str| invalid(platform, raw, &format!("{host} is not a {platform} host"));

    if value.contains("://") {
        let url = Url::parse(value).map_err(|e| invalid(platform, raw, &e.to_string()))?;
        let host = normalize_host(url.host_str().unwrap_or_default());
        if !host_allowed(platform, &host) {
            return Err(wrong_host(&host));
        }
        return Ok(url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default());
    }

    // git@host:owner/repo.git
    let (value, ssh) = match value.strip_prefix("git@") {
        Some(rest) => (rest.replacen(':', "/", 1), true),
        None => (value.to_string(), false),
    };

    let path = value.split(['?', '#']).next().unwrap_or_default();
    let mut segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(first) = segments.first() {
        let host = normalize_host(first);
        let known = platform_of_host(&host).is_some();
        if (ssh || known) && !host_allowed(platform, &host) {
            return Err(wrong_host(&host));
        }
        if ssh || known {
            segments.remove(0);
        }
    }

    Ok(segments)
}

fn strip_git_suffix(name: &str) -> &str {
    name.strip_suffix(".git").unwrap_or(name)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// First two segments as `(owner, name)`; anything after them is ignored.
fn owner_and_name(platform: Platform, raw: &str, segments: &[String]) -> Result<(String, String)> {
    let [owner, name, ..] = segments else {
        return Err(invalid(
            platform,
            raw,
            "expected <owner>/<repository> or a repository URL",
        ));
    };

    let name = strip_git_suffix(name);
    if !is_valid_name(owner) || !is_valid_name(name) {
        return Err(invalid(platform, raw, "contains unsupported characters"));
    }

    Ok((owner.clone(), name.to_string()))
}

fn parse_gitlab(raw: &str, value: &str) -> Result<RepoIdentifier> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(RepoIdentifier::GitLab {
            project: value.to_string(),
        });
    }

    let mut segments: Vec<String> = path_segments(Platform::GitLab, raw, value)?
        .into_iter()
        .take_while(|s| s != "-")
        .collect();
    if let Some(last) = segments.last_mut() {
        *last = strip_git_suffix(last).to_string();
    }

    if segments.len() < 2 {
        return Err(invalid(
            Platform::GitLab,
            raw,
            "expected <namespace>/<project>, a project URL, or a numeric project id",
        ));
    }
    if !segments.iter().all(|s| is_valid_name(s)) {
        return Err(invalid(Platform::GitLab, raw, "contains unsupported characters"));
    }

    Ok(RepoIdentifier::GitLab {
        project: segments.join("/"),
    })
}

fn parse_gist(raw: &str, value: &str) -> Result<RepoIdentifier> {
    let segments = path_segments(Platform::Gist, raw, value)?;
    let id = segments
        .last()
        .map(|s| strip_git_suffix(s))
        .unwrap_or_default();

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(
            Platform::Gist,
            raw,
            "expected a gist id or gist URL",
        ));
    }

    Ok(RepoIdentifier::Gist { id: id.to_string() })
}
