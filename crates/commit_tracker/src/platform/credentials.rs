//! Credentials and API base URLs, resolved once at startup.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::types::Platform;

/// GitHub personal access token (also used for Gists).
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
/// GitLab personal access token.
pub const GITLAB_TOKEN_VAR: &str = "GITLAB_TOKEN";
/// Bitbucket account name for app-password authentication.
pub const BITBUCKET_USERNAME_VAR: &str = "BITBUCKET_USERNAME";
/// Bitbucket app password.
pub const BITBUCKET_APP_PASSWORD_VAR: &str = "BITBUCKET_APP_PASSWORD";

/// Authentication scheme attached to every request of a client.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Auth {
    /// Unauthenticated (public data only, lower rate limits).
    #[default]
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `Authorization: Basic base64(user:password)`.
    Basic { username: String, password: String },
}

impl Auth {
    /// The `Authorization` header for this scheme, if any.
    #[must_use]
    pub fn header(&self) -> Option<(String, String)> {
        match self {
            Auth::None => None,
            Auth::Bearer(token) => Some(("Authorization".to_string(), format!("Bearer {token}"))),
            Auth::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                Some(("Authorization".to_string(), format!("Basic {encoded}")))
            }
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Auth::None)
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::None => f.write_str("None"),
            Auth::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Credentials for every supported platform.
///
/// Built once and passed into each fetcher; nothing reads the environment
/// after startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
    pub bitbucket_username: Option<String>,
    pub bitbucket_app_password: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            github_token: get(GITHUB_TOKEN_VAR),
            gitlab_token: get(GITLAB_TOKEN_VAR),
            bitbucket_username: get(BITBUCKET_USERNAME_VAR),
            bitbucket_app_password: get(BITBUCKET_APP_PASSWORD_VAR),
        }
    }

    /// Authentication for requests to `platform`.
    #[must_use]
    pub fn auth_for(&self, platform: Platform) -> Auth {
        match platform {
            Platform::GitHub | Platform::Gist => self
                .github_token
                .clone()
                .map(Auth::Bearer)
                .unwrap_or_default(),
            Platform::GitLab => self
                .gitlab_token
                .clone()
                .map(Auth::Bearer)
                .unwrap_or_default(),
            Platform::Bitbucket => match (&self.bitbucket_username, &self.bitbucket_app_password) {
                (Some(username), Some(password)) => Auth::Basic {
                    username: username.clone(),
                    password: password.clone(),
                },
                _ => Auth::None,
            },
        }
    }

    /// Platforms that will be queried without authentication.
    #[must_use]
    pub fn missing(&self) -> Vec<Platform> {
        [Platform::GitHub, Platform::GitLab, Platform::Bitbucket]
            .into_iter()
            .filter(|p| self.auth_for(*p).is_none())
            .collect()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("github_token", &redact(&self.github_token))
            .field("gitlab_token", &redact(&self.gitlab_token))
            .field("bitbucket_username", &self.bitbucket_username)
            .field(
                "bitbucket_app_password",
                &redact(&self.bitbucket_app_password),
            )
            .finish()
    }
}

/// Default GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";
/// Default GitLab REST API base URL.
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/v4";
/// Default Bitbucket Cloud REST API base URL.
pub const BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// REST API base URLs. Gists are served from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub github: String,
    pub gitlab: String,
    pub bitbucket: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            github: GITHUB_API_URL.to_string(),
            gitlab: GITLAB_API_URL.to_string(),
            bitbucket: BITBUCKET_API_URL.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Use a single base URL for every platform (useful against a mock server).
    #[must_use]
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            github: base.clone(),
            gitlab: base.clone(),
            bitbucket: base,
        }
    }

    /// Base URL for `platform`, without a trailing slash.
    #[must_use]
    pub fn base_for(&self, platform: Platform) -> &str {
        let base = match platform {
            Platform::GitHub | Platform::Gist => &self.github,
            Platform::GitLab => &self.gitlab,
            Platform::Bitbucket => &self.bitbucket,
        };
        base.trim_end_matches('/')
    }
}
