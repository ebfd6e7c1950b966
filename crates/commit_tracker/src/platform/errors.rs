use thiserror::Error;

/// Errors that can occur while resolving or fetching a repository.
///
/// Every variant is scoped to a single roster row.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Malformed roster cell.
    #[error("Invalid {field} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        field: String,
        value: String,
        reason: String,
    },

    /// Repository missing or inaccessible (HTTP 404).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Backoff attempts exhausted.
    #[error("Rate limit exceeded after {attempts} attempts: {url}")]
    RateLimitExceeded { url: String, attempts: usize },

    /// Any other non-2xx response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Response body did not match the expected shape.
    #[error("Unexpected response from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request URL could not be built.
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl PlatformError {
    /// Create an invalid identifier error.
    #[inline]
    pub fn invalid_identifier(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentifier {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Check if this error is a rate limit error.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }

    /// Short machine-friendly name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::NotFound { .. } => "not_found",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::Http { .. } => "http",
            Self::Network { .. } => "network",
            Self::Json { .. } => "json",
            Self::InvalidUrl { .. } => "invalid_url",
        }
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps multi-line API
/// error bodies out of progress output and the failure ledger.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
