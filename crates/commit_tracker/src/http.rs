//! The GET-only transport every API client goes through.
//!
//! Fetchers build an [`HttpRequest`] and hand it to an [`HttpTransport`].
//! Production runs use [`ReqwestTransport`]; unit tests swap in the
//! URL-keyed `MockTransport`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Header name/value pairs, matched case-insensitively by [`header_get`].
pub type HttpHeaders = Vec<(String, String)>;

/// A GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HttpHeaders,
}

/// Status, headers and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text for error messages; invalid UTF-8 is replaced.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, TLS, timeout or body read failure.
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for GET {url}")]
    NoMockResponse { url: String },
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// First value of header `name`, ignoring case.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v.as_str()))
}

/// [`HttpTransport`] over a shared `reqwest::Client`.
///
/// The client follows redirects, so renamed repositories resolve to their
/// new location.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// A client with a per-request timeout and a fixed `User-Agent`.
    pub fn with_timeout(timeout: Duration, user_agent: &str) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = request
            .headers
            .iter()
            .fold(self.client.get(&request.url), |builder, (name, value)| {
                builder.header(name, value)
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        // Non-ASCII header values are dropped; none of the ones read here carry any.
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub use mock::MockTransport;


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::platform::{ApiClient, Auth, Platform};

    const USER_AGENT: &str = "commit-tracker/test";

    fn transport() -> ReqwestTransport {
        ReqwestTransport::with_timeout(Duration::from_secs(5), USER_AGENT).unwrap()
    }

    #[test]
    fn header_lookup_ignores_case_and_takes_the_first() {
        let headers: HttpHeaders = vec![
            ("Retry-After".to_string(), "30".to_string()),
            ("retry-after".to_string(), "60".to_string()),
        ];
        assert_eq!(header_get(&headers, "RETRY-AFTER"), Some("30"));
        assert_eq!(header_get(&headers, "missing"), None);

        let response = HttpResponse {
            status: 404,
            headers,
            body: b"Not Found".to_vec(),
        };
        assert_eq!(response.header("retry-after"), Some("30"));
        assert!(!response.is_success());
        assert_eq!(response.body_text(), "Not Found");
    }

    #[tokio::test]
    async fn mock_serves_queued_responses_then_errors() {
        let mock = MockTransport::new();
        let url = "https://example.com/api?page=1";
        mock.push_status(url, 429, Vec::new());
        mock.push_json(url, serde_json::json!([1, 2]));

        let request = HttpRequest {
            url: url.to_string(),
            headers: Vec::new(),
        };
        assert_eq!(mock.send(request.clone()).await.unwrap().status, 429);
        assert_eq!(mock.send(request.clone()).await.unwrap().body, b"[1,2]");
        let err = mock.send(request).await.unwrap_err();
        assert!(matches!(err, HttpError::NoMockResponse { url: u } if u == url));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn reqwest_transport_sends_user_agent_and_request_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widget/commits"))
            .and(query_param("page", "1"))
            .and(header("user-agent", USER_AGENT))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-remaining", "42")
                    .set_body_string("[]"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = transport()
            .send(HttpRequest {
                url: format!("{}/repos/acme/widget/commits?page=1", server.uri()),
                headers: vec![("Authorization".to_string(), "Bearer t0ken".to_string())],
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.header("X-RateLimit-Remaining"), Some("42"));
        assert_eq!(response.body, b"[]");
    }

    #[tokio::test]
    async fn api_client_headers_reach_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repositories/team/tool/commits"))
            .and(header("user-agent", USER_AGENT))
            .and(header("authorization", "Basic dXNlcjpzZWNyZXQ="))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"values": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(
            Platform::Bitbucket,
            Arc::new(transport()),
            Auth::Basic {
                username: "user".to_string(),
                password: "secret".to_string(),
            },
        );
        let body: serde_json::Value = client
            .get(&format!("{}/repositories/team/tool/commits", server.uri()), &[])
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"values": []}));
    }

    #[tokio::test]
    async fn connection_failures_are_transport_errors() {
        let err = transport()
            .send(HttpRequest {
                url: "not a url".to_string(),
                headers: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
