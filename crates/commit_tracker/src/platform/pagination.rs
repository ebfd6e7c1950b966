//! Page walkers for the two pagination styles in use.
//!
//! GitHub and GitLab number their pages and signal the end with an empty
//! page. Bitbucket wraps each page in an envelope carrying the URL of the
//! next one.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::client::ApiClient;
use super::errors::Result;

/// Default page size for list requests (the maximum GitHub and GitLab allow).
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Fetch `url` page by page (`page=1, 2, …`) until a page comes back empty.
///
/// A listing with N non-empty pages takes exactly N+1 requests.
pub async fn collect_numbered_pages<T: DeserializeOwned>(
    client: &ApiClient,
    url: &str,
    size_param: &str,
    page_size: u32,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut page: u32 = 1;

    loop {
        let params = [
            (size_param, page_size.to_string()),
            ("page", page.to_string()),
        ];
        let batch: Vec<T> = client.get(url, &params).await?;
        if batch.is_empty() {
            break;
        }
        debug!(url, page, count = batch.len(), "Fetched page");
        items.extend(batch);
        page += 1;
    }

    Ok(items)
}

/// Envelope of a cursor-paginated response.
#[derive(Debug, Deserialize)]
pub struct CursorPage<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Fetch `url` and follow `next` links until they run out or a page is empty.
pub async fn collect_cursor_pages<T: DeserializeOwned>(
    client: &ApiClient,
    url: &str,
    size_param: &str,
    page_size: u32,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let first_params = [(size_param, page_size.to_string())];
    let mut page: CursorPage<T> = client.get(url, &first_params).await?;

    loop {
        if page.values.is_empty() {
            break;
        }
        debug!(url, count = page.values.len(), "Fetched page");
        items.extend(page.values);

        match page.next.filter(|next| !next.is_empty()) {
            Some(next) => page = client.get(&next, &[]).await?,
            None => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::http::MockTransport;
    use crate::platform::{Auth, Platform};

    fn client(transport: &MockTransport, platform: Platform) -> ApiClient {
        ApiClient::new(platform, Arc::new(transport.clone()), Auth::None)
    }

    #[tokio::test]
    async fn numbered_pages_stop_at_first_empty_page() {
        let transport = MockTransport::new();
        let base = "https://api.github.com/repos/acme/widget/commits";
        for page in 1..=3 {
            transport.push_json(
                format!("{base}?per_page=2&page={page}"),
                json!([page * 10, page * 10 + 1]),
            );
        }
        transport.push_json(format!("{base}?per_page=2&page=4"), json!([]));

        let items: Vec<u32> = collect_numbered_pages(&client(&transport, Platform::GitHub), base, "per_page", 2)
            .await
            .unwrap();

        assert_eq!(items, vec![10, 11, 20, 21, 30, 31]);
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn numbered_pages_with_nothing_takes_one_request() {
        let transport = MockTransport::new();
        let base = "https://gitlab.com/api/v4/projects/7/releases";
        transport.push_json(format!("{base}?per_page=100&page=1"), json!([]));

        let items: Vec<u32> =
            collect_numbered_pages(&client(&transport, Platform::GitLab), base, "per_page", 100)
                .await
                .unwrap();

        assert!(items.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn numbered_pages_propagate_errors() {
        let transport = MockTransport::new();
        let base = "https://api.github.com/repos/acme/gone/commits";
        transport.push_status(format!("{base}?per_page=100&page=1"), 404, Vec::new());

        let err = collect_numbered_pages::<u32>(
            &client(&transport, Platform::GitHub),
            base,
            "per_page",
            100,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, crate::platform::PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn cursor_pages_follow_next_links() {
        let transport = MockTransport::new();
        let base = "https://api.bitbucket.org/2.0/repositories/ws/slug/commits";
        let second = format!("{base}?pagelen=2&page=c2");
        transport.push_json(
            format!("{base}?pagelen=2"),
            json!({"values": [1, 2], "next": second}),
        );
        transport.push_json(second.clone(), json!({"values": [3]}));

        let items: Vec<u32> =
            collect_cursor_pages(&client(&transport, Platform::Bitbucket), base, "pagelen", 2)
                .await
                .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.requests()[1].url, second);
    }

    #[tokio::test]
    async fn cursor_pages_stop_on_an_empty_page() {
        let transport = MockTransport::new();
        let base = "https://api.bitbucket.org/2.0/repositories/ws/slug/refs/tags";
        let second = format!("{base}?pagelen=100&page=2");
        transport.push_json(
            format!("{base}?pagelen=100"),
            json!({"values": [], "next": second}),
        );

        let items: Vec<u32> =
            collect_cursor_pages(&client(&transport, Platform::Bitbucket), base, "pagelen", 100)
                .await
                .unwrap();

        assert!(items.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }
}
