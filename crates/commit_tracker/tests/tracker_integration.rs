//! End-to-end runs against a local mock API server.
//!
//! Every platform endpoint is pointed at one wiremock server and the real
//! reqwest transport is used, so these tests cover URL building, headers,
//! pagination, backoff and the files written to disk.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use commit_tracker::http::{HttpTransport, ReqwestTransport};
use commit_tracker::platform::{ApiEndpoints, Credentials};
use commit_tracker::retry::RetryConfig;
use commit_tracker::roster::read_roster_from;
use commit_tracker::sync::{FetcherSettings, Fetchers, RunOptions, SamplingMode, process_roster};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetchers(server: &MockServer, credentials: &Credentials) -> Fetchers {
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(reqwest::Client::new()));
    let settings = FetcherSettings {
        endpoints: ApiEndpoints::all(&server.uri()),
        retry: RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 2),
        pace_requests: false,
        ..FetcherSettings::default()
    };
    Fetchers::standard(transport, credentials, &settings)
}

fn options(dir: &Path) -> RunOptions {
    RunOptions {
        output_dir: dir.to_path_buf(),
        mode: SamplingMode::Full,
        ..RunOptions::default()
    }
}

/// Any list endpoint without a more specific mock is empty.
async fn mount_empty_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(10)
        .mount(server)
        .await;
}

fn github_commits() -> serde_json::Value {
    json!([
        {
            "sha": "c2",
            "commit": {
                "message": "Second change\n\nWith a body.",
                "author": { "name": "Ada", "date": "2024-02-02T10:00:00Z" }
            },
            "author": { "login": "ada" }
        },
        {
            "sha": "c1",
            "commit": {
                "message": "Initial commit",
                "author": { "name": "Grace", "date": "2024-01-01T09:00:00+01:00" }
            },
            "author": null
        }
    ])
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn github_row_is_written_with_commits_and_releases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/commits"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(header("authorization", "Bearer gh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_commits()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "tag_name": "v1.0",
            "name": "First release",
            "target_commitish": "c2",
            "published_at": "2024-02-03T00:00:00Z",
            "author": { "login": "ada" }
        }])))
        .mount(&server)
        .await;
    mount_empty_lists(&server).await;

    let credentials = Credentials {
        github_token: Some("gh-token".to_string()),
        ..Credentials::default()
    };
    let roster = read_roster_from("item_name,github\nrepo1,https://github.com/acme/widget\n".as_bytes())
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let summary = process_roster(
        &roster,
        &fetchers(&server, &credentials),
        &options(dir.path()),
        None,
        None,
    )
    .await;

    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.records, 3);

    let lines = read_lines(&dir.path().join("repo1.csv"));
    assert_eq!(
        lines,
        vec![
            "item_name,date,message,sha,author",
            "repo1,2024-02-02T10:00:00Z,Second change,c2,Ada",
            "repo1,2024-01-01T08:00:00Z,Initial commit,c1,Grace",
            "repo1,2024-02-03T00:00:00Z,RELEASE: First release,c2,ada",
        ]
    );
    assert!(!dir.path().join("errors").join("errors.csv").exists());
}

#[tokio::test]
async fn missing_repository_is_logged_and_the_run_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/gone/commits"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_commits()))
        .mount(&server)
        .await;
    mount_empty_lists(&server).await;

    let roster = read_roster_from(
        "item_name,github,gitlab\n\
         gone,acme/gone,\n\
         ,,\n\
         widget,acme/widget,\n"
            .as_bytes(),
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let summary = process_roster(
        &roster,
        &fetchers(&server, &Credentials::default()),
        &options(dir.path()),
        None,
        None,
    )
    .await;

    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(dir.path().join("widget.csv").exists());
    assert!(!dir.path().join("gone.csv").exists());

    let ledger = read_lines(&dir.path().join("errors").join("errors.csv"));
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0], "item_name,platform,repository,error");
    assert!(ledger[1].starts_with("gone,github,acme/gone,Not found"));
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_commits()))
        .mount(&server)
        .await;
    mount_empty_lists(&server).await;

    let roster = read_roster_from("item_name,github\nw,acme/widget\n".as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let summary = process_roster(
        &roster,
        &fetchers(&server, &Credentials::default()),
        &options(dir.path()),
        None,
        None,
    )
    .await;

    assert_eq!(summary.written, 1);
    assert_eq!(summary.records, 2);
}

#[tokio::test]
async fn exhausted_rate_limit_fails_only_that_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/busy/commits"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;
    mount_empty_lists(&server).await;

    let roster = read_roster_from("item_name,github\nbusy,acme/busy\n".as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let summary = process_roster(
        &roster,
        &fetchers(&server, &Credentials::default()),
        &options(dir.path()),
        None,
        None,
    )
    .await;

    assert_eq!(summary.failed, 1);
    assert!(summary.failures[0].error.contains("Rate limit exceeded after 3 attempts"));
}

#[tokio::test]
async fn bitbucket_row_follows_cursor_pages_and_adds_tags() {
    let server = MockServer::start().await;
    let second_page = format!("{}/repositories/team/tool/commits?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/repositories/team/tool/commits"))
        .and(query_param("pagelen", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{
                "hash": "bb2",
                "date": "2024-05-01T12:00:00+00:00",
                "message": "Tidy up\n",
                "author": { "raw": "Lin <lin@example.com>", "user": { "display_name": "Lin Q" } }
            }],
            "next": second_page
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/team/tool/commits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{
                "hash": "bb1",
                "date": "2024-04-01T12:00:00+00:00",
                "message": "Start",
                "author": { "raw": "Lin <lin@example.com>" }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/team/tool/refs/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{
                "name": "v0.1",
                "target": { "hash": "bb1", "date": "2024-04-01T12:00:00+00:00" }
            }]
        })))
        .mount(&server)
        .await;

    let roster = read_roster_from(
        "item_name,bitbucket\ntool,https://bitbucket.org/team/tool/src/main/\n".as_bytes(),
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let summary = process_roster(
        &roster,
        &fetchers(&server, &Credentials::default()),
        &options(dir.path()),
        None,
        None,
    )
    .await;

    assert_eq!(summary.written, 1, "{:?}", summary.failures);
    let lines = read_lines(&dir.path().join("tool.csv"));
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "tool,2024-05-01T12:00:00Z,Tidy up,bb2,Lin Q");
    assert_eq!(lines[2], "tool,2024-04-01T12:00:00Z,Start,bb1,Lin");
    assert!(lines[3].contains("TAG: v0.1"));
    assert!(lines[3].contains("bb1"));
}

#[tokio::test]
async fn gist_row_lists_revisions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/aa5a315d/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "version": "57a7f021",
            "committed_at": "2024-03-01T00:00:00Z",
            "user": { "login": "octocat" },
            "change_status": { "additions": 3, "deletions": 1 }
        }])))
        .mount(&server)
        .await;
    mount_empty_lists(&server).await;

    let roster = read_roster_from(
        "item_name,gist\nsnippet,https://gist.github.com/octocat/aa5a315d\n".as_bytes(),
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let summary = process_roster(
        &roster,
        &fetchers(&server, &Credentials::default()),
        &options(dir.path()),
        None,
        None,
    )
    .await;

    assert_eq!(summary.written, 1, "{:?}", summary.failures);
    let lines = read_lines(&dir.path().join("snippet.csv"));
    assert_eq!(
        lines[1],
        "snippet,2024-03-01T00:00:00Z,Gist revision (+3 -1),57a7f021,octocat"
    );
}
