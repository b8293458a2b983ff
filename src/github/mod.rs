//! Pull request lookups against the GitHub REST API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LookupStrategy;
use crate::error::{ChangelogError, Result};

const USER_AGENT: &str = "provider-changelog";

/// HTTP timeout for each GitHub request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A merged pull request as sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Resolves a PR number from a commit subject to its metadata.
pub trait PullRequestSource {
    /// `Ok(None)` when the PR does not exist or does not qualify for the
    /// changelog (unmerged, missing label).
    fn lookup(&self, number: u64) -> Result<Option<PullRequestRecord>>;
}

// GitHub API types
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<IssueItem>,
}

#[derive(Deserialize)]
struct IssueItem {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    merged_at: Option<String>,
}

#[derive(Deserialize)]
struct Label {
    name: String,
}

impl From<IssueItem> for PullRequestRecord {
    fn from(item: IssueItem) -> Self {
        Self {
            number: item.number,
            title: item.title,
            url: item.html_url,
            body: item.body.unwrap_or_default(),
            labels: item.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    repo: String,
    token: String,
    label: String,
    strategy: LookupStrategy,
}

impl GitHubClient {
    pub fn new(
        api_url: &str,
        repo: &str,
        token: &str,
        label: &str,
        strategy: LookupStrategy,
    ) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_global(Some(HTTP_TIMEOUT))
                .http_status_as_error(false)
                .build(),
        );
        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
            label: label.to_string(),
            strategy,
        }
    }

    /// Search query for a merged, labelled PR mentioning `number`.
    pub fn search_query(&self, number: u64) -> String {
        let mut q = format!("repo:{} is:pr is:merged", self.repo);
        if !self.label.is_empty() {
            q.push_str(&format!(" label:{}", self.label));
        }
        q.push_str(&format!(" {number}"));
        q
    }

    fn get(&self, url: &str) -> ureq::RequestBuilder<ureq::typestate::WithoutBody> {
        self.agent
            .get(url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
    }

    fn search(&self, number: u64) -> Result<Option<PullRequestRecord>> {
        let query = self.search_query(number);
        tracing::debug!("search query: {query}");
        let url = format!("{}/search/issues", self.api_url);
        let mut response = self
            .get(&url)
            .query("q", &query)
            .query("per_page", "100")
            .call()?;

        if !response.status().is_success() {
            return Err(api_error(response.status().as_u16(), &mut response));
        }
        let resp: SearchResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ChangelogError::GitHub(format!("failed to parse search response: {e}")))?;
        Ok(resp.items.into_iter().next().map(PullRequestRecord::from))
    }

    fn fetch(&self, number: u64) -> Result<Option<PullRequestRecord>> {
        let url = format!("{}/repos/{}/pulls/{number}", self.api_url, self.repo);
        let mut response = self.get(&url).call()?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(status, &mut response));
        }
        let item: IssueItem = response
            .body_mut()
            .read_json()
            .map_err(|e| ChangelogError::GitHub(format!("failed to parse pull request: {e}")))?;

        if item.merged_at.is_none() {
            tracing::debug!("#{number} is not merged");
            return Ok(None);
        }
        if !self.label.is_empty() && !item.labels.iter().any(|l| l.name == self.label) {
            tracing::debug!("#{number} lacks the '{}' label", self.label);
            return Ok(None);
        }
        Ok(Some(item.into()))
    }
}

fn api_error(status: u16, response: &mut ureq::http::Response<ureq::Body>) -> ChangelogError {
    let body = response.body_mut().read_to_string().unwrap_or_default();
    let msg = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    ChangelogError::GitHub(format!("{status} - {msg}"))
}

impl PullRequestSource for GitHubClient {
    fn lookup(&self, number: u64) -> Result<Option<PullRequestRecord>> {
        match self.strategy {
            LookupStrategy::Search => self.search(number),
            LookupStrategy::Fetch => self.fetch(number),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(label: &str) -> GitHubClient {
        GitHubClient::new(
            "https://api.github.com/",
            "formalco/terraform-provider-formal",
            "t",
            label,
            LookupStrategy::Search,
        )
    }

    #[test]
    fn test_search_query_includes_label() {
        assert_eq!(
            client("provider").search_query(42),
            "repo:formalco/terraform-provider-formal is:pr is:merged label:provider 42"
        );
    }

    #[test]
    fn test_search_query_without_label() {
        assert_eq!(
            client("").search_query(7),
            "repo:formalco/terraform-provider-formal is:pr is:merged 7"
        );
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        assert_eq!(client("x").api_url, "https://api.github.com");
    }

    #[test]
    fn test_search_item_maps_to_record() {
        let json = r#"{
            "items": [{
                "number": 12,
                "title": "Add sidecar listener",
                "html_url": "https://github.com/o/r/pull/12",
                "body": null,
                "labels": [{"name": "provider"}, {"name": "feature"}]
            }]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        let record = PullRequestRecord::from(resp.items.into_iter().next().unwrap());
        assert_eq!(record.number, 12);
        assert_eq!(record.url, "https://github.com/o/r/pull/12");
        assert_eq!(record.body, "");
        assert_eq!(record.labels, vec!["provider", "feature"]);
    }

    #[test]
    fn test_empty_search_response() {
        let resp: SearchResponse = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(resp.items.is_empty());
    }

    /// Run a blocking lookup against `server` off the async runtime.
    async fn lookup(
        server: &MockServer,
        strategy: LookupStrategy,
        number: u64,
    ) -> Result<Option<PullRequestRecord>> {
        let client = GitHubClient::new(&server.uri(), "o/r", "t", "provider", strategy);
        tokio::task::spawn_blocking(move || client.lookup(number))
            .await
            .unwrap()
    }

    fn pull(number: u64, merged: bool, labels: &[&str]) -> serde_json::Value {
        json!({
            "number": number,
            "title": format!("PR {number}"),
            "html_url": format!("https://github.com/o/r/pull/{number}"),
            "body": "Details",
            "labels": labels.iter().map(|l| json!({"name": l})).collect::<Vec<_>>(),
            "merged_at": if merged { json!("2025-10-01T12:00:00Z") } else { json!(null) },
        })
    }

    async fn serve_pull(server: &MockServer, number: u64, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/o/r/pulls/{number}")))
            .and(header("Authorization", "token t"))
            .and(header("User-Agent", USER_AGENT))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_returns_first_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", "repo:o/r is:pr is:merged label:provider 7"))
            .and(query_param("per_page", "100"))
            .and(header("Accept", "application/vnd.github.v3+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "items": [pull(7, true, &["provider"]), pull(70, true, &["provider"])],
            })))
            .mount(&server)
            .await;

        let record = lookup(&server, LookupStrategy::Search, 7).await.unwrap().unwrap();
        assert_eq!(record.number, 7);
        assert_eq!(record.body, "Details");
        assert_eq!(record.labels, vec!["provider"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_without_hits_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        assert!(lookup(&server, LookupStrategy::Search, 7).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let err = lookup(&server, LookupStrategy::Search, 7).await.unwrap_err();
        assert!(matches!(err, ChangelogError::GitHub(_)));
        assert_eq!(err.to_string(), "GitHub API error: 403 - rate limit exceeded");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_merged_labelled_pull() {
        let server = MockServer::start().await;
        serve_pull(
            &server,
            12,
            ResponseTemplate::new(200).set_body_json(pull(12, true, &["bug", "provider"])),
        )
        .await;

        let record = lookup(&server, LookupStrategy::Fetch, 12).await.unwrap().unwrap();
        assert_eq!(record.url, "https://github.com/o/r/pull/12");
        assert_eq!(record.labels, vec!["bug", "provider"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_missing_pull_is_none() {
        let server = MockServer::start().await;
        serve_pull(
            &server,
            9,
            ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})),
        )
        .await;

        assert!(lookup(&server, LookupStrategy::Fetch, 9).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_unmerged_pull_is_none() {
        let server = MockServer::start().await;
        serve_pull(
            &server,
            5,
            ResponseTemplate::new(200).set_body_json(pull(5, false, &["provider"])),
        )
        .await;

        assert!(lookup(&server, LookupStrategy::Fetch, 5).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_unlabelled_pull_is_none() {
        let server = MockServer::start().await;
        serve_pull(
            &server,
            6,
            ResponseTemplate::new(200).set_body_json(pull(6, true, &["docs"])),
        )
        .await;

        assert!(lookup(&server, LookupStrategy::Fetch, 6).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_server_error_aborts() {
        let server = MockServer::start().await;
        serve_pull(&server, 8, ResponseTemplate::new(502).set_body_string("bad gateway")).await;

        let err = lookup(&server, LookupStrategy::Fetch, 8).await.unwrap_err();
        assert_eq!(err.to_string(), "GitHub API error: 502 - bad gateway");
    }
}
