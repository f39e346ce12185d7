//! GitHub metadata fetcher.
//!
//! Issues two sequential read-only calls per repository: the repository
//! attributes, then a best-effort recursive file tree of the default branch.

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::CoreError;
use crate::http::{build_client, endpoint};
use crate::types::{MAX_SAMPLE_FILES, RepositoryMetadata};

/// Branch used when the attributes response does not name a default branch.
const FALLBACK_BRANCH: &str = "main";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct RepoAttributes {
    name: String,
    description: Option<String>,
    language: Option<String>,
    topics: Option<Vec<String>>,
    license: Option<LicenseInfo>,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Option<Vec<TreeEntry>>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
}

impl GitHubClient {
    /// Create a client for the API rooted at `api_url`
    /// (normally `https://api.github.com`).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Http` if the HTTP client cannot be built.
    pub fn new(api_url: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            http: build_client()?,
            api_url: api_url.into(),
        })
    }

    /// Fetch repository metadata for `owner/repo`.
    ///
    /// A failing file-tree request does not fail the fetch; the metadata then
    /// carries an empty file list.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for a 404, `CoreError::RateLimit` for a
    /// 403 or 429, `CoreError::HostingApi` for any other non-success status,
    /// and `CoreError::Http` if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn fetch(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata, CoreError> {
        let attrs = self.fetch_attributes(owner, repo).await?;

        let branch = attrs
            .default_branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(FALLBACK_BRANCH);
        let paths = self.fetch_tree(owner, repo, branch).await;
        debug!(branch, paths = paths.len(), "fetched repository metadata");

        Ok(RepositoryMetadata::builder()
            .name(attrs.name)
            .description(attrs.description)
            .primary_language(attrs.language)
            .topics(attrs.topics.unwrap_or_default())
            .license_name(attrs.license.and_then(|l| l.name))
            .sample_file_paths(paths)
            .build())
    }

    async fn fetch_attributes(&self, owner: &str, repo: &str) -> Result<RepoAttributes, CoreError> {
        let url = endpoint(&self.api_url, &format!("repos/{owner}/{repo}"))?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "repository request failed");
            return Err(match status {
                StatusCode::NOT_FOUND => CoreError::NotFound,
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => CoreError::RateLimit,
                other => CoreError::HostingApi {
                    status: other.as_u16(),
                },
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch up to [`MAX_SAMPLE_FILES`] paths from the recursive tree.
    /// Any failure yields an empty list.
    async fn fetch_tree(&self, owner: &str, repo: &str, branch: &str) -> Vec<String> {
        let url = match endpoint(&self.api_url, &format!("repos/{owner}/{repo}/git/trees/{branch}")) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "invalid tree endpoint");
                return Vec::new();
            }
        };

        let response = match self
            .http
            .get(url)
            .query(&[("recursive", "1")])
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = response.status().as_u16(), "tree request failed");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "tree request failed");
                return Vec::new();
            }
        };

        match response.json::<TreeResponse>().await {
            Ok(body) => body
                .tree
                .unwrap_or_default()
                .into_iter()
                .map(|entry| entry.path)
                .take(MAX_SAMPLE_FILES)
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to decode tree response");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    fn tree_body(count: usize) -> String {
        let entries: Vec<_> = (0..count)
            .map(|i| json!({ "path": format!("src/file_{i:02}.rs"), "type": "blob" }))
            .collect();
        json!({ "sha": "abc", "tree": entries, "truncated": false }).to_string()
    }

    #[tokio::test]
    async fn test_should_fetch_attributes_and_tree() {
        let mut server = Server::new_async().await;
        let attrs = server
            .mock("GET", "/repos/octocat/Hello-World")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "Hello-World",
                    "description": "My first repository",
                    "language": "C",
                    "topics": ["demo", "octocat"],
                    "license": { "key": "mit", "name": "MIT License" },
                    "default_branch": "master"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let tree = server
            .mock("GET", "/repos/octocat/Hello-World/git/trees/master")
            .match_query(Matcher::UrlEncoded("recursive".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tree_body(3))
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let metadata = client
            .fetch("octocat", "Hello-World")
            .await
            .expect("should fetch");

        attrs.assert_async().await;
        tree.assert_async().await;
        assert_eq!(metadata.name(), "Hello-World");
        assert_eq!(metadata.description(), Some("My first repository"));
        assert_eq!(metadata.primary_language(), Some("C"));
        assert_eq!(metadata.topics(), ["demo", "octocat"]);
        assert_eq!(metadata.license_name(), Some("MIT License"));
        assert_eq!(
            metadata.sample_file_paths(),
            ["src/file_00.rs", "src/file_01.rs", "src/file_02.rs"]
        );
    }

    #[tokio::test]
    async fn test_should_map_nulls_to_none() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/octocat/Hello-World")
            .with_status(200)
            .with_body(
                json!({
                    "name": "Hello-World",
                    "description": null,
                    "language": null,
                    "license": null,
                    "default_branch": "main"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _tree = server
            .mock("GET", "/repos/octocat/Hello-World/git/trees/main")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "tree": [] }).to_string())
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let metadata = client
            .fetch("octocat", "Hello-World")
            .await
            .expect("should fetch");

        assert!(metadata.description().is_none());
        assert!(metadata.primary_language().is_none());
        assert!(metadata.license_name().is_none());
        assert!(metadata.topics().is_empty());
        assert!(metadata.sample_file_paths().is_empty());
    }

    #[tokio::test]
    async fn test_should_return_not_found_without_fetching_tree() {
        let mut server = Server::new_async().await;
        let attrs = server
            .mock("GET", "/repos/ghost/missing")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;
        let tree = server
            .mock("GET", Matcher::Regex(r"^/repos/ghost/missing/git/trees/".to_owned()))
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let result = client.fetch("ghost", "missing").await;

        assert!(matches!(result, Err(CoreError::NotFound)));
        attrs.assert_async().await;
        tree.assert_async().await;
    }

    #[tokio::test]
    async fn test_should_return_rate_limit_for_403_and_429() {
        for status in [403, 429] {
            let mut server = Server::new_async().await;
            let _attrs = server
                .mock("GET", "/repos/rust-lang/rust")
                .with_status(status)
                .with_body(r#"{"message": "API rate limit exceeded"}"#)
                .create_async()
                .await;

            let client = GitHubClient::new(server.url()).expect("should build client");
            let result = client.fetch("rust-lang", "rust").await;
            assert!(
                matches!(result, Err(CoreError::RateLimit)),
                "status {status} should map to RateLimit, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_should_return_hosting_api_error_with_status() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/rust-lang/rust")
            .with_status(500)
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let result = client.fetch("rust-lang", "rust").await;
        assert!(matches!(result, Err(CoreError::HostingApi { status: 500 })));
    }

    #[tokio::test]
    async fn test_should_succeed_with_empty_paths_when_tree_fails() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/octocat/Hello-World")
            .with_status(200)
            .with_body(json!({ "name": "Hello-World", "default_branch": "master" }).to_string())
            .create_async()
            .await;
        let tree = server
            .mock("GET", "/repos/octocat/Hello-World/git/trees/master")
            .match_query(Matcher::Any)
            .with_status(409)
            .with_body(r#"{"message": "Git Repository is empty."}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let metadata = client
            .fetch("octocat", "Hello-World")
            .await
            .expect("tree failure should not fail the fetch");

        tree.assert_async().await;
        assert!(metadata.sample_file_paths().is_empty());
    }

    #[tokio::test]
    async fn test_should_succeed_with_empty_paths_when_tree_is_malformed() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/octocat/Hello-World")
            .with_status(200)
            .with_body(json!({ "name": "Hello-World" }).to_string())
            .create_async()
            .await;
        let _tree = server
            .mock("GET", "/repos/octocat/Hello-World/git/trees/main")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let metadata = client
            .fetch("octocat", "Hello-World")
            .await
            .expect("should fetch");
        assert!(metadata.sample_file_paths().is_empty());
    }

    #[tokio::test]
    async fn test_should_fall_back_to_main_branch() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/a/b")
            .with_status(200)
            .with_body(json!({ "name": "b", "default_branch": "" }).to_string())
            .create_async()
            .await;
        let tree = server
            .mock("GET", "/repos/a/b/git/trees/main")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(tree_body(1))
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let metadata = client.fetch("a", "b").await.expect("should fetch");

        tree.assert_async().await;
        assert_eq!(metadata.sample_file_paths(), ["src/file_00.rs"]);
    }

    #[tokio::test]
    async fn test_should_keep_first_thirty_paths_in_order() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/a/b")
            .with_status(200)
            .with_body(json!({ "name": "b", "default_branch": "main" }).to_string())
            .create_async()
            .await;
        let _tree = server
            .mock("GET", "/repos/a/b/git/trees/main")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(tree_body(50))
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let metadata = client.fetch("a", "b").await.expect("should fetch");

        let expected: Vec<String> = (0..30).map(|i| format!("src/file_{i:02}.rs")).collect();
        assert_eq!(metadata.sample_file_paths().len(), MAX_SAMPLE_FILES);
        assert_eq!(metadata.sample_file_paths(), expected.as_slice());
    }

    #[tokio::test]
    async fn test_should_fail_on_malformed_attributes() {
        let mut server = Server::new_async().await;
        let _attrs = server
            .mock("GET", "/repos/a/b")
            .with_status(200)
            .with_body(r#"{"description": "no name field"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(server.url()).expect("should build client");
        let result = client.fetch("a", "b").await;
        assert!(matches!(result, Err(CoreError::Http(_))));
    }
}
