use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Result, ServiceError};

const API_TIMEOUT_SECS: u64 = 30;

/// User-facing message for any repository fetch failure
const FETCH_FAILURE_MESSAGE: &str =
    "Failed to fetch repository data. Please check the URL and try again.";

/// Owner/name pair identifying one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner or organization
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Parses a repository reference out of an arbitrary string.
    ///
    /// The first two non-empty path segments become owner and repo, taken
    /// verbatim. Branch suffixes or a trailing `.git` are not stripped.
    pub fn parse(input: &str) -> Option<Self> {
        let url = Url::parse(input).ok()?;
        Self::from_url(&url)
    }

    /// Extracts a repository reference from an already-parsed URL
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?.to_string();
        let repo = segments.next()?.to_string();
        Some(Self { owner, repo })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Whether a tree entry is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A file
    Blob,
    /// A directory
    Tree,
}

/// One entry in a repository's recursive tree listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Path relative to the repository root
    pub path: String,
    /// File or directory
    pub kind: NodeKind,
    /// Size in bytes, present for blobs
    pub size: Option<u64>,
    /// API URL of the underlying object
    pub url: Option<String>,
}

/// Repository metadata as reported by the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Name of the repository
    pub name: String,
    /// `owner/name` form
    pub full_name: String,
    /// Optional description
    pub description: Option<String>,
    /// Name of the default branch
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<RawTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct RawTreeEntry {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    size: Option<u64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: Option<String>,
}

/// Read-only GitHub API client
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client from the configured base URL and token
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .user_agent(format!("repolens/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.github_api_base.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }
        request
    }

    /// Fetches repository metadata, including the default branch name
    pub async fn get_repository(&self, repo: &RepoRef) -> Result<Repository> {
        let url = format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.repo);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_failure(repo, "metadata", &e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_failure(repo, "metadata", &response.status().to_string()));
        }

        response
            .json::<Repository>()
            .await
            .map_err(|e| fetch_failure(repo, "metadata", &e.to_string()))
    }

    /// Fetches the complete recursive tree of the default branch
    ///
    /// Resolves the default branch first, then requests the recursive
    /// listing. Entries without a path or type are skipped; submodule
    /// entries degrade to blobs. No retry is performed.
    pub async fn fetch_tree(&self, repo: &RepoRef) -> Result<Vec<FileNode>> {
        let metadata = self.get_repository(repo).await?;
        let branch = metadata.default_branch.as_deref().unwrap_or("main");

        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.base_url, repo.owner, repo.repo, branch
        );

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_failure(repo, "tree", &e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_failure(repo, "tree", &response.status().to_string()));
        }

        let listing = response
            .json::<TreeResponse>()
            .await
            .map_err(|e| fetch_failure(repo, "tree", &e.to_string()))?;

        if listing.truncated {
            warn!("Tree listing for {} was truncated by the API", repo);
        }

        Ok(listing
            .tree
            .into_iter()
            .filter_map(|entry| {
                let path = entry.path?;
                let kind = match entry.kind?.as_str() {
                    "tree" => NodeKind::Tree,
                    _ => NodeKind::Blob,
                };
                Some(FileNode {
                    path,
                    kind,
                    size: entry.size,
                    url: entry.url,
                })
            })
            .collect())
    }

    /// Fetches one file's decoded text content
    ///
    /// Any failure (missing file, transport error, undecodable payload)
    /// returns an empty string so the caller can proceed with reduced
    /// signal.
    pub async fn fetch_file_content(&self, repo: &RepoRef, path: &str) -> String {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, repo.owner, repo.repo, path
        );

        let response = match self.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {} from {}: {}", path, repo, e);
                return String::new();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Failed to fetch {} from {}: HTTP {}",
                path,
                repo,
                response.status()
            );
            return String::new();
        }

        let payload = match response.json::<ContentResponse>().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Unreadable content payload for {} from {}: {}", path, repo, e);
                return String::new();
            }
        };

        match payload.content {
            Some(encoded) => decode_content(&encoded),
            None => String::new(),
        }
    }
}

fn fetch_failure(repo: &RepoRef, stage: &str, cause: &str) -> ServiceError {
    error!("GitHub {} fetch failed for {}: {}", stage, repo, cause);
    ServiceError::GitHubApi(FETCH_FAILURE_MESSAGE.to_string())
}

/// Decodes the base64 transport encoding used by the contents endpoint.
/// The API wraps the payload in newlines, so whitespace is dropped first.
fn decode_content(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_client(base_url: &str) -> GitHubClient {
        let config = Config {
            github_api_base: base_url.to_string(),
            ..Config::default()
        };
        GitHubClient::new(&config).unwrap()
    }

    #[test]
    fn test_parse_rejects_non_urls() {
        assert_eq!(RepoRef::parse("not-a-url"), None);
        assert_eq!(RepoRef::parse(""), None);
    }

    #[test]
    fn test_parse_requires_two_segments() {
        assert_eq!(RepoRef::parse("https://github.com"), None);
        assert_eq!(RepoRef::parse("https://github.com/"), None);
        assert_eq!(RepoRef::parse("https://github.com/acme"), None);
        assert_eq!(RepoRef::parse("https://github.com/acme/"), None);
    }

    #[test]
    fn test_parse_takes_first_two_segments_verbatim() {
        let parsed = RepoRef::parse("https://github.com/Acme/Widgets").unwrap();
        assert_eq!(parsed.owner, "Acme");
        assert_eq!(parsed.repo, "Widgets");

        // Extra path segments and known suffixes are not normalized.
        let parsed = RepoRef::parse("https://github.com/acme/widgets/tree/main/src").unwrap();
        assert_eq!(parsed.repo, "widgets");

        let parsed = RepoRef::parse("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(parsed.repo, "widgets.git");
    }

    #[test]
    fn test_parse_tolerates_trailing_slash() {
        let parsed = RepoRef::parse("https://github.com/acme/widgets/").unwrap();
        assert_eq!(parsed.to_string(), "acme/widgets");
    }

    #[test]
    fn test_decode_content_handles_wrapped_base64() {
        // "hello world" split across lines the way the API delivers it
        assert_eq!(decode_content("aGVsbG8g\nd29ybGQ=\n"), "hello world");
        assert_eq!(decode_content("not base64!!"), "");
    }

    #[tokio::test]
    async fn test_fetch_tree() {
        let mut server = mockito::Server::new_async().await;

        let repo_mock = server
            .mock("GET", "/repos/acme/widgets")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"name": "widgets", "full_name": "acme/widgets",
                    "description": null, "default_branch": "main"}"#,
            )
            .create_async()
            .await;

        let tree_mock = server
            .mock("GET", "/repos/acme/widgets/git/trees/main?recursive=1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"tree": [
                    {"path": "src", "type": "tree"},
                    {"path": "src/main.rs", "type": "blob", "size": 120},
                    {"path": "vendored", "type": "commit"}
                ], "truncated": false}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let repo = RepoRef::parse("https://github.com/acme/widgets").unwrap();
        let tree = client.fetch_tree(&repo).await.unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0].kind, NodeKind::Tree);
        assert_eq!(tree[1].path, "src/main.rs");
        assert_eq!(tree[1].size, Some(120));
        // Submodules degrade to blobs rather than being dropped.
        assert_eq!(tree[2].kind, NodeKind::Blob);

        repo_mock.assert_async().await;
        tree_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_tree_surfaces_not_found() {
        let mut server = mockito::Server::new_async().await;

        let _not_found = server
            .mock("GET", "/repos/acme/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let repo = RepoRef::parse("https://github.com/acme/missing").unwrap();
        let err = client.fetch_tree(&repo).await.unwrap_err();

        assert!(err.to_string().contains("Failed to fetch repository data"));
    }

    #[tokio::test]
    async fn test_fetch_file_content_decodes_base64() {
        let mut server = mockito::Server::new_async().await;

        let _contents = server
            .mock("GET", "/repos/acme/widgets/contents/package.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": "eyJuYW1lIjogIndpZGdldHMifQ==", "encoding": "base64"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let repo = RepoRef::parse("https://github.com/acme/widgets").unwrap();
        let content = client.fetch_file_content(&repo, "package.json").await;

        assert_eq!(content, r#"{"name": "widgets"}"#);
    }

    #[tokio::test]
    async fn test_fetch_file_content_degrades_to_empty() {
        let mut server = mockito::Server::new_async().await;

        let _missing = server
            .mock("GET", "/repos/acme/widgets/contents/missing.txt")
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let repo = RepoRef::parse("https://github.com/acme/widgets").unwrap();

        assert_eq!(client.fetch_file_content(&repo, "missing.txt").await, "");
    }
}
