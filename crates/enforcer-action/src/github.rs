//! GitHub issue comments API
//!
//! Pull request conversation comments are issue comments, so the action
//! only needs three endpoints:
//! - `GET   /repos/{owner}/{repo}/issues/{number}/comments` (paginated)
//! - `POST  /repos/{owner}/{repo}/issues/{number}/comments`
//! - `PATCH /repos/{owner}/{repo}/issues/comments/{id}`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default REST API root for github.com.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Errors returned by the comments API
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("GitHub returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::Http(err.to_string())
    }
}

pub type GitHubResult<T> = std::result::Result<T, GitHubError>;

/// `owner/repo` pair, as found in `GITHUB_REPOSITORY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositorySlug {
    pub owner: String,
    pub name: String,
}

impl RepositorySlug {
    /// Parse `owner/repo`. Returns `None` for any other shape.
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, name) = slug.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(RepositorySlug {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An issue (or pull request) comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

impl IssueComment {
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// The subset of the GitHub REST API used to decorate pull requests.
#[async_trait]
pub trait CommentsApi: Send + Sync {
    /// One page (1-based) of comments on an issue or pull request.
    async fn list_comments(
        &self,
        repo: &RepositorySlug,
        issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Vec<IssueComment>>;

    async fn create_comment(
        &self,
        repo: &RepositorySlug,
        issue_number: u64,
        body: &str,
    ) -> GitHubResult<IssueComment>;

    async fn edit_comment(
        &self,
        repo: &RepositorySlug,
        comment_id: u64,
        body: &str,
    ) -> GitHubResult<IssueComment>;
}

/// GitHub REST client
pub struct GitHubClient {
    api_url: String,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: Option<String>) -> GitHubResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("enforcer-action/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GitHubClient {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            http_client,
        })
    }

    fn issue_comments_url(&self, repo: &RepositorySlug, issue_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, repo.owner, repo.name, issue_number
        )
    }

    fn comment_url(&self, repo: &RepositorySlug, comment_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.api_url, repo.owner, repo.name, comment_id
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http_client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> GitHubResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CommentsApi for GitHubClient {
    async fn list_comments(
        &self,
        repo: &RepositorySlug,
        issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Vec<IssueComment>> {
        let url = self.issue_comments_url(repo, issue_number);
        debug!(%url, page, "Listing issue comments");
        let request = self
            .request(reqwest::Method::GET, &url)
            .query(&[("page", page), ("per_page", per_page)]);
        self.send(request).await
    }

    async fn create_comment(
        &self,
        repo: &RepositorySlug,
        issue_number: u64,
        body: &str,
    ) -> GitHubResult<IssueComment> {
        let url = self.issue_comments_url(repo, issue_number);
        debug!(%url, "Creating issue comment");
        let request = self
            .request(reqwest::Method::POST, &url)
            .json(&CommentBody { body });
        self.send(request).await
    }

    async fn edit_comment(
        &self,
        repo: &RepositorySlug,
        comment_id: u64,
        body: &str,
    ) -> GitHubResult<IssueComment> {
        let url = self.comment_url(repo, comment_id);
        debug!(%url, "Editing issue comment");
        let request = self
            .request(reqwest::Method::PATCH, &url)
            .json(&CommentBody { body });
        self.send(request).await
    }
}
