//! Pull request decoration.
//!
//! The evaluation report is posted as a single comment per pull request.
//! On re-runs the previous comment is located by [`REPORT_MARKER`] and
//! edited in place instead of adding another one.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ActionConfig;
use crate::error::{ActionError, Result};
use crate::github::{CommentsApi, IssueComment, RepositorySlug};
use crate::report::REPORT_MARKER;

/// Comments requested per page while searching for a previous report.
pub const COMMENTS_PER_PAGE: u32 = 100;

/// Read access to files, injected so tests need no real event payloads.
pub trait FileReader: Send + Sync {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileReader;

impl FileReader for OsFileReader {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// The part of a `pull_request` event payload the action consumes.
#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    pull_request: PullRequestRef,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: u64,
}

/// Parse the pull request number out of an event payload.
pub fn parse_pull_request_number(payload: &[u8]) -> std::result::Result<u64, serde_json::Error> {
    let event: PullRequestEvent = serde_json::from_slice(payload)?;
    Ok(event.pull_request.number)
}

/// Pull request the run belongs to, if any.
///
/// `None` when the event is not a pull request event, or when neither a
/// number nor an event payload is available. A payload that is configured
/// but cannot be read or parsed is an error.
pub fn resolve_pull_request(config: &ActionConfig, files: &dyn FileReader) -> Result<Option<u64>> {
    if !config.github.is_pull_request_event() {
        return Ok(None);
    }

    if let Some(number) = config.pull_request {
        return Ok(Some(number));
    }

    let Some(path) = config.github.event_path.as_deref() else {
        return Ok(None);
    };

    let payload = files.read(path).map_err(|e| ActionError::Payload {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let number = parse_pull_request_number(&payload).map_err(|e| ActionError::Payload {
        path: path.to_path_buf(),
        reason: format!("error unmarshalling event json: {}", e),
    })?;

    Ok(Some(number))
}

/// First comment carrying the report marker.
pub fn find_report_comment(comments: &[IssueComment]) -> Option<&IssueComment> {
    comments.iter().find(|c| c.body().contains(REPORT_MARKER))
}

/// What the upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoration {
    /// No pull request to decorate.
    Skipped,
    Created { comment_id: u64 },
    Updated { comment_id: u64 },
}

/// Create or update the report comment on a pull request.
///
/// Pages through every comment before deciding, so an existing report
/// further down the thread is still found.
pub async fn upsert_comment(
    api: &dyn CommentsApi,
    repo: &RepositorySlug,
    pull_request: u64,
    body: &str,
) -> Result<Decoration> {
    let mut existing = None;
    let mut page = 1;
    loop {
        let comments = api
            .list_comments(repo, pull_request, page, COMMENTS_PER_PAGE)
            .await
            .map_err(|e| {
                ActionError::remote("error searching for existing pull request comment", e)
            })?;

        if let Some(comment) = find_report_comment(&comments) {
            existing = Some(comment.id);
            break;
        }
        if comments.len() < COMMENTS_PER_PAGE as usize {
            break;
        }
        page += 1;
    }

    match existing {
        Some(comment_id) => {
            info!(comment_id, "Found existing comment, updating");
            api.edit_comment(repo, comment_id, body).await.map_err(|e| {
                ActionError::remote(format!("error updating comment (id: {})", comment_id), e)
            })?;
            Ok(Decoration::Updated { comment_id })
        }
        None => {
            let comment = api
                .create_comment(repo, pull_request, body)
                .await
                .map_err(|e| ActionError::remote("error decorating pull request", e))?;
            info!(comment_id = comment.id, "Created pull request comment");
            Ok(Decoration::Created {
                comment_id: comment.id,
            })
        }
    }
}

/// Post `report` on the pull request that triggered the run, when there is one.
pub async fn decorate_pull_request(
    config: &ActionConfig,
    api: &dyn CommentsApi,
    files: &dyn FileReader,
    report: &str,
) -> Result<Decoration> {
    if !config.comment {
        info!("Pull request decoration disabled");
        return Ok(Decoration::Skipped);
    }

    let Some(pull_request) = resolve_pull_request(config, files)? else {
        info!("Skipping pull request decoration");
        return Ok(Decoration::Skipped);
    };

    let repo = config.github.repository.as_ref().ok_or_else(|| {
        ActionError::Config("repository is required to decorate a pull request".to_string())
    })?;

    info!(pr = pull_request, repository = %repo, "Decorating pull request");
    upsert_comment(api, repo, pull_request, report).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GitHubContext, PolicyTarget};
    use crate::fakes::{MemoryCommentsApi, MemoryFiles};
    use rode_client::RodeConfig;
    use std::path::PathBuf;

    fn config(event_name: &str, event_path: Option<&str>) -> ActionConfig {
        ActionConfig {
            target: PolicyTarget::Group("security".to_string()),
            resource_uri: "registry/image:v1".to_string(),
            enforce: true,
            rode: RodeConfig::default(),
            github: GitHubContext {
                repository: RepositorySlug::parse("rode/demo-app"),
                event_name: event_name.to_string(),
                event_path: event_path.map(PathBuf::from),
                ..Default::default()
            },
            comment: true,
            pull_request: None,
        }
    }

    fn comment(id: u64, body: &str) -> IssueComment {
        IssueComment {
            id,
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn test_parse_pull_request_number() {
        let payload = br#"{"action": "opened", "pull_request": {"number": 17, "title": "x"}}"#;
        assert_eq!(parse_pull_request_number(payload).unwrap(), 17);
    }

    #[test]
    fn test_payload_without_pull_request_fails_closed() {
        assert!(parse_pull_request_number(br#"{"ref": "refs/heads/main"}"#).is_err());
        assert!(parse_pull_request_number(br#"{"pull_request": null}"#).is_err());
        assert!(parse_pull_request_number(b"}").is_err());
    }

    #[test]
    fn test_non_pull_request_event_is_skipped() {
        let files = MemoryFiles::new();
        let resolved = resolve_pull_request(&config("push", Some("/event.json")), &files).unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_missing_event_path_is_skipped() {
        let files = MemoryFiles::new();
        let resolved = resolve_pull_request(&config("pull_request", None), &files).unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_configured_number_wins() {
        let files = MemoryFiles::new();
        let mut config = config("pull_request_target", Some("/missing.json"));
        config.pull_request = Some(5);
        assert_eq!(resolve_pull_request(&config, &files).unwrap(), Some(5));
    }

    #[test]
    fn test_unreadable_payload_is_error() {
        let files = MemoryFiles::new();
        let err = resolve_pull_request(&config("pull_request", Some("/event.json")), &files)
            .unwrap_err();
        assert!(matches!(err, ActionError::Payload { .. }));
    }

    #[test]
    fn test_malformed_payload_is_error() {
        let files = MemoryFiles::new().with_file("/event.json", b"}".to_vec());
        let err = resolve_pull_request(&config("pull_request", Some("/event.json")), &files)
            .unwrap_err();
        assert!(matches!(err, ActionError::Payload { .. }));
    }

    #[test]
    fn test_find_report_comment() {
        let comments = vec![
            comment(1, "LGTM"),
            comment(2, &format!("report\n<!---{}--->\n", REPORT_MARKER)),
            comment(3, REPORT_MARKER),
        ];
        assert_eq!(find_report_comment(&comments).map(|c| c.id), Some(2));
        assert!(find_report_comment(&comments[..1]).is_none());
    }

    #[tokio::test]
    async fn test_upsert_edits_existing_comment() {
        let api = MemoryCommentsApi::new()
            .with_comment(comment(10, "first!"))
            .with_comment(comment(11, &format!("old report {}", REPORT_MARKER)))
            .with_comment(comment(12, "nit: typo"));
        let repo = RepositorySlug::parse("rode/demo-app").unwrap();

        let outcome = upsert_comment(&api, &repo, 7, "new report").await.unwrap();

        assert_eq!(outcome, Decoration::Updated { comment_id: 11 });
        assert_eq!(api.edits(), vec![(11, "new report".to_string())]);
        assert!(api.creates().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_creates_when_no_marker() {
        let api = MemoryCommentsApi::new().with_comment(comment(10, "first!"));
        let repo = RepositorySlug::parse("rode/demo-app").unwrap();

        let outcome = upsert_comment(&api, &repo, 7, "new report").await.unwrap();

        assert!(matches!(outcome, Decoration::Created { .. }));
        assert_eq!(api.creates(), vec![(7, "new report".to_string())]);
        assert!(api.edits().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_searches_every_page() {
        let mut api = MemoryCommentsApi::new();
        for id in 1..=COMMENTS_PER_PAGE as u64 + 5 {
            api = api.with_comment(comment(id, "chatter"));
        }
        api = api.with_comment(comment(500, REPORT_MARKER));
        let repo = RepositorySlug::parse("rode/demo-app").unwrap();

        let outcome = upsert_comment(&api, &repo, 7, "new report").await.unwrap();

        assert_eq!(outcome, Decoration::Updated { comment_id: 500 });
        assert_eq!(api.list_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_decoration_disabled() {
        let api = MemoryCommentsApi::new();
        let files = MemoryFiles::new();
        let mut config = config("pull_request", None);
        config.comment = false;
        config.pull_request = Some(3);

        let outcome = decorate_pull_request(&config, &api, &files, "report")
            .await
            .unwrap();

        assert_eq!(outcome, Decoration::Skipped);
        assert!(api.list_pages().is_empty());
    }

    #[tokio::test]
    async fn test_decoration_requires_repository() {
        let api = MemoryCommentsApi::new();
        let files = MemoryFiles::new();
        let mut config = config("pull_request", None);
        config.pull_request = Some(3);
        config.github.repository = None;

        let err = decorate_pull_request(&config, &api, &files, "report")
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Config(_)));
    }
}
