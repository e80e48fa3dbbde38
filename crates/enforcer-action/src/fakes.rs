//! In-memory fakes for the GitHub API and file access (testing only)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::github::{CommentsApi, GitHubError, GitHubResult, IssueComment, RepositorySlug};
use crate::pull_request::FileReader;

// ---------------------------------------------------------------------------
// MemoryCommentsApi
// ---------------------------------------------------------------------------

/// Which comments endpoint should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOperation {
    List,
    Create,
    Edit,
}

/// A single pull request's comment thread held in memory.
///
/// Ignores the repository and issue number; there is only one thread.
#[derive(Debug, Default)]
pub struct MemoryCommentsApi {
    comments: Mutex<Vec<IssueComment>>,
    failing: Mutex<Vec<CommentOperation>>,
    list_pages: Mutex<Vec<u32>>,
    creates: Mutex<Vec<(u64, String)>>,
    edits: Mutex<Vec<(u64, String)>>,
}

impl MemoryCommentsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(self, comment: IssueComment) -> Self {
        self.comments.lock().unwrap().push(comment);
        self
    }

    /// Answer every call of `operation` with a 500.
    pub fn failing(self, operation: CommentOperation) -> Self {
        self.failing.lock().unwrap().push(operation);
        self
    }

    /// Pages requested through `list_comments`, in call order.
    pub fn list_pages(&self) -> Vec<u32> {
        self.list_pages.lock().unwrap().clone()
    }

    /// `(issue number, body)` of every created comment.
    pub fn creates(&self) -> Vec<(u64, String)> {
        self.creates.lock().unwrap().clone()
    }

    /// `(comment id, body)` of every edit.
    pub fn edits(&self) -> Vec<(u64, String)> {
        self.edits.lock().unwrap().clone()
    }

    /// Current state of the thread.
    pub fn comments(&self) -> Vec<IssueComment> {
        self.comments.lock().unwrap().clone()
    }

    /// Total number of API calls received.
    pub fn call_count(&self) -> usize {
        self.list_pages().len() + self.creates().len() + self.edits().len()
    }

    fn check(&self, operation: CommentOperation) -> GitHubResult<()> {
        if self.failing.lock().unwrap().contains(&operation) {
            return Err(GitHubError::Status {
                status: 500,
                body: format!("injected {:?} failure", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CommentsApi for MemoryCommentsApi {
    async fn list_comments(
        &self,
        _repo: &RepositorySlug,
        _issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Vec<IssueComment>> {
        self.list_pages.lock().unwrap().push(page);
        self.check(CommentOperation::List)?;

        let start = (page.saturating_sub(1) * per_page) as usize;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn create_comment(
        &self,
        _repo: &RepositorySlug,
        issue_number: u64,
        body: &str,
    ) -> GitHubResult<IssueComment> {
        self.creates
            .lock()
            .unwrap()
            .push((issue_number, body.to_string()));
        self.check(CommentOperation::Create)?;

        let mut comments = self.comments.lock().unwrap();
        let id = comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let comment = IssueComment {
            id,
            body: Some(body.to_string()),
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn edit_comment(
        &self,
        _repo: &RepositorySlug,
        comment_id: u64,
        body: &str,
    ) -> GitHubResult<IssueComment> {
        self.edits
            .lock()
            .unwrap()
            .push((comment_id, body.to_string()));
        self.check(CommentOperation::Edit)?;

        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| GitHubError::Status {
                status: 404,
                body: "Not Found".to_string(),
            })?;
        comment.body = Some(body.to_string());
        Ok(comment.clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryFiles
// ---------------------------------------------------------------------------

/// File contents keyed by path; anything else is `NotFound`.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        self.files.insert(path.into(), contents);
        self
    }
}

impl FileReader for MemoryFiles {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }
}
