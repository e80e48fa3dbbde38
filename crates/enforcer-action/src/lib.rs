//! enforcer-action: Rode policy enforcement for GitHub Actions
//!
//! Evaluates a resource (typically a container image) against a Rode policy
//! group or a single policy and reports the outcome back to the workflow:
//! - a Markdown evaluation report, optionally posted on the pull request
//!   (one comment per pull request, updated in place on re-runs)
//! - a `pass` step output
//! - whether the build should fail (`enforce && !pass`)

pub mod action;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod fakes;
pub mod github;
pub mod output;
pub mod pull_request;
pub mod report;
pub mod telemetry;

pub use action::{should_fail_build, ActionResult, EnforcerAction};
pub use config::{ActionConfig, ConfigInput, GitHubContext, PolicySelector, PolicyTarget};
pub use error::{ActionError, Result};
pub use evaluation::{EvaluationClient, PolicyNames, SOURCE_NAME};
pub use github::{
    CommentsApi, GitHubClient, GitHubError, IssueComment, RepositorySlug, DEFAULT_GITHUB_API_URL,
};
pub use output::{write_report_file, StepOutputs};
pub use pull_request::{Decoration, FileReader, OsFileReader};
pub use report::{render_report, render_summary, REPORT_MARKER};
pub use telemetry::init_tracing;
