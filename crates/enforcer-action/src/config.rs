//! Action configuration.
//!
//! Settings arrive unvalidated as a [`ConfigInput`] (collected by the CLI
//! from flags and environment variables) and are turned into an
//! [`ActionConfig`] by [`ActionConfig::build`], which rejects invalid
//! combinations before any remote call is made.

use std::path::PathBuf;

use rode_client::RodeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ActionError, Result};
use crate::github::{RepositorySlug, DEFAULT_GITHUB_API_URL};

/// Event names that carry a pull request payload.
pub const PULL_REQUEST_EVENTS: [&str; 2] = ["pull_request", "pull_request_target"];

/// How a single policy is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicySelector {
    Id(String),
    Name(String),
}

impl std::fmt::Display for PolicySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicySelector::Id(id) => write!(f, "{}", id),
            PolicySelector::Name(name) => write!(f, "{:?}", name),
        }
    }
}

/// What the resource is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyTarget {
    Group(String),
    Policy(PolicySelector),
}

/// GitHub Actions run context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubContext {
    pub server_url: String,
    pub api_url: String,
    pub repository: Option<RepositorySlug>,
    pub run_id: u64,
    pub event_name: String,
    pub event_path: Option<PathBuf>,
    pub token: Option<String>,
}

impl Default for GitHubContext {
    fn default() -> Self {
        GitHubContext {
            server_url: "https://github.com".to_string(),
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            repository: None,
            run_id: 0,
            event_name: String::new(),
            event_path: None,
            token: None,
        }
    }
}

impl GitHubContext {
    /// Whether the triggering event is a pull request event.
    pub fn is_pull_request_event(&self) -> bool {
        PULL_REQUEST_EVENTS.contains(&self.event_name.as_str())
    }

    /// Link to the workflow run, sent to Rode as the evaluation source.
    pub fn run_url(&self) -> String {
        let repository = self
            .repository
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        format!(
            "{}/{}/actions/runs/{}",
            self.server_url.trim_end_matches('/'),
            repository,
            self.run_id
        )
    }
}

/// Validated action configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub target: PolicyTarget,
    pub resource_uri: String,
    /// Fail the build when the evaluation does not pass.
    pub enforce: bool,
    pub rode: RodeConfig,
    pub github: GitHubContext,
    /// Post the report on the triggering pull request.
    pub comment: bool,
    /// Pull request number, overriding the event payload.
    pub pull_request: Option<u64>,
}

/// Unvalidated settings as collected from flags and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInput {
    pub policy_group: Option<String>,
    pub policy_id: Option<String>,
    pub policy_name: Option<String>,
    pub resource_uri: Option<String>,
    pub enforce: bool,
    pub rode_host: String,
    pub rode_insecure: bool,
    pub comment: bool,
    pub pull_request: Option<u64>,
    pub github_server_url: String,
    pub github_api_url: String,
    pub github_repository: Option<String>,
    pub github_run_id: u64,
    pub github_event_name: Option<String>,
    pub github_event_path: Option<PathBuf>,
    pub github_token: Option<String>,
}

/// Trim a value and drop it when nothing is left.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ActionConfig {
    /// Validate raw settings.
    ///
    /// Exactly one of policy group, policy id or policy name must be set,
    /// and the resource URI is required.
    pub fn build(input: ConfigInput) -> Result<Self> {
        let group = non_empty(input.policy_group);
        let id = non_empty(input.policy_id);
        let name = non_empty(input.policy_name);

        let target = match (group, id, name) {
            (Some(group), None, None) => PolicyTarget::Group(group),
            (None, Some(id), None) => PolicyTarget::Policy(PolicySelector::Id(id)),
            (None, None, Some(name)) => PolicyTarget::Policy(PolicySelector::Name(name)),
            (None, None, None) => {
                return Err(ActionError::Config(
                    "must set one of policy group, policy id or policy name".to_string(),
                ))
            }
            _ => {
                return Err(ActionError::Config(
                    "only one of policy group, policy id or policy name should be specified"
                        .to_string(),
                ))
            }
        };

        let resource_uri = non_empty(input.resource_uri)
            .ok_or_else(|| ActionError::Config("resource uri is required".to_string()))?;

        let repository = match non_empty(input.github_repository) {
            Some(slug) => Some(RepositorySlug::parse(&slug).ok_or_else(|| {
                ActionError::Config(format!(
                    "repository must be in the form owner/repo, got {:?}",
                    slug
                ))
            })?),
            None => None,
        };

        let rode = RodeConfig::new(input.rode_host.trim(), input.rode_insecure);
        rode.base_url()
            .map_err(|e| ActionError::Config(e.to_string()))?;

        let github = GitHubContext {
            server_url: input.github_server_url.trim().to_string(),
            api_url: input.github_api_url.trim().to_string(),
            repository,
            run_id: input.github_run_id,
            event_name: non_empty(input.github_event_name).unwrap_or_default(),
            event_path: input
                .github_event_path
                .filter(|p| !p.as_os_str().is_empty()),
            token: non_empty(input.github_token),
        };

        // Only policy group runs decorate; single-policy runs never comment.
        let decorates = input.comment
            && matches!(target, PolicyTarget::Group(_))
            && github.is_pull_request_event()
            && (input.pull_request.is_some() || github.event_path.is_some());
        if decorates && github.repository.is_none() {
            return Err(ActionError::Config(
                "repository is required to decorate a pull request".to_string(),
            ));
        }

        Ok(ActionConfig {
            target,
            resource_uri,
            enforce: input.enforce,
            rode,
            github,
            comment: input.comment,
            pull_request: input.pull_request,
        })
    }
}
