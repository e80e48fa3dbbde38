//! Action orchestration: evaluate, report, decorate, decide.

use std::sync::Arc;

use rode_client::{EvaluationService, ResourceEvaluationSource};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ActionConfig, PolicySelector, PolicyTarget};
use crate::error::Result;
use crate::evaluation::{EvaluationClient, SOURCE_NAME};
use crate::github::CommentsApi;
use crate::pull_request::{decorate_pull_request, Decoration, FileReader};
use crate::report::{render_policy_summary, render_report, render_summary};

/// Outcome of an action run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the resource passed evaluation.
    pub pass: bool,

    /// Whether the step should exit non-zero.
    pub fail_build: bool,

    /// Markdown report (or the one-line summary for a single policy).
    pub evaluation_report: String,

    /// Plain-text summary for the job log.
    pub summary: String,

    pub decoration: Decoration,
}

/// A build fails only when enforcement is on and the evaluation did not pass.
pub fn should_fail_build(enforce: bool, pass: bool) -> bool {
    enforce && !pass
}

/// Evaluates the configured resource and reports the result.
pub struct EnforcerAction {
    config: ActionConfig,
    evaluations: EvaluationClient,
    comments: Arc<dyn CommentsApi>,
    files: Arc<dyn FileReader>,
}

impl EnforcerAction {
    pub fn new(
        config: ActionConfig,
        rode: Arc<dyn EvaluationService>,
        comments: Arc<dyn CommentsApi>,
        files: Arc<dyn FileReader>,
    ) -> Self {
        Self {
            config,
            evaluations: EvaluationClient::new(rode),
            comments,
            files,
        }
    }

    /// Run the action.
    ///
    /// Any failure aborts the run; no partial result is returned.
    pub async fn run(&self) -> Result<ActionResult> {
        match &self.config.target {
            PolicyTarget::Group(group) => self.run_policy_group(group).await,
            PolicyTarget::Policy(selector) => self.run_single_policy(selector).await,
        }
    }

    async fn run_policy_group(&self, policy_group: &str) -> Result<ActionResult> {
        let source = ResourceEvaluationSource {
            name: SOURCE_NAME.to_string(),
            url: self.config.github.run_url(),
        };

        let result = self
            .evaluations
            .evaluate_resource(policy_group, &self.config.resource_uri, source)
            .await?;

        let names = self
            .evaluations
            .policy_names(&result.policy_evaluations)
            .await?;
        let report = render_report(&result, &names);
        let summary = render_summary(&result, &names);

        let decoration = decorate_pull_request(
            &self.config,
            self.comments.as_ref(),
            self.files.as_ref(),
            &report,
        )
        .await?;

        let pass = result.pass();
        info!(
            evaluation_id = %result.resource_evaluation.id,
            pass,
            "Resource evaluation complete"
        );

        Ok(ActionResult {
            pass,
            fail_build: should_fail_build(self.config.enforce, pass),
            evaluation_report: report,
            summary,
            decoration,
        })
    }

    async fn run_single_policy(&self, selector: &PolicySelector) -> Result<ActionResult> {
        let pass = self
            .evaluations
            .evaluate_policy(selector, &self.config.resource_uri)
            .await?;

        let summary = render_policy_summary(&selector.to_string(), &self.config.resource_uri, pass);
        info!(policy = %selector, pass, "Policy evaluation complete");

        Ok(ActionResult {
            pass,
            fail_build: should_fail_build(self.config.enforce, pass),
            evaluation_report: summary.clone(),
            summary,
            decoration: Decoration::Skipped,
        })
    }
}
