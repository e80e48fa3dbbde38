//! Evaluation reports.
//!
//! Two renderings of the same [`ResourceEvaluationResult`]:
//! - [`render_report`]: Markdown for pull request comments and the report
//!   file. Ends with a hidden marker so the comment can be found again.
//! - [`render_summary`]: plain text for the job log.
//!
//! Both are pure functions of their input. Policy names must be resolved
//! beforehand and passed in.

pub mod markdown;

use rode_client::ResourceEvaluationResult;

use crate::evaluation::PolicyNames;
use markdown::{code, MarkdownWriter};

/// Hidden token identifying comments written by this action.
pub const REPORT_MARKER: &str = "generated-by: enforcer-action";

/// Status glyph and word for report headings.
pub fn status_message(pass: bool) -> &'static str {
    if pass {
        "✅ (PASSED)"
    } else {
        "❌ (FAILED)"
    }
}

fn status_word(pass: bool) -> &'static str {
    if pass {
        "PASSED"
    } else {
        "FAILED"
    }
}

fn display_name<'a>(names: &'a PolicyNames, policy_version_id: &'a str) -> &'a str {
    names
        .get(policy_version_id)
        .map(String::as_str)
        .unwrap_or(policy_version_id)
}

/// Render the Markdown evaluation report.
pub fn render_report(result: &ResourceEvaluationResult, names: &PolicyNames) -> String {
    let evaluation = &result.resource_evaluation;
    let version = &evaluation.resource_version;

    let mut md = MarkdownWriter::new();
    md.h1(&format!(
        "Rode Resource Evaluation Report {}",
        status_message(evaluation.pass)
    ))
    .quote(&format!("report id: {}", evaluation.id))
    .newline()
    .h2("Resource Metadata")
    .table(&["Resource URI"], &[vec![code(&version.version)]]);

    if !version.names.is_empty() {
        let names: Vec<String> = version.names.iter().map(|n| code(n)).collect();
        md.h3("Artifact Names").list(&names).newline();
    }

    md.h2("Policy Results");
    for policy in &result.policy_evaluations {
        md.h3(&format!(
            "{} {}",
            display_name(names, &policy.policy_version_id),
            status_message(policy.pass)
        ))
        .code_fence();
        for violation in &policy.violations {
            md.line(&violation.message);
        }
        md.code_fence().newline();
    }

    md.comment(REPORT_MARKER);
    md.finish()
}

/// Render the plain-text summary.
pub fn render_summary(result: &ResourceEvaluationResult, names: &PolicyNames) -> String {
    let evaluation = &result.resource_evaluation;
    let version = &evaluation.resource_version;

    let mut out = format!(
        "Resource evaluation {} {}\n",
        evaluation.id,
        status_word(evaluation.pass)
    );
    out.push_str(&format!("Resource: {}\n", version.version));
    if !version.names.is_empty() {
        out.push_str(&format!("Names: {}\n", version.names.join(", ")));
    }

    if !result.policy_evaluations.is_empty() {
        out.push_str("Policies:\n");
    }
    for policy in &result.policy_evaluations {
        out.push_str(&format!(
            "  {}: {}\n",
            display_name(names, &policy.policy_version_id),
            status_word(policy.pass)
        ));
        for violation in &policy.violations {
            out.push_str(&format!("    {}\n", violation.message));
        }
    }
    out
}

/// One-line summary of a single policy evaluation.
pub fn render_policy_summary(policy: &str, resource_uri: &str, pass: bool) -> String {
    format!(
        "Policy {} {} for resource {}\n",
        policy,
        status_word(pass),
        resource_uri
    )
}
