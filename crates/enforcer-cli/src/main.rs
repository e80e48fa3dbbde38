//! enforcer-action - Rode policy enforcement as a GitHub Actions step
//!
//! Every setting can be given as a flag or through the environment the
//! action runner provides (`POLICY_GROUP`, `RESOURCE_URI`, `GITHUB_*`, ...).
//!
//! The step:
//! - evaluates the resource against a policy group or a single policy
//! - posts the report on the triggering pull request
//! - sets the `pass` and `report` step outputs
//! - exits non-zero when enforcement is on and the evaluation failed

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use enforcer_action::{
    init_tracing, write_report_file, ActionConfig, ActionError, ConfigInput, EnforcerAction,
    GitHubClient, OsFileReader, StepOutputs, DEFAULT_GITHUB_API_URL,
};
use rode_client::{HttpRodeClient, DEFAULT_RODE_HOST};
use tracing::{error, info, Level};

/// `true`/`false` parser where an empty value means `default`.
///
/// Unset action inputs reach the environment as empty strings.
fn bool_or(
    default: bool,
) -> impl Fn(&str) -> Result<bool, String> + Clone + Send + Sync + 'static {
    move |value: &str| match value.trim() {
        "" => Ok(default),
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected true or false, got {:?}", other)),
    }
}

#[derive(Parser, Debug)]
#[command(name = "enforcer-action")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate a resource against Rode policies", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Policy group to evaluate the resource against
    #[arg(long, env = "POLICY_GROUP")]
    policy_group: Option<String>,

    /// Single policy to evaluate, by id
    #[arg(long, env = "POLICY_ID")]
    policy_id: Option<String>,

    /// Single policy to evaluate, by name
    #[arg(long, env = "POLICY_NAME")]
    policy_name: Option<String>,

    /// Resource URI, e.g. an image reference with digest
    #[arg(long, env = "RESOURCE_URI")]
    resource_uri: Option<String>,

    /// Fail the step when the evaluation does not pass
    #[arg(
        long,
        env = "ENFORCE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = bool_or(true)
    )]
    enforce: bool,

    /// Rode host
    #[arg(long, env = "RODE_HOST", default_value = DEFAULT_RODE_HOST)]
    rode_host: String,

    /// Talk to Rode over plain HTTP
    #[arg(
        long,
        env = "RODE_INSECURE",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = bool_or(false)
    )]
    rode_insecure: bool,

    /// Post the report as a pull request comment
    #[arg(
        long,
        env = "PR_COMMENT",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = bool_or(true)
    )]
    comment: bool,

    /// Pull request number (read from the event payload when omitted)
    #[arg(long, env = "PULL_REQUEST_NUMBER")]
    pull_request: Option<u64>,

    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://github.com")]
    github_server_url: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,

    /// Repository in owner/repo form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    github_repository: Option<String>,

    #[arg(long, env = "GITHUB_RUN_ID", default_value_t = 0)]
    github_run_id: u64,

    #[arg(long, env = "GITHUB_EVENT_NAME")]
    github_event_name: Option<String>,

    /// Path to the triggering event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    github_event_path: Option<PathBuf>,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// File step outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT")]
    github_output: Option<PathBuf>,

    /// Directory the report file is written to
    #[arg(long, env = "RUNNER_TEMP")]
    report_dir: Option<PathBuf>,
}

impl Cli {
    fn config_input(&self) -> ConfigInput {
        ConfigInput {
            policy_group: self.policy_group.clone(),
            policy_id: self.policy_id.clone(),
            policy_name: self.policy_name.clone(),
            resource_uri: self.resource_uri.clone(),
            enforce: self.enforce,
            rode_host: self.rode_host.clone(),
            rode_insecure: self.rode_insecure,
            comment: self.comment,
            pull_request: self.pull_request,
            github_server_url: self.github_server_url.clone(),
            github_api_url: self.github_api_url.clone(),
            github_repository: self.github_repository.clone(),
            github_run_id: self.github_run_id,
            github_event_name: self.github_event_name.clone(),
            github_event_path: self.github_event_path.clone(),
            github_token: self.github_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = ActionConfig::build(cli.config_input())?;
    info!(
        resource_uri = %config.resource_uri,
        enforce = config.enforce,
        rode_host = %config.rode.host,
        "Starting enforcer action"
    );

    let rode = HttpRodeClient::new(&config.rode).context("Failed to create Rode client")?;
    let github = GitHubClient::new(&config.github.api_url, config.github.token.clone())
        .context("Failed to create GitHub client")?;

    let action = EnforcerAction::new(
        config,
        Arc::new(rode),
        Arc::new(github),
        Arc::new(OsFileReader),
    );
    let result = action.run().await?;

    print!("{}", result.summary);

    let report_path = write_report_file(&result.evaluation_report, cli.report_dir.as_deref())
        .map_err(ActionError::from)
        .context("Failed to write evaluation report")?;

    let outputs = StepOutputs::new(cli.github_output.clone());
    outputs
        .set("pass", result.pass)
        .map_err(ActionError::from)
        .context("Failed to set step output")?;
    outputs
        .set("report", report_path.display())
        .map_err(ActionError::from)
        .context("Failed to set step output")?;

    if result.fail_build {
        error!("Resource evaluation failed and enforcement is enabled");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
