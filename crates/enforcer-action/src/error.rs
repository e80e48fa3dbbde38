//! Error taxonomy for enforcer-action.

use std::path::PathBuf;

/// Errors that abort an action run.
///
/// Every variant is fatal: the run stops at the first error and no partial
/// result is produced.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Missing or invalid settings, detected before any remote call.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Rode or GitHub could not be reached or answered with an error.
    #[error("{context}: {message}")]
    Remote { context: String, message: String },

    /// A policy looked up by name does not exist.
    #[error("unable to find a policy with name {name:?}")]
    PolicyNotFound { name: String },

    /// The pull request event payload is missing or malformed.
    #[error("error reading event payload at {}: {reason}", .path.display())]
    Payload { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    pub(crate) fn remote(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ActionError::Remote {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for action operations.
pub type Result<T> = std::result::Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_not_found_message() {
        let err = ActionError::PolicyNotFound {
            name: "no-critical-cves".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unable to find a policy with name \"no-critical-cves\""
        );
    }

    #[test]
    fn remote_message_keeps_context() {
        let err = ActionError::remote("error evaluating resource", "connection refused");
        assert_eq!(
            err.to_string(),
            "error evaluating resource: connection refused"
        );
    }

    #[test]
    fn payload_message_names_path() {
        let err = ActionError::Payload {
            path: PathBuf::from("/tmp/event.json"),
            reason: "expected value".to_string(),
        };
        assert!(err.to_string().contains("/tmp/event.json"));
    }
}
