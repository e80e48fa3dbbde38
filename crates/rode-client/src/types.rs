//! Request and response shapes exchanged with the Rode service.
//!
//! Field names follow the gateway's JSON encoding (camelCase). Fields the
//! gateway omits when they hold their zero value (`false`, empty lists,
//! empty strings) fall back to `Default`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resource evaluation
// ---------------------------------------------------------------------------

/// Identifies the system that requested an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceEvaluationSource {
    pub name: String,
    pub url: String,
}

/// Evaluate a resource against every policy in a policy group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceEvaluationRequest {
    pub policy_group: String,
    pub resource_uri: String,
    pub source: ResourceEvaluationSource,
}

/// The version of a resource that was evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceVersion {
    /// Fully qualified version (e.g. an image reference with digest).
    pub version: String,

    /// Alternate names the version is known by (tags, aliases).
    pub names: Vec<String>,
}

/// Aggregate outcome of a resource evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceEvaluation {
    pub id: String,
    pub pass: bool,
    pub resource_version: ResourceVersion,
}

/// A single reason a policy did not pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Violation {
    pub message: String,
}

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of one policy within a resource evaluation.
///
/// The policy's display name is not part of this message; it has to be
/// looked up separately by `policy_version_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyEvaluation {
    pub id: String,
    pub policy_version_id: String,
    pub pass: bool,
    pub violations: Vec<Violation>,
}

/// Response to a resource evaluation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceEvaluationResult {
    pub resource_evaluation: ResourceEvaluation,
    pub policy_evaluations: Vec<PolicyEvaluation>,
}

impl ResourceEvaluationResult {
    /// Overall pass flag of the evaluation.
    pub fn pass(&self) -> bool {
        self.resource_evaluation.pass
    }
}

// ---------------------------------------------------------------------------
// Single policy evaluation
// ---------------------------------------------------------------------------

/// Evaluate a resource against a single policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluatePolicyRequest {
    /// Policy id.
    pub policy: String,
    pub resource_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluatePolicyResponse {
    pub pass: bool,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Policy {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }
}

/// Search policies with a filter expression (e.g. `name=="my-policy"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListPoliciesRequest {
    pub filter: String,
}

impl ListPoliciesRequest {
    /// Filter matching policies whose name equals `name`.
    pub fn by_name(name: &str) -> Self {
        Self {
            filter: format!("name==\"{}\"", name.replace('"', "\\\"")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListPoliciesResponse {
    pub policies: Vec<Policy>,
    pub next_page_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_evaluation_result_from_gateway_json() {
        let raw = json!({
            "resourceEvaluation": {
                "id": "eval-1",
                "pass": false,
                "resourceVersion": {
                    "version": "registry/image@sha256:abc",
                    "names": ["registry/image:v1"]
                }
            },
            "policyEvaluations": [
                {
                    "id": "pe-1",
                    "policyVersionId": "policy-1.1",
                    "violations": [{ "message": "CVE-2023-1111 present", "pass": false }]
                }
            ]
        });

        let result: ResourceEvaluationResult = serde_json::from_value(raw).unwrap();
        assert!(!result.pass());
        assert_eq!(result.resource_evaluation.id, "eval-1");
        assert_eq!(
            result.resource_evaluation.resource_version.names,
            vec!["registry/image:v1".to_string()]
        );
        assert_eq!(result.policy_evaluations.len(), 1);
        // `pass` omitted by the gateway when false
        assert!(!result.policy_evaluations[0].pass);
        assert_eq!(
            result.policy_evaluations[0].violations[0].message,
            "CVE-2023-1111 present"
        );
    }

    #[test]
    fn test_missing_names_default_to_empty() {
        let raw = json!({
            "resourceEvaluation": {
                "id": "eval-2",
                "pass": true,
                "resourceVersion": { "version": "git://repo@abc" }
            }
        });

        let result: ResourceEvaluationResult = serde_json::from_value(raw).unwrap();
        assert!(result.pass());
        assert!(result.resource_evaluation.resource_version.names.is_empty());
        assert!(result.policy_evaluations.is_empty());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = ResourceEvaluationRequest {
            policy_group: "security".to_string(),
            resource_uri: "registry/image:v1".to_string(),
            source: ResourceEvaluationSource {
                name: "enforcer-action".to_string(),
                url: "https://github.com/org/repo/actions/runs/1".to_string(),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["policyGroup"], json!("security"));
        assert_eq!(value["resourceUri"], json!("registry/image:v1"));
        assert_eq!(value["source"]["name"], json!("enforcer-action"));
    }

    #[test]
    fn test_list_policies_by_name_filter() {
        assert_eq!(
            ListPoliciesRequest::by_name("no-critical-cves").filter,
            "name==\"no-critical-cves\""
        );
        assert_eq!(
            ListPoliciesRequest::by_name("say \"hi\"").filter,
            "name==\"say \\\"hi\\\"\""
        );
    }
}
