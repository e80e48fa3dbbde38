//! Evaluation client adapter.
//!
//! Wraps an [`EvaluationService`] with the action's error taxonomy: service
//! failures become [`ActionError::Remote`], an unknown policy name becomes
//! [`ActionError::PolicyNotFound`].

use std::collections::HashMap;
use std::sync::Arc;

use rode_client::{
    EvaluatePolicyRequest, EvaluationService, ListPoliciesRequest, Policy, PolicyEvaluation,
    ResourceEvaluationRequest, ResourceEvaluationResult, ResourceEvaluationSource,
};
use tracing::{debug, info, warn};

use crate::config::PolicySelector;
use crate::error::{ActionError, Result};

/// Name the action reports itself as when requesting evaluations.
pub const SOURCE_NAME: &str = "enforcer-action";

/// Policy version id to display name.
pub type PolicyNames = HashMap<String, String>;

pub struct EvaluationClient {
    service: Arc<dyn EvaluationService>,
}

impl EvaluationClient {
    pub fn new(service: Arc<dyn EvaluationService>) -> Self {
        Self { service }
    }

    /// Evaluate a resource against every policy in a policy group.
    pub async fn evaluate_resource(
        &self,
        policy_group: &str,
        resource_uri: &str,
        source: ResourceEvaluationSource,
    ) -> Result<ResourceEvaluationResult> {
        info!(policy_group, resource_uri, "Evaluating resource");
        self.service
            .evaluate_resource(ResourceEvaluationRequest {
                policy_group: policy_group.to_string(),
                resource_uri: resource_uri.to_string(),
                source,
            })
            .await
            .map_err(|e| ActionError::remote("error evaluating resource", e))
    }

    /// Evaluate a resource against a single policy and return its pass flag.
    pub async fn evaluate_policy(
        &self,
        selector: &PolicySelector,
        resource_uri: &str,
    ) -> Result<bool> {
        let policy_id = match selector {
            PolicySelector::Id(id) => id.clone(),
            PolicySelector::Name(name) => self.find_policy_by_name(name).await?.id,
        };

        info!(policy_id = %policy_id, resource_uri, "Evaluating policy");
        let response = self
            .service
            .evaluate_policy(EvaluatePolicyRequest {
                policy: policy_id,
                resource_uri: resource_uri.to_string(),
            })
            .await
            .map_err(|e| ActionError::remote("error evaluating policy", e))?;

        Ok(response.pass)
    }

    /// Resolve a policy name to a policy.
    ///
    /// When several policies share the name, the first one returned by the
    /// service wins.
    pub async fn find_policy_by_name(&self, name: &str) -> Result<Policy> {
        let response = self
            .service
            .list_policies(ListPoliciesRequest::by_name(name))
            .await
            .map_err(|e| ActionError::remote("error listing policies", e))?;

        let mut matches = response.policies.into_iter().filter(|p| p.name == name);
        let policy = matches.next().ok_or_else(|| ActionError::PolicyNotFound {
            name: name.to_string(),
        })?;

        let others = matches.count();
        if others > 0 {
            warn!(
                policy_name = name,
                policy_id = %policy.id,
                matches = others + 1,
                "Multiple policies share this name, using the first"
            );
        }

        Ok(policy)
    }

    /// Display name of a policy version.
    pub async fn policy_name(&self, policy_version_id: &str) -> Result<String> {
        let policy = self
            .service
            .get_policy(policy_version_id)
            .await
            .map_err(|e| {
                ActionError::remote(format!("error fetching policy {}", policy_version_id), e)
            })?;
        Ok(policy.name)
    }

    /// Resolve the display name of every policy referenced by `evaluations`.
    ///
    /// Lookups run sequentially, once per distinct policy version id.
    pub async fn policy_names(&self, evaluations: &[PolicyEvaluation]) -> Result<PolicyNames> {
        let mut names = PolicyNames::new();
        for evaluation in evaluations {
            if names.contains_key(&evaluation.policy_version_id) {
                continue;
            }
            let name = self.policy_name(&evaluation.policy_version_id).await?;
            debug!(policy_version_id = %evaluation.policy_version_id, name = %name, "Resolved policy name");
            names.insert(evaluation.policy_version_id.clone(), name);
        }
        Ok(names)
    }
}
