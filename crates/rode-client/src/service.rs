//! The evaluation service abstraction.

use async_trait::async_trait;

use crate::types::{
    EvaluatePolicyRequest, EvaluatePolicyResponse, ListPoliciesRequest, ListPoliciesResponse,
    Policy, ResourceEvaluationRequest, ResourceEvaluationResult,
};
use crate::Result;

/// Remote policy evaluation service.
///
/// Guarantees expected from implementations:
/// - Every call is a single request; nothing is retried.
/// - Errors are returned verbatim, callers decide how to classify them.
#[async_trait]
pub trait EvaluationService: Send + Sync {
    /// Evaluate a resource against a policy group.
    async fn evaluate_resource(
        &self,
        request: ResourceEvaluationRequest,
    ) -> Result<ResourceEvaluationResult>;

    /// Evaluate a resource against a single policy, identified by id.
    async fn evaluate_policy(&self, request: EvaluatePolicyRequest)
        -> Result<EvaluatePolicyResponse>;

    /// List policies matching a filter expression.
    async fn list_policies(&self, request: ListPoliciesRequest) -> Result<ListPoliciesResponse>;

    /// Fetch a policy by id.
    async fn get_policy(&self, id: &str) -> Result<Policy>;
}
