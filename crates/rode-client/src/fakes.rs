//! In-memory fake of the evaluation service (testing only)
//!
//! `MemoryRodeService` answers from canned data, can be told to fail any
//! operation, and records every call so tests can assert on what was sent.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RodeError;
use crate::service::EvaluationService;
use crate::types::*;
use crate::Result;

/// Operations of [`EvaluationService`], used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    EvaluateResource,
    EvaluatePolicy,
    ListPolicies,
    GetPolicy,
}

/// A call received by the fake, with its request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    EvaluateResource(ResourceEvaluationRequest),
    EvaluatePolicy(EvaluatePolicyRequest),
    ListPolicies(ListPoliciesRequest),
    GetPolicy(String),
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::EvaluateResource(_) => Operation::EvaluateResource,
            RecordedCall::EvaluatePolicy(_) => Operation::EvaluatePolicy,
            RecordedCall::ListPolicies(_) => Operation::ListPolicies,
            RecordedCall::GetPolicy(_) => Operation::GetPolicy,
        }
    }
}

/// In-memory evaluation service.
///
/// `list_policies` ignores the filter and returns every known policy in
/// insertion order, so callers must do their own exact-name matching.
#[derive(Debug, Default)]
pub struct MemoryRodeService {
    evaluation: Mutex<Option<ResourceEvaluationResult>>,
    policies: Mutex<Vec<Policy>>,
    policy_results: Mutex<HashMap<String, bool>>,
    failures: Mutex<HashSet<Operation>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MemoryRodeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result returned by `evaluate_resource`.
    pub fn with_evaluation(self, result: ResourceEvaluationResult) -> Self {
        *self.evaluation.lock().unwrap() = Some(result);
        self
    }

    /// Register a policy for `get_policy` / `list_policies`.
    pub fn with_policy(self, policy: Policy) -> Self {
        self.policies.lock().unwrap().push(policy);
        self
    }

    /// Outcome of `evaluate_policy` for the given policy id.
    pub fn with_policy_result(self, policy_id: &str, pass: bool) -> Self {
        self.policy_results
            .lock()
            .unwrap()
            .insert(policy_id.to_string(), pass);
        self
    }

    /// Make every call of `operation` fail with a 500.
    pub fn failing(self, operation: Operation) -> Self {
        self.failures.lock().unwrap().insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);
        if self.failures.lock().unwrap().contains(&operation) {
            return Err(RodeError::Status {
                status: 500,
                body: format!("injected {:?} failure", operation),
            });
        }
        Ok(())
    }
}

fn not_found(what: &str) -> RodeError {
    RodeError::Status {
        status: 404,
        body: format!("{} not found", what),
    }
}

#[async_trait]
impl EvaluationService for MemoryRodeService {
    async fn evaluate_resource(
        &self,
        request: ResourceEvaluationRequest,
    ) -> Result<ResourceEvaluationResult> {
        self.record(RecordedCall::EvaluateResource(request))?;
        self.evaluation
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| not_found("resource evaluation"))
    }

    async fn evaluate_policy(
        &self,
        request: EvaluatePolicyRequest,
    ) -> Result<EvaluatePolicyResponse> {
        let policy = request.policy.clone();
        self.record(RecordedCall::EvaluatePolicy(request))?;
        self.policy_results
            .lock()
            .unwrap()
            .get(&policy)
            .map(|pass| EvaluatePolicyResponse { pass: *pass })
            .ok_or_else(|| not_found(&format!("policy {}", policy)))
    }

    async fn list_policies(&self, request: ListPoliciesRequest) -> Result<ListPoliciesResponse> {
        self.record(RecordedCall::ListPolicies(request))?;
        Ok(ListPoliciesResponse {
            policies: self.policies.lock().unwrap().clone(),
            next_page_token: String::new(),
        })
    }

    async fn get_policy(&self, id: &str) -> Result<Policy> {
        self.record(RecordedCall::GetPolicy(id.to_string()))?;
        self.policies
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(&format!("policy {}", id)))
    }
}
