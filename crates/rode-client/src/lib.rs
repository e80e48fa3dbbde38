//! Rode Client: evaluation service access for enforcer-action
//!
//! This crate is the transport layer between the action and a Rode
//! instance. It defines the request/response shapes exchanged with the
//! service, the [`EvaluationService`] trait the rest of the workspace is
//! written against, and an HTTP implementation that talks to the Rode
//! REST gateway.
//!
//! ## Operations
//!
//! - `EvaluateResource`: evaluate a resource against a policy group
//! - `EvaluatePolicy`: evaluate a resource against a single policy
//! - `ListPolicies`: search policies with a filter expression
//! - `GetPolicy`: fetch a single policy by id
//!
//! In-memory fakes are provided for testing via the `fakes` module.

pub mod error;
pub mod fakes;
pub mod http;
pub mod service;
pub mod types;

pub use error::RodeError;
pub use http::{HttpRodeClient, RodeConfig, DEFAULT_RODE_HOST};
pub use service::EvaluationService;
pub use types::{
    EvaluatePolicyRequest, EvaluatePolicyResponse, ListPoliciesRequest, ListPoliciesResponse,
    Policy, PolicyEvaluation, ResourceEvaluation, ResourceEvaluationRequest,
    ResourceEvaluationResult, ResourceEvaluationSource, ResourceVersion, Violation,
};

/// Result type for Rode client operations
pub type Result<T> = std::result::Result<T, RodeError>;
