//! HTTP client for the Rode REST gateway
//!
//! Every RPC the action needs is also exposed by Rode's gateway as a JSON
//! endpoint under `/v1alpha1`. The client is a thin mapping from
//! [`EvaluationService`] calls onto those endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RodeError;
use crate::service::EvaluationService;
use crate::types::{
    EvaluatePolicyRequest, EvaluatePolicyResponse, ListPoliciesRequest, ListPoliciesResponse,
    Policy, ResourceEvaluationRequest, ResourceEvaluationResult,
};
use crate::Result;

/// Host used when none is configured.
pub const DEFAULT_RODE_HOST: &str = "rode:50051";

/// Rode connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodeConfig {
    /// `host:port`, or a full `http(s)://` base URL
    pub host: String,
    /// Use plain HTTP instead of TLS
    pub insecure: bool,
}

impl Default for RodeConfig {
    fn default() -> Self {
        RodeConfig {
            host: DEFAULT_RODE_HOST.to_string(),
            insecure: false,
        }
    }
}

impl RodeConfig {
    pub fn new(host: &str, insecure: bool) -> Self {
        RodeConfig {
            host: host.to_string(),
            insecure,
        }
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> Result<String> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(RodeError::InvalidHost(self.host.clone()));
        }

        if host.starts_with("http://") || host.starts_with("https://") {
            return Ok(host.to_string());
        }

        let scheme = if self.insecure { "http" } else { "https" };
        Ok(format!("{}://{}", scheme, host))
    }
}

/// Rode client backed by the REST gateway
pub struct HttpRodeClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpRodeClient {
    /// Create a new client for the configured host
    pub fn new(config: &RodeConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("enforcer-action/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpRodeClient {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1alpha1/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RodeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Query parameters for `GET /v1alpha1/policies`.
#[derive(Serialize)]
struct ListPoliciesQuery<'a> {
    filter: &'a str,
}

#[async_trait]
impl EvaluationService for HttpRodeClient {
    async fn evaluate_resource(
        &self,
        request: ResourceEvaluationRequest,
    ) -> Result<ResourceEvaluationResult> {
        let url = self.url("resource-evaluations");
        debug!(%url, "EvaluateResource");
        self.send(self.http_client.post(&url).json(&request)).await
    }

    async fn evaluate_policy(
        &self,
        request: EvaluatePolicyRequest,
    ) -> Result<EvaluatePolicyResponse> {
        let url = self.url(&format!("policies/{}:attest", request.policy));
        debug!(%url, "EvaluatePolicy");
        self.send(self.http_client.post(&url).json(&request)).await
    }

    async fn list_policies(&self, request: ListPoliciesRequest) -> Result<ListPoliciesResponse> {
        let url = self.url("policies");
        debug!(%url, filter = %request.filter, "ListPolicies");
        let query = ListPoliciesQuery {
            filter: &request.filter,
        };
        self.send(self.http_client.get(&url).query(&query)).await
    }

    async fn get_policy(&self, id: &str) -> Result<Policy> {
        let url = self.url(&format!("policies/{}", id));
        debug!(%url, "GetPolicy");
        self.send(self.http_client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rode_config_default() {
        let config = RodeConfig::default();
        assert_eq!(config.host, "rode:50051");
        assert!(!config.insecure);
    }

    #[test]
    fn test_base_url_uses_tls_by_default() {
        let config = RodeConfig::new("rode.example.com:50051", false);
        assert_eq!(
            config.base_url().unwrap(),
            "https://rode.example.com:50051"
        );
    }

    #[test]
    fn test_base_url_insecure() {
        let config = RodeConfig::new("localhost:50051", true);
        assert_eq!(config.base_url().unwrap(), "http://localhost:50051");
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        let config = RodeConfig::new("http://rode.internal/", false);
        assert_eq!(config.base_url().unwrap(), "http://rode.internal");
    }

    #[test]
    fn test_invalid_host_rejected() {
        assert!(matches!(
            RodeConfig::new("   ", false).base_url(),
            Err(RodeError::InvalidHost(_))
        ));
        assert!(matches!(
            RodeConfig::new("rode host", false).base_url(),
            Err(RodeError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_client_endpoint_urls() {
        let client = HttpRodeClient::new(&RodeConfig::new("localhost:50051", true)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:50051");
        assert_eq!(
            client.url("resource-evaluations"),
            "http://localhost:50051/v1alpha1/resource-evaluations"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = HttpRodeClient::new(&RodeConfig::new("127.0.0.1:9", true)).unwrap();
        let err = client.get_policy("p1").await.unwrap_err();
        assert!(matches!(err, RodeError::Http(_)));
    }
}
