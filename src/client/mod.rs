//! HTTP client for the policy service.
//!
//! A thin pull source over the two governance endpoints. No retries, no
//! auth, no pagination: callers get the decoded records or a `FetchError`
//! describing exactly where the fetch fell over.

use crate::models::{Policy, PolicyEnvelope, PolicyListEnvelope};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Everything that can go wrong between sending a request and holding a
/// decoded policy record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Cannot connect to policy service at {url}. Is the service running?")]
    Connect { url: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Policy service error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode policy service response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Failed to send request: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Client for `GET /v2/policy` and `GET /v2/policy/{id}`.
pub struct PolicyClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
}

impl PolicyClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
        }
    }

    /// Fetch the full policy list.
    pub async fn fetch_policies(&self) -> Result<Vec<Policy>, FetchError> {
        let url = self.list_url();
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let envelope: PolicyListEnvelope =
            response.json().await.map_err(FetchError::Decode)?;

        for id in duplicate_ids(&envelope.policies) {
            warn!("Duplicate policy id in fetched batch: {}", id);
        }

        Ok(envelope.policies)
    }

    /// Fetch a single policy by id.
    pub async fn fetch_policy(&self, id: &str) -> Result<Policy, FetchError> {
        let url = self.detail_url(id);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let envelope: PolicyEnvelope = response.json().await.map_err(FetchError::Decode)?;
        Ok(envelope.policy)
    }

    fn list_url(&self) -> String {
        format!("{}/v2/policy", self.base_url)
    }

    fn detail_url(&self, id: &str) -> String {
        format!("{}/v2/policy/{}", self.base_url, id)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else if error.is_connect() {
            FetchError::Connect {
                url: self.base_url.clone(),
            }
        } else {
            FetchError::Transport(error)
        }
    }
}

/// Ids that appear more than once in a batch, each reported once.
///
/// Batches are expected to carry unique ids; a duplicate is a data-contract
/// breach worth a warning, but the batch is passed through unrepaired.
fn duplicate_ids(policies: &[Policy]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for policy in policies {
        if !seen.insert(policy.id.as_str()) && !duplicates.contains(&policy.id.as_str()) {
            duplicates.push(policy.id.as_str());
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RuleSet, RuleToggle};
    use chrono::NaiveDate;

    fn create_test_policy(id: &str) -> Policy {
        Policy {
            id: id.to_string(),
            status: "active".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            rules: RuleSet {
                data_retention: RuleToggle::default(),
                cookie_policy: RuleToggle::default(),
            },
            domain: None,
            owner: None,
            descriptor: None,
            policy_type: None,
        }
    }

    #[test]
    fn test_urls_from_base() {
        let client = PolicyClient::new("http://localhost:8080", 30);
        assert_eq!(client.list_url(), "http://localhost:8080/v2/policy");
        assert_eq!(
            client.detail_url("abc-123"),
            "http://localhost:8080/v2/policy/abc-123"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = PolicyClient::new("http://localhost:8080/", 30);
        assert_eq!(client.list_url(), "http://localhost:8080/v2/policy");
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let policies = vec![
            create_test_policy("a"),
            create_test_policy("b"),
            create_test_policy("a"),
            create_test_policy("a"),
        ];

        assert_eq!(duplicate_ids(&policies), vec!["a"]);
    }

    #[test]
    fn test_unique_ids_report_nothing() {
        let policies = vec![create_test_policy("a"), create_test_policy("b")];
        assert!(duplicate_ids(&policies).is_empty());
    }

    #[test]
    fn test_timeout_error_message() {
        let error = FetchError::Timeout { seconds: 30 };
        assert_eq!(error.to_string(), "Request timed out after 30s");
    }
}
