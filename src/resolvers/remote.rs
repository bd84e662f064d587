use crate::domain::model::{AccountKey, ResolutionResult};
use crate::domain::ports::Resolver;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Stateless lookup against an intermediary HTTP service: one POST per key,
/// HTTP 200 with a `customer_id` field means resolved, anything else means
/// "not found". No retry, no custom timeout beyond the transport default.
pub struct RemoteLookup {
    client: Client,
    endpoint: String,
}

impl RemoteLookup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Resolver for RemoteLookup {
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    async fn resolve(&mut self, key: &AccountKey) -> ResolutionResult {
        let body = serde_json::json!({ "account_number": key.as_str() });

        let response = match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Lookup request failed for {}: {}", key, e);
                return ResolutionResult::Empty;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!("Lookup for {} returned {}", key, response.status());
            return ResolutionResult::Empty;
        }

        let value: serde_json::Value = match response.json().await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Unreadable lookup response for {}: {}", key, e);
                return ResolutionResult::Empty;
            }
        };

        match value.get("customer_id").and_then(|id| id.as_str()) {
            Some(id) if !id.is_empty() => ResolutionResult::CustomerId(id.to_string()),
            _ => ResolutionResult::Empty,
        }
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn key(raw: &str) -> AccountKey {
        AccountKey::normalize(raw).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_returns_customer_id_on_200() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/lookup")
                .json_body(serde_json::json!({"account_number": "00000000000123"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"customer_id": "CUST-9"}));
        });

        let mut resolver = RemoteLookup::new(server.url("/lookup"));
        let result = resolver.resolve(&key("123")).await;

        lookup_mock.assert();
        assert_eq!(result, ResolutionResult::CustomerId("CUST-9".into()));
    }

    #[tokio::test]
    async fn test_resolve_missing_customer_id_field_is_empty() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(POST).path("/lookup");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "ok"}));
        });

        let mut resolver = RemoteLookup::new(server.url("/lookup"));
        let result = resolver.resolve(&key("123")).await;

        lookup_mock.assert();
        assert_eq!(result, ResolutionResult::Empty);
    }

    #[tokio::test]
    async fn test_resolve_non_200_is_empty() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(POST).path("/lookup");
            then.status(404);
        });

        let mut resolver = RemoteLookup::new(server.url("/lookup"));
        let result = resolver.resolve(&key("123")).await;

        lookup_mock.assert();
        assert_eq!(result, ResolutionResult::Empty);
    }

    #[tokio::test]
    async fn test_resolve_transport_failure_is_empty() {
        // Nothing is listening on this port.
        let mut resolver = RemoteLookup::new("http://127.0.0.1:1/lookup");
        let result = resolver.resolve(&key("123")).await;
        assert_eq!(result, ResolutionResult::Empty);
    }
}
