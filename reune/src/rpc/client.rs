use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::EventPlanRpc;
use crate::config::RpcConfig;
use crate::error::{Result, ReuneError};
use crate::models::{DistributionRow, DistributionSummary, EventPlan, Item, Participant};

/// reqwest client for `POST {base}/rest/v1/rpc/{name}`.
#[derive(Clone)]
pub struct HttpRpcClient {
    inner: Option<Inner>,
}

#[derive(Clone)]
struct Inner {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for HttpRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpcClient")
            .field("base_url", &self.inner.as_ref().map(|i| i.base_url.as_str()))
            .finish()
    }
}

impl HttpRpcClient {
    pub fn new(config: Option<&RpcConfig>) -> Result<Self> {
        let Some(config) = config else {
            return Ok(Self::unavailable());
        };

        url::Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReuneError::Internal(format!("Failed to create HTTP client: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref api_key) = config.api_key {
            let invalid =
                |e: reqwest::header::InvalidHeaderValue| ReuneError::Validation(format!("Invalid RPC API key header: {e}"));
            headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid)?);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(invalid)?,
            );
        }

        Ok(Self {
            inner: Some(Inner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                headers,
            }),
        })
    }

    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    async fn call<P: Serialize + Sync, T: DeserializeOwned>(&self, procedure: &str, params: &P) -> Result<T> {
        let inner = self
            .inner
            .as_ref()
            .ok_or_else(|| ReuneError::RpcUnavailable("RPC_BASE_URL is not configured".to_string()))?;

        let url = format!("{}/rest/v1/rpc/{procedure}", inner.base_url);
        let response = inner
            .client
            .post(&url)
            .headers(inner.headers.clone())
            .json(params)
            .send()
            .await
            .map_err(|e| ReuneError::Rpc {
                procedure: procedure.to_string(),
                message: format!("Request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(procedure, status = %status, body = %body, "RPC call failed");
            return Err(ReuneError::Rpc {
                procedure: procedure.to_string(),
                message: format!("{status}: {body}"),
            });
        }

        response.json::<T>().await.map_err(|e| ReuneError::Rpc {
            procedure: procedure.to_string(),
            message: format!("Failed to parse response: {e}"),
        })
    }
}

/// The platform takes list arguments as JSON-encoded strings.
fn encoded<T: Serialize>(rows: &[T]) -> Result<String> {
    Ok(serde_json::to_string(rows)?)
}

#[async_trait]
impl EventPlanRpc for HttpRpcClient {
    fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    async fn get_event_plan(&self, event_id: &str) -> Result<Option<EventPlan>> {
        tracing::debug!(event_id, "RPC get_event_plan");
        let value: Value = self
            .call("get_event_plan", &json!({ "evento_id": event_id }))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn items_replace_for_event(&self, event_id: &str, items: &[Item]) -> Result<Vec<Item>> {
        tracing::debug!(event_id, count = items.len(), "RPC items_replace_for_event");
        let params = json!({ "evento_id": event_id, "itens": encoded(items)? });
        let stored: Option<Vec<Item>> = self.call("items_replace_for_event", &params).await?;
        Ok(stored.unwrap_or_default())
    }

    async fn participants_bulk_upsert(
        &self,
        event_id: &str,
        participants: &[Participant],
    ) -> Result<Vec<Participant>> {
        tracing::debug!(event_id, count = participants.len(), "RPC participants_bulk_upsert");
        let params = json!({ "evento_id": event_id, "participantes": encoded(participants)? });
        let stored: Option<Vec<Participant>> =
            self.call("participants_bulk_upsert", &params).await?;
        Ok(stored.unwrap_or_default())
    }

    async fn distribution_bulk_upsert(
        &self,
        event_id: &str,
        rows: &[DistributionRow],
    ) -> Result<Vec<DistributionRow>> {
        tracing::debug!(event_id, count = rows.len(), "RPC distribution_bulk_upsert");
        let params = json!({ "evento_id": event_id, "rows": encoded(rows)? });
        let stored: Option<Vec<DistributionRow>> =
            self.call("distribution_bulk_upsert", &params).await?;
        Ok(stored.unwrap_or_default())
    }

    async fn get_distribution_summary(&self, event_id: &str) -> Result<DistributionSummary> {
        tracing::debug!(event_id, "RPC get_distribution_summary");
        self.call("get_distribution_summary", &json!({ "evento_id": event_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_unavailable() {
        let client = HttpRpcClient::new(None).unwrap();
        assert!(!client.is_available());
    }

    #[tokio::test]
    async fn unavailable_client_refuses_calls() {
        let client = HttpRpcClient::unavailable();
        let err = client.get_event_plan("1").await.unwrap_err();
        assert!(matches!(err, ReuneError::RpcUnavailable(_)));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = RpcConfig {
            base_url: "not a url".to_string(),
            api_key: None,
            timeout_secs: 5,
        };
        assert!(matches!(
            HttpRpcClient::new(Some(&config)),
            Err(ReuneError::UrlParse(_))
        ));
    }

    #[test]
    fn list_arguments_are_json_strings() {
        let items = vec![Item {
            id: None,
            event_id: Some("9".to_string()),
            name: "Carvão".to_string(),
            quantity: 3.0,
            unit: "kg".to_string(),
            estimated_value: 23.7,
            category: "Utensílios".to_string(),
            priority: Default::default(),
        }];
        let encoded = encoded(&items).unwrap();
        let back: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back[0]["nome_item"], "Carvão");
        assert_eq!(back[0]["evento_id"], "9");
    }
}
