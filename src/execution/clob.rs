//! Live CLOB REST order adapter.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::adapter::OrderAdapter;
use super::order::{OrderRequest, OrderResult, OrderStatus};
use crate::config::Config;
use crate::error::ExecutionError;

/// Order adapter backed by the exchange's CLOB REST API.
pub struct ClobOrderAdapter {
    http: reqwest::Client,
    base_url: String,
    market: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl ClobOrderAdapter {
    /// Build the adapter from configuration.
    pub fn new(config: &Config) -> Result<Self, ExecutionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.clob_url.trim_end_matches('/').to_string(),
            market: config.market_slug.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut request = request;
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }
        if let Some(secret) = &self.api_secret {
            request = request.header("X-API-SECRET", secret);
        }
        request
    }
}

/// Order submission response. Field names vary across API versions.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(alias = "orderID", alias = "orderId", alias = "order_id")]
    id: Option<String>,
    error: Option<String>,
}

/// Order status response.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(alias = "orderID", alias = "orderId", alias = "order_id")]
    id: Option<String>,
    status: Option<String>,
    #[serde(default, alias = "filledSize", alias = "sizeFilled")]
    filled_size: Option<Decimal>,
    #[serde(default, alias = "avgPrice")]
    avg_price: Option<Decimal>,
    #[serde(default, alias = "remainingSize", alias = "sizeRemaining")]
    remaining_size: Option<Decimal>,
    error: Option<String>,
}

#[async_trait]
impl OrderAdapter for ClobOrderAdapter {
    #[instrument(skip(self, order), fields(side = %order.side, client_id = %order.client_order_id))]
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, ExecutionError> {
        let payload = json!({
            "market": self.market,
            "side": order.side.to_string(),
            "price": order.price,
            "size": order.size,
            "time_in_force": "GTC",
            "client_order_id": order.client_order_id,
        });

        debug!(price = %order.price, size = %order.size, "submitting order");

        let url = format!("{}/orders", self.base_url);
        let response = self
            .authed(self.http.post(&url).json(&payload))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::SubmissionFailed(format!(
                "HTTP {status} - {body}"
            )));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::SubmissionFailed(format!("bad response: {e}")))?;

        if let Some(error) = submitted.error {
            return Err(ExecutionError::OrderRejected { reason: error });
        }

        let order_id = submitted
            .id
            .unwrap_or_else(|| order.client_order_id.clone());

        info!(order_id = %order_id, "order submitted");

        Ok(OrderResult {
            order_id,
            filled_size: Decimal::ZERO,
            avg_price: None,
            status: OrderStatus::Open,
            remaining_size: order.size,
            error: None,
        })
    }

    async fn fetch_order(&self, order_id: &str) -> Result<OrderResult, ExecutionError> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        let response = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ExecutionError::StatusFailed {
                order_id: order_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ExecutionError::StatusFailed {
                order_id: order_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let parsed: StatusResponse =
            response
                .json()
                .await
                .map_err(|e| ExecutionError::StatusFailed {
                    order_id: order_id.to_string(),
                    reason: format!("bad response: {e}"),
                })?;

        let status = parsed
            .status
            .as_deref()
            .and_then(|s| s.parse::<OrderStatus>().ok())
            .unwrap_or(OrderStatus::Open);

        Ok(OrderResult {
            order_id: parsed.id.unwrap_or_else(|| order_id.to_string()),
            filled_size: parsed.filled_size.unwrap_or(Decimal::ZERO),
            avg_price: parsed.avg_price,
            status,
            remaining_size: parsed.remaining_size.unwrap_or(Decimal::ZERO),
            error: parsed.error,
        })
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), ExecutionError> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        let response = self
            .authed(self.http.delete(&url))
            .send()
            .await
            .map_err(|e| ExecutionError::CancelFailed {
                order_id: order_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ExecutionError::CancelFailed {
                order_id: order_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        info!(order_id = %order_id, "order canceled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_handles_field_aliases() {
        let json = r#"{"orderId": "o-1", "status": "filled", "filledSize": "3", "avgPrice": 0.41, "remainingSize": "0"}"#;
        let parsed: StatusResponse = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.id.as_deref(), Some("o-1"));
        assert_eq!(parsed.status.as_deref(), Some("filled"));
        assert_eq!(parsed.filled_size, Some(Decimal::new(3, 0)));
        assert_eq!(parsed.avg_price, Some(Decimal::new(41, 2)));
    }

    #[test]
    fn submit_response_extracts_various_id_fields() {
        let a: SubmitResponse = serde_json::from_str(r#"{"orderID": "abc"}"#).unwrap();
        assert_eq!(a.id.as_deref(), Some("abc"));

        let b: SubmitResponse = serde_json::from_str(r#"{"order_id": "def"}"#).unwrap();
        assert_eq!(b.id.as_deref(), Some("def"));

        let c: SubmitResponse = serde_json::from_str(r#"{"error": "bad price"}"#).unwrap();
        assert!(c.id.is_none());
        assert_eq!(c.error.as_deref(), Some("bad price"));
    }
}
