//! Single-order execution lifecycle: place, wait, cancel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::adapter::OrderAdapter;
use super::order::{OrderRequest, OrderResult};
use crate::error::ExecutionError;
use crate::metrics;

/// Drives one order through place → wait-for-fill → cancel.
///
/// The engine never loops on requotes; resubmission with a fresh price
/// and client id is the strategy's job. Adapter errors propagate
/// unchanged so the caller can register them as failed attempts.
pub struct ExecutionEngine {
    adapter: Arc<dyn OrderAdapter>,
    order_ttl: Duration,
}

impl ExecutionEngine {
    /// Create an engine around the given adapter.
    pub fn new(adapter: Arc<dyn OrderAdapter>, order_ttl: Duration) -> Self {
        Self { adapter, order_ttl }
    }

    /// Submit a GTC limit order and wait up to the configured TTL for
    /// a fill. Unfilled orders are canceled and the last known result
    /// is returned.
    #[instrument(skip(self, order), fields(side = %order.side, price = %order.price, size = %order.size))]
    pub async fn execute_limit_gtc(
        &self,
        order: &OrderRequest,
    ) -> Result<OrderResult, ExecutionError> {
        order.validate().map_err(ExecutionError::InvalidParams)?;

        let start = Instant::now();
        metrics::inc_orders_submitted();

        let placed = self.adapter.place_order(order).await?;
        if placed.status.is_filled() {
            info!(order_id = %placed.order_id, "order filled on submission");
            metrics::record_order_roundtrip_latency(start);
            return Ok(placed);
        }

        debug!(
            order_id = %placed.order_id,
            ttl_s = self.order_ttl.as_secs(),
            "order resting, waiting for fill"
        );
        sleep(self.order_ttl).await;

        let refreshed = self.adapter.fetch_order(&placed.order_id).await?;
        if refreshed.status.is_filled() {
            info!(order_id = %refreshed.order_id, "order filled within ttl");
            metrics::record_order_roundtrip_latency(start);
            return Ok(refreshed);
        }

        warn!(
            order_id = %placed.order_id,
            status = %refreshed.status,
            filled = %refreshed.filled_size,
            "order unfilled after ttl, canceling"
        );
        self.adapter.cancel_order(&placed.order_id).await?;
        metrics::record_order_roundtrip_latency(start);
        Ok(refreshed)
    }
}
