//! Dry-run order adapter: fills everything instantly at the limit price.

use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::adapter::OrderAdapter;
use super::order::{OrderRequest, OrderResult, OrderStatus};
use crate::error::ExecutionError;

/// Simulated adapter for dry runs.
///
/// Every order fills immediately at its limit price with a synthetic
/// order id. Submitted orders are kept for inspection so a dry run can
/// be audited afterwards.
#[derive(Default)]
pub struct SimOrderAdapter {
    placed: Mutex<Vec<OrderRequest>>,
}

impl SimOrderAdapter {
    /// Create a fresh simulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders submitted so far, in submission order.
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderAdapter for SimOrderAdapter {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, ExecutionError> {
        info!(
            side = %order.side,
            price = %order.price,
            size = %order.size,
            client_id = %order.client_order_id,
            "dry-run order"
        );
        self.placed.lock().unwrap().push(order.clone());

        Ok(OrderResult {
            order_id: format!("sim-{}", Uuid::new_v4().simple()),
            filled_size: order.size,
            avg_price: Some(order.price),
            status: OrderStatus::Filled,
            remaining_size: Decimal::ZERO,
            error: None,
        })
    }

    async fn fetch_order(&self, order_id: &str) -> Result<OrderResult, ExecutionError> {
        Ok(OrderResult {
            order_id: order_id.to_string(),
            filled_size: Decimal::ZERO,
            avg_price: None,
            status: OrderStatus::Filled,
            remaining_size: Decimal::ZERO,
            error: None,
        })
    }

    async fn cancel_order(&self, _order_id: &str) -> Result<(), ExecutionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Side;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn fills_at_limit_price_and_records_order() {
        let adapter = SimOrderAdapter::new();
        let order = OrderRequest {
            side: Side::Up,
            price: dec!(0.40),
            size: dec!(3),
            client_order_id: "leg1-1".to_string(),
        };

        let result = adapter.place_order(&order).await.unwrap();

        assert!(result.status.is_filled());
        assert_eq!(result.filled_size, dec!(3));
        assert_eq!(result.avg_price, Some(dec!(0.40)));
        assert!(result.order_id.starts_with("sim-"));
        assert_eq!(adapter.placed_orders(), vec![order]);
    }
}
