//! Order adapter capability contract.

use async_trait::async_trait;

use super::order::{OrderRequest, OrderResult};
use crate::error::ExecutionError;

/// Capability contract for placing, querying and canceling orders.
///
/// The engine and strategy are oblivious to which variant is injected:
/// the live CLOB adapter ([`super::clob::ClobOrderAdapter`]) or the
/// dry-run simulator ([`super::sim::SimOrderAdapter`]). Calls may fail
/// with a transport error; the engine does not retry them itself.
#[async_trait]
pub trait OrderAdapter: Send + Sync {
    /// Submit a limit order.
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, ExecutionError>;

    /// Fetch the current state of an order.
    async fn fetch_order(&self, order_id: &str) -> Result<OrderResult, ExecutionError>;

    /// Cancel a resting order.
    async fn cancel_order(&self, order_id: &str) -> Result<(), ExecutionError>;
}
