//! Order request/result types and client-id generation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::market::Side;

/// Order status reported by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order is resting on the book.
    #[strum(serialize = "open", serialize = "live", serialize = "OPEN", serialize = "LIVE")]
    Open,
    /// Order is fully filled.
    #[strum(serialize = "filled", serialize = "matched", serialize = "FILLED")]
    Filled,
    /// Order was canceled.
    #[strum(
        serialize = "canceled",
        serialize = "cancelled",
        serialize = "CANCELED",
        serialize = "CANCELLED"
    )]
    Canceled,
    /// Order was rejected.
    #[strum(serialize = "rejected", serialize = "REJECTED")]
    Rejected,
}

impl OrderStatus {
    /// Check if the order was filled.
    pub fn is_filled(&self) -> bool {
        matches!(self, OrderStatus::Filled)
    }

    /// Check if status is terminal (won't change on its own).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }
}

/// A limit order to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Market side to buy.
    pub side: Side,
    /// Limit price.
    pub price: Decimal,
    /// Order size in shares.
    pub size: Decimal,
    /// Unique id for this submission attempt. Requotes get a fresh one.
    pub client_order_id: String,
}

impl OrderRequest {
    /// Validate order parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.price <= Decimal::ZERO {
            return Err("price must be positive".to_string());
        }
        if self.size <= Decimal::ZERO {
            return Err("size must be positive".to_string());
        }
        if self.client_order_id.is_empty() {
            return Err("client_order_id is required".to_string());
        }
        Ok(())
    }
}

/// Outcome of a submission or status check.
#[derive(Debug, Clone)]
pub struct OrderResult {
    /// Exchange-assigned order id.
    pub order_id: String,
    /// Size filled so far.
    pub filled_size: Decimal,
    /// Average fill price, when the adapter reports one.
    pub avg_price: Option<Decimal>,
    /// Current status.
    pub status: OrderStatus,
    /// Size still resting.
    pub remaining_size: Decimal,
    /// Error detail from the exchange, if any.
    pub error: Option<String>,
}

impl OrderResult {
    /// The realized fill price, falling back to the submitted limit
    /// when the adapter reported no (or a zero) average price.
    pub fn fill_price(&self, submitted_price: Decimal) -> Decimal {
        self.avg_price
            .filter(|p| !p.is_zero())
            .unwrap_or(submitted_price)
    }
}

/// Capability for generating client order ids.
///
/// Injected rather than called globally so the strategy stays
/// deterministic under test.
pub trait ClientIdSource: Send + Sync {
    /// Produce a fresh id; `tag` names the submission kind (leg1, leg2, req).
    fn next_id(&self, tag: &str) -> String;
}

/// Production id source backed by random UUIDs.
#[derive(Debug, Default)]
pub struct UuidIdSource;

impl ClientIdSource for UuidIdSource {
    fn next_id(&self, tag: &str) -> String {
        format!("{tag}-{}", Uuid::new_v4().simple())
    }
}
