//! Feed payload parsing.

use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::market::{Quote, Side};

/// Raw quote message from the feed.
///
/// Expected shape:
///
/// ```text
/// {"side": "UP", "best_bid": 0.48, "best_ask": 0.52, "liquidity": 1200.0}
/// ```
#[derive(Debug, Deserialize)]
struct QuotePayload {
    side: String,
    best_bid: Decimal,
    best_ask: Decimal,
    #[serde(default)]
    liquidity: Decimal,
}

/// Parse one feed message into a quote.
///
/// Malformed messages yield `None`; the caller drops them without
/// producing a quote or crashing.
pub fn parse_quote(text: &str, now: OffsetDateTime) -> Option<Quote> {
    let payload: QuotePayload = serde_json::from_str(text).ok()?;
    let side = payload.side.parse::<Side>().ok()?;
    Some(Quote::new(
        side,
        payload.best_bid,
        payload.best_ask,
        payload.liquidity,
        now,
    ))
}
