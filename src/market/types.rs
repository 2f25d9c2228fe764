//! Core market types for binary UP/DOWN prediction markets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

/// Market side of a binary outcome market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// The YES/UP outcome.
    #[strum(serialize = "UP", serialize = "up", serialize = "yes", serialize = "YES")]
    #[default]
    Up,
    /// The NO/DOWN outcome.
    #[strum(serialize = "DOWN", serialize = "down", serialize = "no", serialize = "NO")]
    Down,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Up => Side::Down,
            Side::Down => Side::Up,
        }
    }
}

/// Best-price snapshot for one market side at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Which side this quote belongs to.
    pub side: Side,
    /// Best bid price.
    pub best_bid: Decimal,
    /// Best ask price.
    pub best_ask: Decimal,
    /// Size available near the top of book.
    pub liquidity: Decimal,
    /// Ask minus bid, clamped at zero.
    pub spread: Decimal,
    /// When the snapshot was taken.
    pub timestamp: OffsetDateTime,
}

impl Quote {
    /// Build a quote, deriving the spread from bid and ask.
    pub fn new(
        side: Side,
        best_bid: Decimal,
        best_ask: Decimal,
        liquidity: Decimal,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            side,
            best_bid,
            best_ask,
            liquidity,
            spread: (best_ask - best_bid).max(Decimal::ZERO),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    #[test]
    fn side_opposite_works() {
        assert_eq!(Side::Up.opposite(), Side::Down);
        assert_eq!(Side::Down.opposite(), Side::Up);
    }

    #[test]
    fn side_from_string_works() {
        use std::str::FromStr;
        assert_eq!(Side::from_str("UP").unwrap(), Side::Up);
        assert_eq!(Side::from_str("down").unwrap(), Side::Down);
        assert_eq!(Side::from_str("yes").unwrap(), Side::Up);
        assert_eq!(Side::from_str("no").unwrap(), Side::Down);
    }

    #[test]
    fn quote_spread_never_negative() {
        let ts = datetime!(2026-01-02 00:00 UTC);
        let normal = Quote::new(Side::Up, dec!(0.48), dec!(0.52), dec!(100), ts);
        assert_eq!(normal.spread, dec!(0.04));

        let crossed = Quote::new(Side::Up, dec!(0.52), dec!(0.48), dec!(100), ts);
        assert_eq!(crossed.spread, dec!(0));
    }
}
