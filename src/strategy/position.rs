//! Open hedge-cycle bookkeeping.

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::market::Side;

/// The single open hedge cycle.
///
/// Exists only between the leg-1 fill and the cycle close; the
/// strategy is its sole owner and writer. Not persisted: a restart
/// loses this bookkeeping (accepted limitation).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    /// Side entered on leg 1.
    pub leg1_side: Side,
    /// Realized leg-1 entry price.
    pub leg1_price: Decimal,
    /// Leg-1 filled size.
    pub leg1_size: Decimal,
    /// When leg 1 filled.
    pub opened_at: OffsetDateTime,
    /// Side entered on leg 2, once filled.
    pub leg2_side: Option<Side>,
    /// Realized leg-2 entry price, once filled.
    pub leg2_price: Option<Decimal>,
    /// Leg-2 filled size, once filled.
    pub leg2_size: Option<Decimal>,
}

impl PositionState {
    /// Open a fresh cycle from a leg-1 fill.
    pub fn open(side: Side, price: Decimal, size: Decimal, opened_at: OffsetDateTime) -> Self {
        Self {
            leg1_side: side,
            leg1_price: price,
            leg1_size: size,
            opened_at,
            leg2_side: None,
            leg2_price: None,
            leg2_size: None,
        }
    }

    /// Whether both legs are on.
    pub fn is_hedged(&self) -> bool {
        self.leg2_price.is_some()
    }

    /// Combined entry price of both legs, once leg 2 filled.
    pub fn total_cost(&self) -> Option<Decimal> {
        self.leg2_price.map(|leg2| self.leg1_price + leg2)
    }

    /// Estimated realized PnL: `(1 - total_cost) * leg1_size` when
    /// hedged, zero otherwise (an abandoned cycle books no realized
    /// cost beyond leg 1).
    pub fn pnl_estimate(&self) -> Decimal {
        match self.total_cost() {
            Some(cost) => (Decimal::ONE - cost) * self.leg1_size,
            None => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    #[test]
    fn unhedged_position_books_zero_pnl() {
        let position = PositionState::open(
            Side::Up,
            dec!(0.40),
            dec!(3.75),
            datetime!(2026-01-02 00:00 UTC),
        );

        assert!(!position.is_hedged());
        assert_eq!(position.total_cost(), None);
        assert_eq!(position.pnl_estimate(), dec!(0));
    }

    #[test]
    fn hedged_position_pnl_from_combined_cost() {
        let mut position = PositionState::open(
            Side::Up,
            dec!(0.40),
            dec!(3.75),
            datetime!(2026-01-02 00:00 UTC),
        );
        position.leg2_side = Some(Side::Down);
        position.leg2_price = Some(dec!(0.45));
        position.leg2_size = Some(dec!(3.333333));

        assert!(position.is_hedged());
        assert_eq!(position.total_cost(), Some(dec!(0.85)));
        // (1 - 0.85) * 3.75
        assert_eq!(position.pnl_estimate(), dec!(0.5625));
    }
}
