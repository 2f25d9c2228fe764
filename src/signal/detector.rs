//! Threshold-crossing movement detector.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;
use tracing::debug;

use super::window::RollingWindow;
use crate::config::Config;
use crate::market::{Quote, Side};

/// Which direction of movement fires a signal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TriggerMode {
    /// Fire when the ask drops by at least the threshold.
    #[default]
    Dump,
    /// Fire when the ask rises by at least the threshold.
    Pump,
}

/// A detected threshold-crossing move on one side.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    /// When the triggering quote arrived.
    pub timestamp: OffsetDateTime,
    /// Side that moved.
    pub side: Side,
    /// Ask price at signal time.
    pub entry_price: Decimal,
    /// Percentage move over the window.
    pub move_pct: Decimal,
    /// Spread at signal time.
    pub spread: Decimal,
    /// Liquidity at signal time.
    pub liquidity: Decimal,
}

/// Watches per-side ask prices over a rolling window and emits a
/// signal when the move crosses the configured threshold.
///
/// Pure function of accumulated state: no I/O, no failure modes.
pub struct MovementDetector {
    window_seconds: u64,
    threshold: Decimal,
    mode: TriggerMode,
    windows: HashMap<Side, RollingWindow>,
}

impl MovementDetector {
    /// Create a detector from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            window_seconds: config.move_window_seconds,
            threshold: config.move_pct_threshold,
            mode: config.trigger_mode,
            windows: HashMap::new(),
        }
    }

    /// Feed a quote; returns a signal when the configured move occurs.
    pub fn update(&mut self, quote: &Quote) -> Option<SignalEvent> {
        let window = self
            .windows
            .entry(quote.side)
            .or_insert_with(|| RollingWindow::new(self.window_seconds));
        window.push(quote.timestamp, quote.best_ask);

        let move_pct = window.movement_pct()?;

        let fired = match self.mode {
            TriggerMode::Dump => move_pct <= -self.threshold,
            TriggerMode::Pump => move_pct >= self.threshold,
        };
        if !fired {
            return None;
        }

        debug!(
            side = %quote.side,
            move_pct = %move_pct,
            ask = %quote.best_ask,
            "movement threshold crossed"
        );

        Some(SignalEvent {
            timestamp: quote.timestamp,
            side: quote.side,
            entry_price: quote.best_ask,
            move_pct,
            spread: quote.spread,
            liquidity: quote.liquidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::datetime;
    use time::Duration;

    fn detector(mode: TriggerMode, threshold: Decimal) -> MovementDetector {
        let config = Config {
            trigger_mode: mode,
            move_pct_threshold: threshold,
            move_window_seconds: 3,
            ..Config::default()
        };
        MovementDetector::new(&config)
    }

    fn quote(side: Side, ask: Decimal, ts: OffsetDateTime) -> Quote {
        Quote::new(side, ask - dec!(0.01), ask, dec!(1000), ts)
    }

    #[test]
    fn dump_fires_on_eleven_percent_drop() {
        let base = datetime!(2026-01-02 00:00 UTC);
        let mut detector = detector(TriggerMode::Dump, dec!(10));

        assert!(detector.update(&quote(Side::Up, dec!(100), base)).is_none());
        assert!(detector
            .update(&quote(Side::Up, dec!(100), base + Duration::seconds(1)))
            .is_none());

        let signal = detector
            .update(&quote(Side::Up, dec!(89), base + Duration::seconds(2)))
            .expect("signal expected");
        assert_eq!(signal.side, Side::Up);
        assert_eq!(signal.move_pct, dec!(-11));
        assert_eq!(signal.entry_price, dec!(89));
    }

    #[test]
    fn dump_stays_quiet_below_threshold() {
        let base = datetime!(2026-01-02 00:00 UTC);
        let mut detector = detector(TriggerMode::Dump, dec!(10));

        assert!(detector.update(&quote(Side::Up, dec!(100), base)).is_none());
        assert!(detector
            .update(&quote(Side::Up, dec!(95), base + Duration::seconds(1)))
            .is_none());
    }

    #[test]
    fn pump_fires_on_rise() {
        let base = datetime!(2026-01-02 00:00 UTC);
        let mut detector = detector(TriggerMode::Pump, dec!(10));

        assert!(detector.update(&quote(Side::Down, dec!(0.40), base)).is_none());
        let signal = detector
            .update(&quote(Side::Down, dec!(0.46), base + Duration::seconds(1)))
            .expect("signal expected");
        assert_eq!(signal.move_pct, dec!(15));
    }

    #[test]
    fn sides_are_tracked_independently() {
        let base = datetime!(2026-01-02 00:00 UTC);
        let mut detector = detector(TriggerMode::Dump, dec!(10));

        assert!(detector.update(&quote(Side::Up, dec!(100), base)).is_none());
        // First DOWN quote opens a fresh window: no signal possible.
        assert!(detector
            .update(&quote(Side::Down, dec!(50), base + Duration::seconds(1)))
            .is_none());
        // UP drop triggers even though DOWN held steady.
        assert!(detector
            .update(&quote(Side::Up, dec!(85), base + Duration::seconds(2)))
            .is_some());
    }

    #[test]
    fn no_signal_after_window_expiry() {
        let base = datetime!(2026-01-02 00:00 UTC);
        let mut detector = detector(TriggerMode::Dump, dec!(10));

        assert!(detector.update(&quote(Side::Up, dec!(100), base)).is_none());
        // 10s later the old sample is gone; single-sample window is quiet.
        assert!(detector
            .update(&quote(Side::Up, dec!(80), base + Duration::seconds(10)))
            .is_none());
    }
}
