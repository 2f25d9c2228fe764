//! End-to-end hedge-cycle scenarios driven through the public API:
//! quotes flow into the movement detector and the strategy exactly the
//! way the service loop feeds them.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use dip_hedge::config::Config;
use dip_hedge::execution::sim::SimOrderAdapter;
use dip_hedge::execution::{ExecutionEngine, UuidIdSource};
use dip_hedge::journal::{MemoryJournal, TradeEvent};
use dip_hedge::market::{Quote, Side};
use dip_hedge::risk::RiskGate;
use dip_hedge::signal::{MovementDetector, TriggerMode};
use dip_hedge::strategy::{CloseReason, DipHedgeStrategy, EntryReason, TimeoutAction};

struct Bot {
    detector: MovementDetector,
    strategy: DipHedgeStrategy,
    journal: Arc<MemoryJournal>,
    adapter: Arc<SimOrderAdapter>,
}

impl Bot {
    fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let adapter = Arc::new(SimOrderAdapter::new());
        let journal = Arc::new(MemoryJournal::new());
        let engine = ExecutionEngine::new(
            adapter.clone(),
            StdDuration::from_secs(config.order_ttl_seconds),
        );
        let strategy = DipHedgeStrategy::new(
            config.clone(),
            engine,
            RiskGate::new(&config),
            journal.clone(),
            Arc::new(UuidIdSource),
        );
        Self {
            detector: MovementDetector::new(&config),
            strategy,
            journal,
            adapter,
        }
    }

    /// Feed one quote the way the service loop does.
    async fn feed(&mut self, side: Side, bid: Decimal, ask: Decimal, ts: OffsetDateTime) {
        let quote = Quote::new(side, bid, ask, dec!(1000), ts);
        self.strategy.on_quote(quote.clone()).await.unwrap();
        if let Some(signal) = self.detector.update(&quote) {
            self.strategy.on_signal(signal).await.unwrap();
        }
    }
}

fn test_config() -> Config {
    Config {
        trigger_mode: TriggerMode::Dump,
        move_pct_threshold: dec!(10),
        move_window_seconds: 3,
        sum_target: dec!(0.95),
        sum_target_max: dec!(0.99),
        leg2_timeout_seconds: 180,
        leg2_timeout_action: TimeoutAction::DefensiveHedge,
        bankroll_usd: dec!(50),
        max_usd_per_leg: dec!(1.5),
        slippage_bps: dec!(0),
        ..Config::default()
    }
}

#[tokio::test]
async fn dump_signal_hedges_at_sum_target_and_completes() {
    let mut bot = Bot::new(test_config());
    let t0 = datetime!(2026-01-02 00:00 UTC);

    // Warm UP quote, then an -11.1% dump fires the signal: leg 1 on at
    // 0.40 for 1.5 / 0.40 = 3.75 shares.
    bot.feed(Side::Up, dec!(0.44), dec!(0.45), t0).await;
    bot.feed(Side::Up, dec!(0.39), dec!(0.40), t0 + Duration::seconds(1))
        .await;
    assert!(bot.strategy.position().is_some());

    // Sum 0.40 + 0.60 = 1.00 stays above the target: hold.
    bot.feed(Side::Down, dec!(0.59), dec!(0.60), t0 + Duration::seconds(5))
        .await;
    assert!(bot.strategy.position().is_some());

    // Sum 0.40 + 0.45 = 0.85 <= 0.95: leg 2 fills, cycle completes.
    bot.feed(Side::Down, dec!(0.44), dec!(0.45), t0 + Duration::seconds(8))
        .await;
    assert!(bot.strategy.position().is_none());

    let events = bot.journal.events();
    assert_eq!(
        events,
        vec![
            TradeEvent::Leg1Filled {
                side: Side::Up,
                price: dec!(0.40),
                size: dec!(3.75),
            },
            TradeEvent::Leg2Filled {
                side: Side::Down,
                price: dec!(0.45),
                size: dec!(3.333333),
                reason: EntryReason::SumTarget,
            },
            TradeEvent::CycleClosed {
                reason: CloseReason::Completed,
                pnl_estimate: dec!(0.5625), // (1 - 0.85) * 3.75
                leg1_side: Side::Up,
                leg1_price: dec!(0.40),
                leg2_side: Some(Side::Down),
                leg2_price: Some(dec!(0.45)),
            },
        ]
    );

    // The realized loss counter never moves on a profitable cycle and
    // the position slot is free again.
    assert_eq!(bot.strategy.risk().state().daily_loss_usd, dec!(0));
    assert_eq!(bot.strategy.risk().state().active_positions, 0);
    assert_eq!(bot.adapter.placed_orders().len(), 2);

    let stats = bot.strategy.stats();
    assert_eq!(stats.cycles_completed, 1);
    assert_eq!(stats.realized_pnl_usd, dec!(0.5625));
}

#[tokio::test]
async fn timeout_skip_closes_without_hedging() {
    let mut bot = Bot::new(Config {
        leg2_timeout_action: TimeoutAction::Skip,
        ..test_config()
    });
    let t0 = datetime!(2026-01-02 00:00 UTC);

    bot.feed(Side::Up, dec!(0.44), dec!(0.45), t0).await;
    bot.feed(Side::Up, dec!(0.39), dec!(0.40), t0 + Duration::seconds(1))
        .await;
    assert!(bot.strategy.position().is_some());

    // The sum never reaches the target while the clock runs out.
    bot.feed(Side::Down, dec!(0.59), dec!(0.60), t0 + Duration::seconds(60))
        .await;
    bot.feed(Side::Down, dec!(0.59), dec!(0.60), t0 + Duration::seconds(120))
        .await;
    assert!(bot.strategy.position().is_some());

    bot.feed(Side::Down, dec!(0.59), dec!(0.60), t0 + Duration::seconds(182))
        .await;
    assert!(bot.strategy.position().is_none());

    // Leg 1 was the only order ever submitted.
    assert_eq!(bot.adapter.placed_orders().len(), 1);

    let events = bot.journal.events();
    assert_eq!(
        events.last().unwrap(),
        &TradeEvent::CycleClosed {
            reason: CloseReason::TimeoutSkip,
            pnl_estimate: dec!(0),
            leg1_side: Side::Up,
            leg1_price: dec!(0.40),
            leg2_side: None,
            leg2_price: None,
        }
    );
    assert_eq!(bot.strategy.stats().cycles_abandoned, 1);
}

#[tokio::test]
async fn repeated_dump_quotes_open_only_one_position() {
    let mut bot = Bot::new(test_config());
    let t0 = datetime!(2026-01-02 00:00 UTC);

    bot.feed(Side::Up, dec!(0.44), dec!(0.45), t0).await;
    // Each of these crosses the threshold against the windowed history,
    // so the detector keeps signaling while the position is open.
    bot.feed(Side::Up, dec!(0.39), dec!(0.40), t0 + Duration::seconds(1))
        .await;
    bot.feed(Side::Up, dec!(0.38), dec!(0.39), t0 + Duration::seconds(2))
        .await;

    assert_eq!(bot.strategy.risk().state().active_positions, 1);
    assert_eq!(bot.adapter.placed_orders().len(), 1);
    assert!(bot.strategy.stats().signals_seen >= 2);
}
