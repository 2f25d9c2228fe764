//! Bot service: wires the quote feed into the detector and strategy.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::AppState;
use crate::config::Config;
use crate::error::Result;
use crate::feed::QuoteFeed;
use crate::market::Quote;
use crate::metrics;
use crate::signal::MovementDetector;
use crate::strategy::DipHedgeStrategy;

/// Owns the single quote-consuming task.
///
/// Quotes are processed strictly in arrival order and no two strategy
/// handlers run concurrently; a quote arriving while an order waits
/// out its TTL simply queues on the feed channel.
pub struct BotService {
    config: Arc<Config>,
    detector: MovementDetector,
    strategy: DipHedgeStrategy,
    app_state: AppState,
}

impl BotService {
    /// Assemble the service around a wired strategy.
    pub fn new(config: Arc<Config>, strategy: DipHedgeStrategy, app_state: AppState) -> Self {
        let detector = MovementDetector::new(&config);
        Self {
            config,
            detector,
            strategy,
            app_state,
        }
    }

    /// Consume the quote stream until the feed closes or the host
    /// interrupts. Handler-local failures (feed parse, single
    /// submissions) never reach here; anything that does propagate is
    /// unanticipated and makes the process exit non-zero.
    pub async fn run(mut self) -> Result<()> {
        info!(
            market = %self.config.market_slug,
            dry_run = self.config.dry_run,
            "bot starting"
        );

        let mut quotes = QuoteFeed::spawn(self.config.clone());
        *self.app_state.market_slug.write().await = Some(self.config.market_slug.clone());
        self.app_state.set_ready(true);

        let outcome = loop {
            tokio::select! {
                maybe_quote = quotes.recv() => {
                    match maybe_quote {
                        Some(quote) => {
                            if let Err(e) = self.handle_quote(quote).await {
                                break Err(e);
                            }
                        }
                        None => {
                            warn!("quote feed closed");
                            break Ok(());
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break Ok(());
                }
            }
        };

        self.app_state.set_ready(false);
        info!("bot stopped");
        outcome
    }

    async fn handle_quote(&mut self, quote: Quote) -> Result<()> {
        let _timer = metrics::timer_quote_handling();
        metrics::inc_quotes_received();

        self.strategy.on_quote(quote.clone()).await?;
        if let Some(signal) = self.detector.update(&quote) {
            self.strategy.on_signal(signal).await?;
        }

        *self.app_state.stats.write().await = self.strategy.stats();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use rust_decimal_macros::dec;
    use time::macros::datetime;
    use time::Duration;

    use super::*;
    use crate::execution::sim::SimOrderAdapter;
    use crate::execution::{ExecutionEngine, UuidIdSource};
    use crate::journal::MemoryJournal;
    use crate::market::Side;
    use crate::risk::RiskGate;
    use crate::signal::TriggerMode;
    use crate::strategy::TimeoutAction;

    fn service() -> BotService {
        let config = Arc::new(Config {
            trigger_mode: TriggerMode::Dump,
            move_pct_threshold: dec!(10),
            move_window_seconds: 3,
            sum_target: dec!(0.95),
            leg2_timeout_action: TimeoutAction::DefensiveHedge,
            slippage_bps: dec!(0),
            ..Config::default()
        });
        let engine = ExecutionEngine::new(
            Arc::new(SimOrderAdapter::new()),
            StdDuration::from_secs(config.order_ttl_seconds),
        );
        let strategy = DipHedgeStrategy::new(
            config.clone(),
            engine,
            RiskGate::new(&config),
            Arc::new(MemoryJournal::new()),
            Arc::new(UuidIdSource),
        );
        BotService::new(config.clone(), strategy, AppState::new())
    }

    #[tokio::test]
    async fn quotes_flow_through_detector_into_strategy() {
        let mut service = service();
        let t0 = datetime!(2026-01-02 00:00 UTC);

        let quotes = [
            Quote::new(Side::Up, dec!(0.44), dec!(0.45), dec!(1000), t0),
            Quote::new(
                Side::Up,
                dec!(0.39),
                dec!(0.40),
                dec!(1000),
                t0 + Duration::seconds(1),
            ),
        ];
        for quote in quotes {
            service.handle_quote(quote).await.unwrap();
        }

        // 0.45 -> 0.40 is an -11.1% dump: the signal opened a position.
        let stats = service.app_state.stats.read().await.clone();
        assert_eq!(stats.quotes_seen, 2);
        assert_eq!(stats.signals_seen, 1);
        assert!(stats.position_open);
    }
}
