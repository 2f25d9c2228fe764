//! The dip-hedge strategy: enter the moved side, hedge the opposite
//! side once the combined price reaches the target sum.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use super::position::PositionState;
use crate::config::Config;
use crate::error::{ExecutionError, Result};
use crate::execution::{ClientIdSource, ExecutionEngine, OrderRequest, OrderResult};
use crate::journal::{Journal, TradeEvent};
use crate::market::{Quote, Side};
use crate::metrics;
use crate::risk::RiskGate;
use crate::signal::SignalEvent;

/// What to do when the leg-2 wait times out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeoutAction {
    /// Hedge anyway if the sum is under the looser ceiling.
    #[default]
    DefensiveHedge,
    /// Abandon the cycle, leaving leg 1 unhedged in the bookkeeping.
    Skip,
}

/// Which exit condition triggered a leg-2 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntryReason {
    /// Leg-1 side moved favorably past the profit-lock threshold.
    ProfitLock,
    /// Combined price reached the sum target.
    SumTarget,
    /// Timed out, but the sum was under the defensive ceiling.
    TimeoutDefensive,
}

/// Why a hedge cycle closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CloseReason {
    /// Both legs filled.
    Completed,
    /// Timed out with `leg2_timeout_action = skip`.
    TimeoutSkip,
}

/// Run statistics exposed over the status API.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StrategyStats {
    /// Quotes processed.
    pub quotes_seen: u64,
    /// Movement signals received.
    pub signals_seen: u64,
    /// Cycles closed with both legs filled.
    pub cycles_completed: u64,
    /// Cycles abandoned on timeout.
    pub cycles_abandoned: u64,
    /// Sum of realized PnL estimates.
    pub realized_pnl_usd: Decimal,
    /// Whether a hedge cycle is currently open.
    pub position_open: bool,
}

/// Two-leg hedge strategy state machine.
///
/// Driven entirely by [`DipHedgeStrategy::on_quote`] and
/// [`DipHedgeStrategy::on_signal`], which the service calls strictly
/// sequentially: no two handlers ever run concurrently, so the
/// position and risk state need no locking. The engine's TTL wait is a
/// suspension point during which further quotes simply queue.
pub struct DipHedgeStrategy {
    config: Arc<Config>,
    engine: ExecutionEngine,
    risk: RiskGate,
    journal: Arc<dyn Journal>,
    ids: Arc<dyn ClientIdSource>,
    position: Option<PositionState>,
    latest_quotes: HashMap<Side, Quote>,
    quotes_seen: u64,
    signals_seen: u64,
    cycles_completed: u64,
    cycles_abandoned: u64,
    realized_pnl_usd: Decimal,
}

impl DipHedgeStrategy {
    /// Wire the strategy to its collaborators.
    pub fn new(
        config: Arc<Config>,
        engine: ExecutionEngine,
        risk: RiskGate,
        journal: Arc<dyn Journal>,
        ids: Arc<dyn ClientIdSource>,
    ) -> Self {
        Self {
            config,
            engine,
            risk,
            journal,
            ids,
            position: None,
            latest_quotes: HashMap::new(),
            quotes_seen: 0,
            signals_seen: 0,
            cycles_completed: 0,
            cycles_abandoned: 0,
            realized_pnl_usd: Decimal::ZERO,
        }
    }

    /// Handle an inbound quote: refresh the per-side cache and, while a
    /// position is open, re-evaluate the leg-2 exit conditions.
    pub async fn on_quote(&mut self, quote: Quote) -> Result<()> {
        self.quotes_seen += 1;
        let now = quote.timestamp;
        self.latest_quotes.insert(quote.side, quote);
        if self.position.is_some() {
            self.evaluate_leg2(now).await?;
        }
        Ok(())
    }

    /// Handle a movement signal: enter leg 1 if the risk gate permits
    /// and no cycle is open.
    pub async fn on_signal(&mut self, signal: SignalEvent) -> Result<()> {
        self.signals_seen += 1;
        metrics::inc_signals_detected();
        info!(
            side = %signal.side,
            move_pct = %signal.move_pct,
            entry_price = %signal.entry_price,
            "movement signal"
        );

        if !self.risk.can_trade(signal.timestamp) {
            debug!("risk gate closed, ignoring signal");
            return Ok(());
        }
        if self.position.is_some() {
            debug!("position already open, ignoring signal");
            return Ok(());
        }
        self.enter_leg1(&signal).await
    }

    /// Current run statistics.
    pub fn stats(&self) -> StrategyStats {
        StrategyStats {
            quotes_seen: self.quotes_seen,
            signals_seen: self.signals_seen,
            cycles_completed: self.cycles_completed,
            cycles_abandoned: self.cycles_abandoned,
            realized_pnl_usd: self.realized_pnl_usd,
            position_open: self.position.is_some(),
        }
    }

    /// The open position, if any.
    pub fn position(&self) -> Option<&PositionState> {
        self.position.as_ref()
    }

    /// Read access to the risk gate.
    pub fn risk(&self) -> &RiskGate {
        &self.risk
    }

    /// Mutable access to the risk gate, for external day-boundary
    /// resets of the loss counter.
    pub fn risk_mut(&mut self) -> &mut RiskGate {
        &mut self.risk
    }

    async fn enter_leg1(&mut self, signal: &SignalEvent) -> Result<()> {
        let Some(quote) = self.latest_quotes.get(&signal.side).cloned() else {
            debug!(side = %signal.side, "no cached quote for side yet, ignoring signal");
            return Ok(());
        };

        let size = self.order_size(quote.best_ask);
        if size <= Decimal::ZERO {
            debug!(ask = %quote.best_ask, "computed size is zero, skipping entry");
            return Ok(());
        }

        let price = self.entry_price(quote.best_ask);
        let order = OrderRequest {
            side: signal.side,
            price,
            size,
            client_order_id: self.ids.next_id("leg1"),
        };

        // Counted before submission so a duplicate signal during an
        // in-flight attempt still hits the hourly limit.
        self.risk.register_order(signal.timestamp);

        match self.execute_with_requote(order).await {
            Ok(result) if result.status.is_filled() => {
                self.risk.register_success();
                self.risk.register_cycle_start();
                let fill_price = result.fill_price(price);
                self.journal.record(&TradeEvent::Leg1Filled {
                    side: signal.side,
                    price: fill_price,
                    size: result.filled_size,
                })?;
                metrics::inc_orders_filled();
                info!(
                    side = %signal.side,
                    price = %fill_price,
                    size = %result.filled_size,
                    "leg 1 filled"
                );
                self.position = Some(PositionState::open(
                    signal.side,
                    fill_price,
                    result.filled_size,
                    signal.timestamp,
                ));
            }
            Ok(result) => {
                self.risk.register_failure(signal.timestamp);
                metrics::inc_orders_failed();
                warn!(
                    status = %result.status,
                    filled = %result.filled_size,
                    "leg 1 not filled"
                );
            }
            Err(err) => {
                self.risk.register_failure(signal.timestamp);
                metrics::inc_orders_failed();
                warn!(error = %err, "leg 1 submission failed");
            }
        }
        Ok(())
    }

    async fn evaluate_leg2(&mut self, now: OffsetDateTime) -> Result<()> {
        let (leg1_side, leg1_price, leg1_size, opened_at) = match &self.position {
            Some(p) => (p.leg1_side, p.leg1_price, p.leg1_size, p.opened_at),
            None => return Ok(()),
        };

        let Some(opposite_quote) = self.latest_quotes.get(&leg1_side.opposite()).cloned() else {
            return Ok(());
        };

        let sum_price = leg1_price + opposite_quote.best_ask;
        let unrealized = (Decimal::ONE - sum_price) * leg1_size;
        debug!(sum_price = %sum_price, unrealized = %unrealized, "open cycle mark");

        if self.profit_lock_hit() {
            return self
                .enter_leg2(&opposite_quote, EntryReason::ProfitLock, now)
                .await;
        }

        if sum_price <= self.config.sum_target {
            return self
                .enter_leg2(&opposite_quote, EntryReason::SumTarget, now)
                .await;
        }

        if now - opened_at >= Duration::seconds(self.config.leg2_timeout_seconds as i64) {
            return self
                .handle_leg2_timeout(&opposite_quote, sum_price, now)
                .await;
        }

        Ok(())
    }

    fn profit_lock_hit(&self) -> bool {
        if self.config.profit_lock_bps <= Decimal::ZERO {
            return false;
        }
        let Some(position) = &self.position else {
            return false;
        };
        let Some(leg1_quote) = self.latest_quotes.get(&position.leg1_side) else {
            return false;
        };
        if position.leg1_price.is_zero() {
            return false;
        }
        let moved = (leg1_quote.best_bid - position.leg1_price) / position.leg1_price;
        moved >= self.config.profit_lock_bps / Decimal::from(10_000u32)
    }

    async fn handle_leg2_timeout(
        &mut self,
        opposite_quote: &Quote,
        sum_price: Decimal,
        now: OffsetDateTime,
    ) -> Result<()> {
        match self.config.leg2_timeout_action {
            TimeoutAction::Skip => {
                // Leg 1 is left unhedged in the bookkeeping; accepted policy.
                info!("leg-2 wait timed out, abandoning cycle");
                self.close_cycle(CloseReason::TimeoutSkip, now)
            }
            TimeoutAction::DefensiveHedge => {
                if sum_price <= self.config.sum_target_max {
                    self.enter_leg2(opposite_quote, EntryReason::TimeoutDefensive, now)
                        .await
                } else {
                    debug!(
                        sum_price = %sum_price,
                        ceiling = %self.config.sum_target_max,
                        "timed out above defensive ceiling, waiting"
                    );
                    Ok(())
                }
            }
        }
    }

    async fn enter_leg2(
        &mut self,
        quote: &Quote,
        reason: EntryReason,
        now: OffsetDateTime,
    ) -> Result<()> {
        let leg1_size = match &self.position {
            Some(p) => p.leg1_size,
            None => return Ok(()),
        };

        let size = leg1_size.min(self.order_size(quote.best_ask));
        if size <= Decimal::ZERO {
            debug!(ask = %quote.best_ask, "computed leg-2 size is zero, skipping");
            return Ok(());
        }

        let price = self.entry_price(quote.best_ask);
        let order = OrderRequest {
            side: quote.side,
            price,
            size,
            client_order_id: self.ids.next_id("leg2"),
        };

        self.risk.register_order(now);

        match self.execute_with_requote(order).await {
            Ok(result) if result.status.is_filled() => {
                self.risk.register_success();
                let fill_price = result.fill_price(price);
                if let Some(position) = &mut self.position {
                    position.leg2_side = Some(quote.side);
                    position.leg2_price = Some(fill_price);
                    position.leg2_size = Some(result.filled_size);
                }
                self.journal.record(&TradeEvent::Leg2Filled {
                    side: quote.side,
                    price: fill_price,
                    size: result.filled_size,
                    reason,
                })?;
                metrics::inc_orders_filled();
                info!(
                    side = %quote.side,
                    price = %fill_price,
                    reason = %reason,
                    "leg 2 filled"
                );
                self.close_cycle(CloseReason::Completed, now)?;
            }
            Ok(result) => {
                // The position stays open for the next quote tick.
                self.risk.register_failure(now);
                metrics::inc_orders_failed();
                warn!(status = %result.status, reason = %reason, "leg 2 not filled");
            }
            Err(err) => {
                self.risk.register_failure(now);
                metrics::inc_orders_failed();
                warn!(error = %err, reason = %reason, "leg 2 submission failed");
            }
        }
        Ok(())
    }

    fn close_cycle(&mut self, reason: CloseReason, now: OffsetDateTime) -> Result<()> {
        let Some(position) = self.position.take() else {
            return Ok(());
        };

        let pnl = position.pnl_estimate();
        self.risk.record_pnl(pnl);
        self.journal.record(&TradeEvent::CycleClosed {
            reason,
            pnl_estimate: pnl,
            leg1_side: position.leg1_side,
            leg1_price: position.leg1_price,
            leg2_side: position.leg2_side,
            leg2_price: position.leg2_price,
        })?;
        self.risk.register_cycle_end(now);

        match reason {
            CloseReason::Completed => {
                self.cycles_completed += 1;
                metrics::inc_cycles_completed();
            }
            CloseReason::TimeoutSkip => {
                self.cycles_abandoned += 1;
                metrics::inc_cycles_abandoned();
            }
        }
        self.realized_pnl_usd += pnl;

        info!(reason = %reason, pnl = %pnl, "cycle closed");
        Ok(())
    }

    /// Drive one order through the engine, resubmitting with a fresh
    /// price and client id up to `max_requotes` times on non-fill.
    async fn execute_with_requote(
        &mut self,
        mut order: OrderRequest,
    ) -> std::result::Result<OrderResult, ExecutionError> {
        let side = order.side;

        let mut result = self.engine.execute_limit_gtc(&order).await?;
        if result.status.is_filled() {
            return Ok(result);
        }

        for attempt in 1..=self.config.max_requotes {
            if let Some(quote) = self.latest_quotes.get(&side) {
                order.price = self.entry_price(quote.best_ask);
            }
            order.client_order_id = self.ids.next_id("req");
            metrics::inc_requotes();
            debug!(attempt, price = %order.price, "requoting");

            result = self.engine.execute_limit_gtc(&order).await?;
            if result.status.is_filled() {
                return Ok(result);
            }
        }
        Ok(result)
    }

    /// Limit price with the slippage allowance applied.
    fn entry_price(&self, ask: Decimal) -> Decimal {
        ask * (Decimal::ONE + self.config.slippage_bps / Decimal::from(10_000u32))
    }

    /// Shares for the configured per-leg budget at the given ask.
    fn order_size(&self, ask: Decimal) -> Decimal {
        if ask <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let max_usd = self.config.max_usd_per_leg.min(self.config.bankroll_usd);
        (max_usd / ask).round_dp(6)
    }
}
