//! Trading risk gate: position, loss, rate and circuit-breaker limits.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};
use tracing::{error, warn};

use crate::config::Config;
use crate::metrics;

/// Rolling risk counters owned by the [`RiskGate`].
#[derive(Debug, Default)]
pub struct RiskState {
    /// Currently open hedge cycles.
    pub active_positions: u32,
    /// Realized losses accumulated today (profits never reduce this).
    pub daily_loss_usd: Decimal,
    /// When the last cycle ended, for cooldown enforcement.
    pub last_cycle_end: Option<OffsetDateTime>,
    /// Order submission timestamps within the last hour.
    orders_last_hour: VecDeque<OffsetDateTime>,
    /// Consecutive failed attempts since the last success.
    pub consecutive_failures: u32,
    /// Trading suppressed until this instant, once the breaker trips.
    pub circuit_breaker_until: Option<OffsetDateTime>,
}

impl RiskState {
    /// Number of order submissions currently counted in the hourly window.
    pub fn orders_in_last_hour(&self) -> usize {
        self.orders_last_hour.len()
    }
}

/// Decides whether new trading activity is currently permitted.
///
/// All checks take the caller's `now` so the gate stays deterministic
/// under test. The daily-loss counter is never reset here; day-boundary
/// resets are an explicit caller responsibility via
/// [`RiskGate::reset_daily_loss`].
pub struct RiskGate {
    max_active_positions: u32,
    daily_loss_limit_usd: Decimal,
    cooldown: Duration,
    max_orders_per_hour: usize,
    circuit_breaker_failures: u32,
    circuit_breaker_cooldown: Duration,
    state: RiskState,
}

impl RiskGate {
    /// Create a gate from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            max_active_positions: config.max_active_positions,
            daily_loss_limit_usd: config.daily_loss_limit_usd,
            cooldown: Duration::seconds(config.cooldown_seconds as i64),
            max_orders_per_hour: config.max_orders_per_hour,
            circuit_breaker_failures: config.circuit_breaker_failures,
            circuit_breaker_cooldown: Duration::seconds(
                config.circuit_breaker_cooldown_seconds as i64,
            ),
            state: RiskState::default(),
        }
    }

    /// Whether a new trading attempt is permitted right now.
    ///
    /// Checks run in precedence order; the first failing check blocks.
    pub fn can_trade(&mut self, now: OffsetDateTime) -> bool {
        if let Some(until) = self.state.circuit_breaker_until {
            if now < until {
                warn!(until = %until, "circuit breaker active");
                return false;
            }
        }

        if self.state.active_positions >= self.max_active_positions {
            return false;
        }

        if self.state.daily_loss_usd >= self.daily_loss_limit_usd {
            warn!(daily_loss = %self.state.daily_loss_usd, "daily loss limit reached");
            return false;
        }

        if let Some(last_end) = self.state.last_cycle_end {
            if now - last_end < self.cooldown {
                return false;
            }
        }

        self.trim_hourly(now);
        if self.state.orders_last_hour.len() >= self.max_orders_per_hour {
            warn!(
                orders = self.state.orders_last_hour.len(),
                "hourly order limit reached"
            );
            return false;
        }

        true
    }

    /// Count an order submission attempt toward the hourly limit.
    pub fn register_order(&mut self, now: OffsetDateTime) {
        self.state.orders_last_hour.push_back(now);
        self.trim_hourly(now);
    }

    /// Claim the active-position slot for a new hedge cycle.
    pub fn register_cycle_start(&mut self) {
        self.state.active_positions += 1;
    }

    /// Release the active-position slot and start the cooldown clock.
    pub fn register_cycle_end(&mut self, now: OffsetDateTime) {
        self.state.active_positions = self.state.active_positions.saturating_sub(1);
        self.state.last_cycle_end = Some(now);
    }

    /// Record a failed attempt; trips the circuit breaker once the
    /// consecutive count reaches the configured limit.
    pub fn register_failure(&mut self, now: OffsetDateTime) {
        self.state.consecutive_failures += 1;
        if self.state.consecutive_failures >= self.circuit_breaker_failures {
            let until = now + self.circuit_breaker_cooldown;
            self.state.circuit_breaker_until = Some(until);
            metrics::inc_circuit_breaker_trips();
            error!(
                failures = self.state.consecutive_failures,
                until = %until,
                "circuit breaker tripped"
            );
        }
    }

    /// Record a successful attempt; failures do not accumulate across
    /// successes.
    pub fn register_success(&mut self) {
        self.state.consecutive_failures = 0;
    }

    /// Record realized PnL. Only the loss portion counts toward the
    /// daily limit, so the counter is monotonically non-decreasing
    /// within a day.
    pub fn record_pnl(&mut self, pnl_usd: Decimal) {
        if pnl_usd < Decimal::ZERO {
            self.state.daily_loss_usd += -pnl_usd;
        }
    }

    /// Zero the daily-loss counter. Intended for an external
    /// day-boundary scheduler; never called by the gate itself.
    pub fn reset_daily_loss(&mut self) {
        self.state.daily_loss_usd = Decimal::ZERO;
    }

    /// Read-only view of the counters.
    pub fn state(&self) -> &RiskState {
        &self.state
    }

    fn trim_hourly(&mut self, now: OffsetDateTime) {
        let cutoff = now - Duration::hours(1);
        while let Some(oldest) = self.state.orders_last_hour.front() {
            if *oldest < cutoff {
                self.state.orders_last_hour.pop_front();
            } else {
                break;
            }
        }
    }
}
