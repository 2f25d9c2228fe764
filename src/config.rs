//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::feed::FeedMode;
use crate::signal::TriggerMode;
use crate::strategy::TimeoutAction;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Market ===
    /// Market slug or ID to trade (e.g., "btc-updown-15m").
    #[serde(default = "default_market_slug")]
    pub market_slug: String,

    /// Simulation mode (no real orders).
    #[serde(default = "default_true")]
    pub dry_run: bool,

    // === Signal Detection ===
    /// Fire on dumps (price drops) or pumps (price rises).
    #[serde(default)]
    pub trigger_mode: TriggerMode,

    /// Rolling window length for movement detection, in seconds.
    #[serde(default = "default_move_window_seconds")]
    pub move_window_seconds: u64,

    /// Percentage move within the window that fires a signal.
    #[serde(default = "default_move_pct_threshold")]
    pub move_pct_threshold: Decimal,

    // === Strategy ===
    /// Maximum combined leg price considered profitable (e.g., 0.95).
    #[serde(default = "default_sum_target")]
    pub sum_target: Decimal,

    /// Looser combined-price ceiling for the defensive hedge after timeout.
    #[serde(default = "default_sum_target_max")]
    pub sum_target_max: Decimal,

    /// Early-exit threshold on favorable leg-1 movement, in basis points.
    /// Zero disables the profit lock.
    #[serde(default)]
    pub profit_lock_bps: Decimal,

    /// Seconds to wait for the sum target before the timeout branch runs.
    #[serde(default = "default_leg2_timeout_seconds")]
    pub leg2_timeout_seconds: u64,

    /// What to do when leg 2 times out: skip or defensive_hedge.
    #[serde(default)]
    pub leg2_timeout_action: TimeoutAction,

    // === Risk ===
    /// Total bankroll available for sizing.
    #[serde(default = "default_bankroll_usd")]
    pub bankroll_usd: Decimal,

    /// Maximum USD notional per leg.
    #[serde(default = "default_max_usd_per_leg")]
    pub max_usd_per_leg: Decimal,

    /// Maximum simultaneously open hedge cycles.
    #[serde(default = "default_max_active_positions")]
    pub max_active_positions: u32,

    /// Minimum seconds between hedge cycles.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,

    /// Maximum order submissions per rolling hour.
    #[serde(default = "default_max_orders_per_hour")]
    pub max_orders_per_hour: usize,

    /// Daily realized-loss limit in USD.
    #[serde(default = "default_daily_loss_limit_usd")]
    pub daily_loss_limit_usd: Decimal,

    /// Consecutive failures that trip the circuit breaker.
    #[serde(default = "default_circuit_breaker_failures")]
    pub circuit_breaker_failures: u32,

    /// How long the circuit breaker suppresses trading, in seconds.
    #[serde(default = "default_circuit_breaker_cooldown_seconds")]
    pub circuit_breaker_cooldown_seconds: u64,

    // === Execution ===
    /// How long a resting order may wait for a fill before cancellation.
    #[serde(default = "default_order_ttl_seconds")]
    pub order_ttl_seconds: u64,

    /// Maximum freshly-priced resubmissions after an unfilled attempt.
    #[serde(default = "default_max_requotes")]
    pub max_requotes: u32,

    /// Limit-price slippage allowance in basis points.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: Decimal,

    // === Feed ===
    /// Quote feed transport: websocket or polling.
    #[serde(default)]
    pub feed_mode: FeedMode,

    /// WebSocket base URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// CLOB REST base URL.
    #[serde(default = "default_clob_url")]
    pub clob_url: String,

    /// Polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum feed backoff delay in seconds.
    #[serde(default = "default_backoff_max_seconds")]
    pub backoff_max_seconds: u64,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    // === Credentials ===
    /// Optional exchange API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional exchange API secret.
    #[serde(default)]
    pub api_secret: Option<String>,

    // === Operations ===
    /// Directory for the trade journal.
    #[serde(default = "default_journal_dir")]
    pub journal_dir: PathBuf,

    /// HTTP server port for health/metrics endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_market_slug() -> String {
    "btc-updown-15m".to_string()
}

fn default_true() -> bool {
    true
}

fn default_move_window_seconds() -> u64 {
    3
}

fn default_move_pct_threshold() -> Decimal {
    Decimal::new(10, 0) // 10%
}

fn default_sum_target() -> Decimal {
    Decimal::new(95, 2) // 0.95
}

fn default_sum_target_max() -> Decimal {
    Decimal::new(99, 2) // 0.99
}

fn default_leg2_timeout_seconds() -> u64 {
    180
}

fn default_bankroll_usd() -> Decimal {
    Decimal::new(50, 0)
}

fn default_max_usd_per_leg() -> Decimal {
    Decimal::new(15, 1) // 1.5
}

fn default_max_active_positions() -> u32 {
    1
}

fn default_cooldown_seconds() -> u64 {
    120
}

fn default_max_orders_per_hour() -> usize {
    30
}

fn default_daily_loss_limit_usd() -> Decimal {
    Decimal::new(5, 0)
}

fn default_circuit_breaker_failures() -> u32 {
    3
}

fn default_circuit_breaker_cooldown_seconds() -> u64 {
    1800
}

fn default_order_ttl_seconds() -> u64 {
    15
}

fn default_max_requotes() -> u32 {
    1
}

fn default_slippage_bps() -> Decimal {
    Decimal::new(5, 0)
}

fn default_ws_url() -> String {
    "wss://clob.polymarket.com/ws".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_backoff_max_seconds() -> u64 {
    15
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_journal_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.market_slug.is_empty() {
            return Err("MARKET_SLUG is required".to_string());
        }

        if self.sum_target >= Decimal::ONE {
            return Err("SUM_TARGET must be less than 1.0".to_string());
        }

        if self.sum_target_max < self.sum_target {
            return Err("SUM_TARGET_MAX must be at least SUM_TARGET".to_string());
        }

        if self.move_pct_threshold <= Decimal::ZERO {
            return Err("MOVE_PCT_THRESHOLD must be positive".to_string());
        }

        if self.move_window_seconds == 0 {
            return Err("MOVE_WINDOW_SECONDS must be positive".to_string());
        }

        if self.max_usd_per_leg <= Decimal::ZERO {
            return Err("MAX_USD_PER_LEG must be positive".to_string());
        }

        if self.bankroll_usd <= Decimal::ZERO {
            return Err("BANKROLL_USD must be positive".to_string());
        }

        if self.max_active_positions == 0 {
            return Err("MAX_ACTIVE_POSITIONS must be at least 1".to_string());
        }

        let ws = url::Url::parse(&self.ws_url).map_err(|e| format!("WS_URL invalid: {e}"))?;
        if !matches!(ws.scheme(), "ws" | "wss") {
            return Err("WS_URL must use the ws or wss scheme".to_string());
        }

        url::Url::parse(&self.clob_url).map_err(|e| format!("CLOB_URL invalid: {e}"))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market_slug: default_market_slug(),
            dry_run: true,
            trigger_mode: TriggerMode::default(),
            move_window_seconds: default_move_window_seconds(),
            move_pct_threshold: default_move_pct_threshold(),
            sum_target: default_sum_target(),
            sum_target_max: default_sum_target_max(),
            profit_lock_bps: Decimal::ZERO,
            leg2_timeout_seconds: default_leg2_timeout_seconds(),
            leg2_timeout_action: TimeoutAction::default(),
            bankroll_usd: default_bankroll_usd(),
            max_usd_per_leg: default_max_usd_per_leg(),
            max_active_positions: default_max_active_positions(),
            cooldown_seconds: default_cooldown_seconds(),
            max_orders_per_hour: default_max_orders_per_hour(),
            daily_loss_limit_usd: default_daily_loss_limit_usd(),
            circuit_breaker_failures: default_circuit_breaker_failures(),
            circuit_breaker_cooldown_seconds: default_circuit_breaker_cooldown_seconds(),
            order_ttl_seconds: default_order_ttl_seconds(),
            max_requotes: default_max_requotes(),
            slippage_bps: default_slippage_bps(),
            feed_mode: FeedMode::default(),
            ws_url: default_ws_url(),
            clob_url: default_clob_url(),
            poll_interval_ms: default_poll_interval_ms(),
            backoff_max_seconds: default_backoff_max_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            api_key: None,
            api_secret: None,
            journal_dir: default_journal_dir(),
            port: default_port(),
            rust_log: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.sum_target, dec!(0.95));
        assert_eq!(config.sum_target_max, dec!(0.99));
        assert_eq!(config.move_pct_threshold, dec!(10));
        assert_eq!(config.max_active_positions, 1);
        assert!(config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_sum_target_at_or_above_one() {
        let config = Config {
            sum_target: dec!(1.0),
            sum_target_max: dec!(1.0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_sum_targets() {
        let config = Config {
            sum_target: dec!(0.95),
            sum_target_max: dec!(0.90),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_websocket_url() {
        let config = Config {
            ws_url: "https://clob.polymarket.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_leg_budget() {
        let config = Config {
            max_usd_per_leg: dec!(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
