//! Event-driven dip-hedge bot for binary-outcome prediction markets.
//!
//! The bot watches one market's UP and DOWN books, enters the side
//! that just moved sharply (leg 1), then waits for the combined price
//! of both sides to fall to a target sum before entering the opposite
//! side (leg 2), locking a bounded-risk spread.
//!
//! # Strategy
//!
//! At settlement, ONE side pays $1.00 per share. Once both legs are on
//! for less than $1.00 combined, the spread is locked:
//!
//! ```text
//! Leg 1 (UP, after dump):  $0.40
//! Leg 2 (DOWN, at target): $0.45
//! ────────────────────────────────
//! Total:                   $0.85 <= sum target 0.95 ✅
//! Locked:                  $0.15 per share
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Market sides and quote snapshots
//! - [`feed`]: Quote feed (websocket or polling)
//! - [`signal`]: Rolling-window movement detection
//! - [`risk`]: Risk gate and circuit breaker
//! - [`execution`]: Order adapters and execution engine
//! - [`strategy`]: The two-leg hedge state machine
//! - [`journal`]: Durable trade journal
//! - [`service`]: The quote-consuming run loop
//! - [`api`]: HTTP API for health/metrics

pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod feed;
pub mod journal;
pub mod market;
pub mod metrics;
pub mod risk;
pub mod service;
pub mod signal;
pub mod strategy;

pub use config::Config;
pub use error::{BotError, Result};
