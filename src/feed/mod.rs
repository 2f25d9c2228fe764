//! Market-data feed: a lazy, infinite sequence of quotes.
//!
//! The feed delivers quotes over a channel in arrival order and keeps
//! itself alive across transport failures: the websocket transport
//! reconnects with exponential backoff, the polling transport backs
//! off between failed fetches.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub mod parser;
mod poll;
mod ws;

use crate::config::Config;
use crate::market::Quote;
use crate::metrics;

/// Which transport delivers quotes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeedMode {
    /// Push quotes over a websocket subscription.
    #[default]
    Websocket,
    /// Poll the book endpoint on an interval.
    Polling,
}

/// Quote feed handle.
pub struct QuoteFeed;

impl QuoteFeed {
    /// Spawn the configured transport. Quotes arrive on the returned
    /// channel in arrival order; the task exits when the receiver is
    /// dropped.
    pub fn spawn(config: Arc<Config>) -> mpsc::Receiver<Quote> {
        let (tx, rx) = mpsc::channel(1024);
        tokio::spawn(async move {
            match config.feed_mode {
                FeedMode::Websocket => run_websocket(config, tx).await,
                FeedMode::Polling => run_polling(config, tx).await,
            }
        });
        rx
    }
}

async fn run_websocket(config: Arc<Config>, tx: mpsc::Sender<Quote>) {
    let mut attempt = 0u32;
    loop {
        match ws::run(&config, &tx).await {
            Ok(()) => {
                attempt = 0;
            }
            Err(e) => {
                warn!(error = %e, attempt, "websocket feed error");
            }
        }

        if tx.is_closed() {
            return;
        }

        let delay = backoff_delay(attempt, config.backoff_max_seconds);
        metrics::inc_feed_reconnects();
        info!(delay_ms = delay.as_millis() as u64, "reconnecting feed after delay");
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}

async fn run_polling(config: Arc<Config>, tx: mpsc::Sender<Quote>) {
    let base = Duration::from_millis(config.poll_interval_ms);
    let max = Duration::from_secs(config.backoff_max_seconds);
    let mut backoff = base;

    let stream = poll::quotes(config.clone());
    futures::pin_mut!(stream);

    while let Some(item) = stream.next().await {
        match item {
            Ok(quote) => {
                backoff = base;
                if tx.send(quote).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "polling error");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(max);
            }
        }
    }
}

/// Exponential backoff starting at one second, capped at `max_seconds`.
fn backoff_delay(attempt: u32, max_seconds: u64) -> Duration {
    let delay_ms = 1000f64 * 2f64.powi(attempt.min(16) as i32);
    let max_ms = max_seconds.saturating_mul(1000);
    Duration::from_millis((delay_ms as u64).min(max_ms))
}
