//! Time-bounded rolling price window.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

/// Rolling time window of (timestamp, price) samples.
///
/// Samples arrive in chronological order, so eviction only ever needs
/// to look at the front of the queue.
#[derive(Debug)]
pub struct RollingWindow {
    samples: VecDeque<(OffsetDateTime, Decimal)>,
    window: Duration,
}

impl RollingWindow {
    /// Create a window retaining the last `window_seconds` of samples.
    pub fn new(window_seconds: u64) -> Self {
        Self {
            samples: VecDeque::new(),
            window: Duration::seconds(window_seconds as i64),
        }
    }

    /// Append a sample and evict everything strictly older than
    /// `timestamp - window`.
    pub fn push(&mut self, timestamp: OffsetDateTime, price: Decimal) {
        self.samples.push_back((timestamp, price));
        let cutoff = timestamp - self.window;
        while let Some((oldest, _)) = self.samples.front() {
            if *oldest < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Percentage move from the oldest to the newest retained sample.
    ///
    /// `None` with fewer than two samples, or when the oldest price is
    /// zero (the ratio is undefined).
    pub fn movement_pct(&self) -> Option<Decimal> {
        if self.samples.len() < 2 {
            return None;
        }
        let oldest = self.samples.front()?.1;
        let newest = self.samples.back()?.1;
        if oldest.is_zero() {
            return None;
        }
        Some((newest - oldest) / oldest * Decimal::ONE_HUNDRED)
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest retained timestamp, if any.
    pub fn oldest_timestamp(&self) -> Option<OffsetDateTime> {
        self.samples.front().map(|(t, _)| *t)
    }
}
