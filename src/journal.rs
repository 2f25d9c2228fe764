//! Durable trade journal.
//!
//! The strategy reports every fill and cycle close here. The file
//! implementation appends one JSON object per line so a crashed run
//! still leaves a parseable record behind.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::market::Side;
use crate::strategy::{CloseReason, EntryReason};

/// A journaled trade event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TradeEvent {
    /// Leg 1 filled; a hedge cycle is now open.
    Leg1Filled {
        /// Entered side.
        side: Side,
        /// Realized entry price.
        price: Decimal,
        /// Filled size.
        size: Decimal,
    },
    /// Leg 2 filled; the cycle is about to close.
    Leg2Filled {
        /// Entered side.
        side: Side,
        /// Realized entry price.
        price: Decimal,
        /// Filled size.
        size: Decimal,
        /// Which exit condition triggered the entry.
        reason: EntryReason,
    },
    /// A hedge cycle closed.
    CycleClosed {
        /// Why the cycle closed.
        reason: CloseReason,
        /// Estimated realized PnL in USD.
        pnl_estimate: Decimal,
        /// Leg-1 side.
        leg1_side: Side,
        /// Leg-1 entry price.
        leg1_price: Decimal,
        /// Leg-2 side, when leg 2 filled.
        leg2_side: Option<Side>,
        /// Leg-2 entry price, when leg 2 filled.
        leg2_price: Option<Decimal>,
    },
}

/// Append-only journal collaborator.
pub trait Journal: Send + Sync {
    /// Durably append one event.
    fn record(&self, event: &TradeEvent) -> io::Result<()>;
}

/// Journal writing JSON lines to `<dir>/trades.jsonl`.
pub struct FileJournal {
    path: PathBuf,
    // Serializes concurrent appends; a partial line would corrupt the log.
    write_lock: Mutex<()>,
}

impl FileJournal {
    /// Create the journal directory if needed and open the journal.
    pub fn new(directory: &Path) -> io::Result<Self> {
        fs::create_dir_all(directory)?;
        Ok(Self {
            path: directory.join("trades.jsonl"),
            write_lock: Mutex::new(()),
        })
    }
}

impl Journal for FileJournal {
    fn record(&self, event: &TradeEvent) -> io::Result<()> {
        let mut value = serde_json::to_value(event).map_err(io::Error::other)?;
        if let Some(map) = value.as_object_mut() {
            let stamp = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .map_err(io::Error::other)?;
            map.insert("timestamp".to_string(), serde_json::Value::String(stamp));
        }

        let line = serde_json::to_string(&value).map_err(io::Error::other)?;

        let _guard = self.write_lock.lock().unwrap();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// In-memory journal for tests and dry-run inspection.
#[derive(Default)]
pub struct MemoryJournal {
    events: Mutex<Vec<TradeEvent>>,
}

impl MemoryJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, in order.
    pub fn events(&self) -> Vec<TradeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, event: &TradeEvent) -> io::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn trade_events_serialize_with_event_tag() {
        let event = TradeEvent::Leg1Filled {
            side: Side::Up,
            price: dec!(0.40),
            size: dec!(3.75),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "leg1_filled");
        assert_eq!(json["side"], "UP");
    }

    #[test]
    fn cycle_closed_serializes_reason() {
        let event = TradeEvent::CycleClosed {
            reason: CloseReason::TimeoutSkip,
            pnl_estimate: dec!(0),
            leg1_side: Side::Down,
            leg1_price: dec!(0.40),
            leg2_side: None,
            leg2_price: None,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "cycle_closed");
        assert_eq!(json["reason"], "timeout_skip");
        assert!(json["leg2_side"].is_null());
    }

    #[test]
    fn file_journal_appends_lines() {
        let dir = std::env::temp_dir().join(format!("dip-hedge-test-{}", std::process::id()));
        let journal = FileJournal::new(&dir).unwrap();

        let event = TradeEvent::Leg1Filled {
            side: Side::Up,
            price: dec!(0.40),
            size: dec!(3),
        };
        journal.record(&event).unwrap();
        journal.record(&event).unwrap();

        let contents = fs::read_to_string(dir.join("trades.jsonl")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["event"], "leg1_filled");
        assert!(parsed["timestamp"].is_string());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn memory_journal_records_in_order() {
        let journal = MemoryJournal::new();
        let first = TradeEvent::Leg1Filled {
            side: Side::Up,
            price: dec!(0.40),
            size: dec!(3),
        };
        let second = TradeEvent::CycleClosed {
            reason: CloseReason::Completed,
            pnl_estimate: dec!(0.45),
            leg1_side: Side::Up,
            leg1_price: dec!(0.40),
            leg2_side: Some(Side::Down),
            leg2_price: Some(dec!(0.45)),
        };

        journal.record(&first).unwrap();
        journal.record(&second).unwrap();

        assert_eq!(journal.events(), vec![first, second]);
    }
}
