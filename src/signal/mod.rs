//! Movement detection: rolling price windows and threshold signals.

pub mod detector;
pub mod window;

pub use detector::{MovementDetector, SignalEvent, TriggerMode};
pub use window::RollingWindow;
