//! Two-leg dip-hedge strategy state machine.

pub mod hedge;
pub mod position;

pub use hedge::{CloseReason, DipHedgeStrategy, EntryReason, StrategyStats, TimeoutAction};
pub use position::PositionState;
