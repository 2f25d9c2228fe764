//! Market-side and quote types for binary outcome markets.

pub mod types;

pub use types::{Quote, Side};
