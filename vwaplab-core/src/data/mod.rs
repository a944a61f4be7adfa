//! Data layer: panel containers, interval aggregation, alignment.

pub mod aggregate;
pub mod align;
pub mod panel;

pub use aggregate::{aggregate_instrument, aggregate_intervals, forward_fill, AggregateError};
pub use align::align_intervals;
pub use panel::{IntervalPrices, MinutePanel, PositionMatrix};
