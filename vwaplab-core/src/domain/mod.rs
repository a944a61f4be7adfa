//! Domain types for VwapLab

pub mod bar;
pub mod ids;
pub mod interval;

pub use bar::{is_tradeable, IntervalBar, MinuteSample};
pub use ids::InstrumentId;
pub use interval::{IntervalKey, LabelError, MinuteKey};
