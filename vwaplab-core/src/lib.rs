//! VwapLab Core — interval keys, VWAP aggregation, transaction costs, and the
//! sequential PnL simulation.
//!
//! This crate contains the heart of the backtest:
//! - Domain types (interval/minute keys, instrument ids, bars)
//! - Minute → interval VWAP aggregation with explicit forward fill
//! - Proportional transaction cost model
//! - The engine: a pure step function folded over the interval axis
//! - Deterministic synthetic data for demos and benches

pub mod data;
pub mod domain;
pub mod engine;
pub mod synthetic;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all core domain types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::IntervalKey>();
        require_sync::<domain::IntervalKey>();
        require_send::<domain::MinuteSample>();
        require_sync::<domain::MinuteSample>();
        require_send::<domain::IntervalBar>();
        require_sync::<domain::IntervalBar>();
        require_send::<domain::InstrumentId>();
        require_sync::<domain::InstrumentId>();

        require_send::<data::MinutePanel>();
        require_sync::<data::MinutePanel>();
        require_send::<data::IntervalPrices>();
        require_sync::<data::IntervalPrices>();
        require_send::<data::PositionMatrix>();
        require_sync::<data::PositionMatrix>();

        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::EngineRun>();
        require_sync::<engine::EngineRun>();
        require_send::<engine::FeeSchedule>();
        require_sync::<engine::FeeSchedule>();
    }

    /// Architecture contract: the step function sees only its own state and row.
    ///
    /// `step` takes the state by value plus one input row and the fee schedule,
    /// and returns the next state. There is no other channel for state to leak
    /// between steps.
    #[test]
    fn step_is_a_pure_transition() {
        fn _check_signature(
            state: engine::EngineState,
            input: &engine::StepInput<'_>,
            fees: &engine::FeeSchedule,
        ) -> (engine::EngineState, Option<engine::StepOutput>) {
            engine::step(state, input, fees)
        }
    }
}
