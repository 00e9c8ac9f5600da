//! Cumulative counters for one simulation.
//!
//! [`EngineMetrics`] lets callers and benchmarks see how much propensity
//! work the engine actually did, which is the point of dependency-aware
//! refresh.

use ctmc_core::SimTime;

/// Work counters accumulated over a simulation's lifetime.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineMetrics {
    /// Events fired.
    pub events_fired: u64,
    /// Individual `Process::rate()` calls made by the engine.
    pub rate_evaluations: u64,
    /// Cache refreshes that covered every process: the initial build and
    /// every event reported as `Dependents::All`.
    pub full_refreshes: u64,
    /// Cache refreshes driven by an explicit dependency list.
    pub partial_refreshes: u64,
    /// Clock value when absorption was first observed.
    pub absorbed_at: Option<SimTime>,
}
